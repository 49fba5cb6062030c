//! Array - repeated same-named siblings
//!
//! Exposes no named members: an array is consumed by iterating it or by
//! converting it to one of the list/array shapes. The item values are built
//! separately from the (empty) children mapping, on first iteration or
//! conversion.

use super::{builder, Children, Converted, Item, Shape, Value};
use crate::dom::XmlNode;
use crate::error::{Error, Result};
use log::trace;
use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Mutex;

#[derive(Debug)]
pub struct Array {
    /// Backing nodes in document order, taken when the items are built
    elements: Mutex<Option<Vec<XmlNode>>>,
    items: OnceCell<Vec<Value>>,
    children: OnceCell<Children>,
    /// Node count, known before materialization
    len: usize,
}

impl Array {
    pub fn new(elements: Vec<XmlNode>) -> Self {
        Array {
            len: elements.len(),
            elements: Mutex::new(Some(elements)),
            items: OnceCell::new(),
            children: OnceCell::new(),
        }
    }

    /// Number of items. Does not materialize.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The item values in document order, built on first use
    pub fn materialize_items(&self) -> Result<&[Value]> {
        let items = self.items.get_or_try_init(|| {
            let elements = self
                .elements
                .lock()
                .ok()
                .and_then(|mut elements| elements.take())
                .ok_or(Error::PreconditionViolation(<Self as Item>::LABEL))?;

            trace!("materialized array of {} items", elements.len());
            Ok::<_, Error>(elements.into_iter().map(builder::generate_item).collect())
        })?;
        Ok(items)
    }

    pub fn iter(&self) -> Result<std::slice::Iter<'_, Value>> {
        Ok(self.materialize_items()?.iter())
    }

    /// Item at `index`, `None` when out of range
    pub fn get(&self, index: usize) -> Result<Option<&Value>> {
        Ok(self.materialize_items()?.get(index))
    }

    pub fn as_value_list(&self) -> Result<Vec<&Value>> {
        Ok(self.materialize_items()?.iter().collect())
    }

    /// String representation of every item
    pub fn as_string_list(&self) -> Result<Vec<String>> {
        Ok(self.materialize_items()?.iter().map(Value::to_string).collect())
    }

    pub fn as_value_array(&self) -> Result<Box<[&Value]>> {
        Ok(self.as_value_list()?.into_boxed_slice())
    }

    pub fn as_string_array(&self) -> Result<Box<[String]>> {
        Ok(self.as_string_list()?.into_boxed_slice())
    }
}

impl Item for Array {
    const LABEL: &'static str = "Array";

    fn children_cell(&self) -> &OnceCell<Children> {
        &self.children
    }

    fn compute_children(&self) -> Option<Children> {
        Some(Children::new())
    }

    fn convert_to(&self, shape: Shape) -> Option<Result<Converted<'_>>> {
        let converted = match shape {
            Shape::ValueList => self.as_value_list().map(Converted::ValueList),
            Shape::StringList => self.as_string_list().map(Converted::StringList),
            Shape::ValueArray => self.as_value_array().map(Converted::ValueArray),
            Shape::StringArray => self.as_string_array().map(Converted::StringArray),
            Shape::Map => return None,
        };
        Some(converted)
    }
}

impl fmt::Display for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Array")
    }
}
