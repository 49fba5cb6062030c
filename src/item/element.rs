//! Element - name-keyed view of one parsed node
//!
//! On first access the node's child elements are grouped by local tag name.
//! A name seen once maps to that child's value, a repeated name maps to an
//! `Array` over all of its occurrences. The node is dropped afterwards.

use super::{builder, Array, Children, Item, Value};
use crate::dom::XmlNode;
use crate::error::Result;
use indexmap::IndexMap;
use log::trace;
use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Mutex;

/// Iterator over an element's `(name, value)` entries in document order
pub type Entries<'a> = indexmap::map::Iter<'a, String, Value>;

#[derive(Debug)]
pub struct Element {
    /// Backing node, taken when the children are built
    source: Mutex<Option<XmlNode>>,
    children: OnceCell<Children>,
}

impl Element {
    pub fn new(node: XmlNode) -> Self {
        Element {
            source: Mutex::new(Some(node)),
            children: OnceCell::new(),
        }
    }

    /// Iterate over `(name, value)` entries
    pub fn entries(&self) -> Result<Entries<'_>> {
        Ok(self.children()?.iter())
    }

    /// Member names in document order
    pub fn names(&self) -> Result<impl Iterator<Item = &str>> {
        Ok(self.children()?.keys().map(String::as_str))
    }

    /// Number of distinct member names
    pub fn len(&self) -> Result<usize> {
        Ok(self.children()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.children()?.is_empty())
    }
}

impl Item for Element {
    const LABEL: &'static str = "Element";

    fn children_cell(&self) -> &OnceCell<Children> {
        &self.children
    }

    fn compute_children(&self) -> Option<Children> {
        let node = self.source.lock().ok()?.take()?;
        let name = node.name().to_string();

        let mut groups: IndexMap<String, Vec<XmlNode>> = IndexMap::new();
        for child in node.into_children() {
            groups.entry(child.name().to_string()).or_default().push(child);
        }

        trace!("materialized <{}> into {} members", name, groups.len());

        let children = groups
            .into_iter()
            .map(|(name, group)| {
                let value = match <[XmlNode; 1]>::try_from(group) {
                    Ok([single]) => builder::generate_item(single),
                    Err(repeated) => Value::Array(Array::new(repeated)),
                };
                (name, value)
            })
            .collect();

        Some(children)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Element")
    }
}
