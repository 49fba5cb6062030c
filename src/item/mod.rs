//! Item Tree - dynamic, lazily materialized view over a parsed document
//!
//! Every navigable item is either an `Element` (name-keyed members) or an
//! `Array` (repeated same-named siblings). Both implement `Item`, which owns
//! the materialize-once children mapping and the member lookup and
//! conversion rules built on top of it. Leaves are plain strings.
//!
//! Nothing below a node is touched until that node is first accessed:
//! materializing an element only builds its direct children.

pub mod array;
pub mod builder;
pub mod element;

pub use array::Array;
pub use element::{Element, Entries};

use crate::error::{Error, Result};
use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use std::fmt;

/// Materialized children of an item, keyed by local tag name in
/// first-seen document order
pub type Children = IndexMap<String, Value>;

/// Borrowed copy of a children mapping
pub type Map<'a> = IndexMap<&'a str, &'a Value>;

/// Value of a member, an array item or a document entry
#[derive(Debug)]
pub enum Value {
    /// Decoded text of a node without child elements
    Leaf(String),
    /// A node with child elements
    Element(Element),
    /// Two or more same-named siblings
    Array(Array),
}

impl Value {
    /// Get the leaf text
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Leaf(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Value::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(array) => Some(array),
            _ => None,
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Value::Leaf(_))
    }

    /// Name of the variant, used in error messages and debug output
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Leaf(_) => "Leaf",
            Value::Element(_) => "Element",
            Value::Array(_) => "Array",
        }
    }

    /// Look up a named member
    ///
    /// Leaves have no members and arrays expose none, so both resolve to
    /// `None`.
    pub fn member(&self, name: &str) -> Result<Option<&Value>> {
        match self {
            Value::Leaf(_) => Ok(None),
            Value::Element(element) => element.member(name),
            Value::Array(array) => array.member(name),
        }
    }

    /// Take one navigation step
    pub fn get(&self, segment: &Segment) -> Result<Option<&Value>> {
        match (self, segment) {
            (_, Segment::Name(name)) => self.member(name),
            (Value::Array(array), Segment::Index(index)) => array.get(*index),
            (_, Segment::Index(_)) => Ok(None),
        }
    }

    /// Follow a sequence of steps, stopping at the first absent one
    pub fn path(&self, segments: &[Segment]) -> Result<Option<&Value>> {
        let mut current = self;
        for segment in segments {
            match current.get(segment)? {
                Some(next) => current = next,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Leaf(text) => f.write_str(text),
            Value::Element(element) => fmt::Display::fmt(element, f),
            Value::Array(array) => fmt::Display::fmt(array, f),
        }
    }
}

/// One step of a navigation path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Member name on an element
    Name(String),
    /// Position in an array
    Index(usize),
}

impl From<&str> for Segment {
    fn from(name: &str) -> Self {
        Segment::Name(name.to_string())
    }
}

impl From<String> for Segment {
    fn from(name: String) -> Self {
        Segment::Name(name)
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Segment::Index(index)
    }
}

/// Target shape of an explicit conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Mapping from member name to value
    Map,
    /// Growable ordered sequence of values
    ValueList,
    /// Growable ordered sequence of string representations
    StringList,
    /// Fixed-size sequence of values
    ValueArray,
    /// Fixed-size sequence of string representations
    StringArray,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Shape::Map => "map of values",
            Shape::ValueList => "list of values",
            Shape::StringList => "list of strings",
            Shape::ValueArray => "array of values",
            Shape::StringArray => "array of strings",
        };
        f.write_str(label)
    }
}

/// Result of a conversion, borrowing from the converted item
#[derive(Debug)]
pub enum Converted<'a> {
    Map(Map<'a>),
    ValueList(Vec<&'a Value>),
    StringList(Vec<String>),
    ValueArray(Box<[&'a Value]>),
    StringArray(Box<[String]>),
}

/// Common behaviour of the navigable item variants
///
/// Implementors supply the storage cell and `compute_children`; the cell is
/// filled exactly once, on the first member lookup, entry walk or
/// conversion, and never changes afterwards.
pub trait Item: fmt::Display {
    /// Variant label for error messages
    const LABEL: &'static str;

    /// Storage for the materialized children
    fn children_cell(&self) -> &OnceCell<Children>;

    /// Build the children mapping. Called at most once per successful
    /// materialization. An empty mapping is valid; `None` means the item's
    /// source is gone and is reported as a precondition violation.
    fn compute_children(&self) -> Option<Children>;

    /// Conversions handled by the variant itself. `None` falls back to the
    /// base rules in `convert`.
    fn convert_to(&self, _shape: Shape) -> Option<Result<Converted<'_>>> {
        None
    }

    /// The materialized children, computing them on first use
    fn children(&self) -> Result<&Children> {
        self.children_cell().get_or_try_init(|| {
            self.compute_children()
                .ok_or(Error::PreconditionViolation(Self::LABEL))
        })
    }

    /// Whether the children mapping has been built yet
    fn is_materialized(&self) -> bool {
        self.children_cell().get().is_some()
    }

    /// Look up a member by name; unknown names resolve to `None`
    fn member(&self, name: &str) -> Result<Option<&Value>> {
        Ok(self.children()?.get(name))
    }

    /// Shallow copy of the children mapping
    fn as_map(&self) -> Result<Map<'_>> {
        Ok(self
            .children()?
            .iter()
            .map(|(name, value)| (name.as_str(), value))
            .collect())
    }

    /// Convert to the requested shape
    fn convert(&self, shape: Shape) -> Result<Converted<'_>> {
        if let Some(converted) = self.convert_to(shape) {
            return converted;
        }

        match shape {
            Shape::Map => Ok(Converted::Map(self.as_map()?)),
            target => Err(Error::ConversionUnsupported {
                from: Self::LABEL,
                target,
            }),
        }
    }
}
