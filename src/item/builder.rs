//! Item Builder
//!
//! Decides what a parsed node turns into: a node with child elements becomes
//! a navigable `Element`, anything else is a leaf holding its decoded text.
//! The entity codec is re-exported here so callers find encode/decode next
//! to the rule that applies it.

use super::{Element, Value};
use crate::dom::XmlNode;
use std::borrow::Cow;

pub use crate::core::entities::{decode, encode};

/// Wrap a parsed node as an item value
pub fn generate_item(node: XmlNode) -> Value {
    if node.has_elements() {
        return Value::Element(Element::new(node));
    }

    let text = node.into_text();
    let decoded = match decode(&text) {
        Cow::Borrowed(_) => None,
        Cow::Owned(decoded) => Some(decoded),
    };
    Value::Leaf(decoded.unwrap_or(text))
}
