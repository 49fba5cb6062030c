//! DOM Module - parsed node input for the item tree
//!
//! The parser itself is `roxmltree`; this module only owns what comes out
//! of it:
//! - `XmlNode`: detached element with local name, child elements and text
//! - `ParseOptions` / `parse`: parser settings and the parse entry point

pub mod document;
pub mod node;

pub use document::{parse, ParseOptions};
pub use node::XmlNode;
