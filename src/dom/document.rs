//! XML Document parsing
//!
//! Runs the text through `roxmltree` and detaches the root element into an
//! owned `XmlNode` tree, so nothing borrows the input afterwards and the
//! result can be stored in a ResourceArc without lifetime issues.
//!
//! The parser recurses once per nesting level, so element depth is checked
//! with a byte scan before the text reaches it.

use super::node::XmlNode;
use crate::error::{Error, Result};
use memchr::{memchr, memmem};

/// Default element nesting limit, sized for dirty scheduler stacks
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Parser settings applied on every load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Accept documents carrying a DOCTYPE declaration
    pub allow_dtd: bool,
    /// Maximum number of parser nodes before the document is rejected
    pub nodes_limit: u32,
    /// Maximum element nesting depth, root included
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            allow_dtd: true,
            nodes_limit: u32::MAX,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParseOptions {
    fn to_parsing_options<'i>(self) -> roxmltree::ParsingOptions<'i> {
        let mut options = roxmltree::ParsingOptions::default();
        options.allow_dtd = self.allow_dtd;
        options.nodes_limit = self.nodes_limit;
        options
    }
}

/// Parse a complete document and return its root element
pub fn parse(text: &str, options: ParseOptions) -> Result<XmlNode> {
    check_depth(text.as_bytes(), options.max_depth)?;
    let doc = roxmltree::Document::parse_with_options(text, options.to_parsing_options())?;
    Ok(XmlNode::from_parsed(doc.root_element()))
}

/// Reject input whose element nesting goes past `max_depth`
///
/// Comments, CDATA sections and processing instructions are skipped whole.
/// Malformed markup is left for the parser to report.
fn check_depth(bytes: &[u8], max_depth: usize) -> Result<()> {
    let mut depth = 0usize;
    let mut pos = 0;

    while let Some(offset) = memchr(b'<', &bytes[pos..]) {
        let start = pos + offset + 1;
        let rest = &bytes[start..];

        pos = match rest.first() {
            Some(b'/') => {
                depth = depth.saturating_sub(1);
                start
            }
            Some(b'?') => skip_past(bytes, start, b"?>"),
            Some(b'!') if rest.starts_with(b"!--") => skip_past(bytes, start, b"-->"),
            Some(b'!') if rest.starts_with(b"![CDATA[") => skip_past(bytes, start, b"]]>"),
            Some(b'!') => start,
            _ => {
                let end = tag_end(bytes, start);
                let level = depth + 1;
                if level > max_depth {
                    return Err(Error::DepthLimitExceeded(max_depth));
                }
                let self_closing = end < bytes.len() && bytes[end - 1] == b'/';
                if !self_closing {
                    depth = level;
                }
                end
            }
        };
    }
    Ok(())
}

/// Position just after the next `pattern` at or past `from`
fn skip_past(bytes: &[u8], from: usize, pattern: &[u8]) -> usize {
    match memmem::find(&bytes[from..], pattern) {
        Some(index) => from + index + pattern.len(),
        None => bytes.len(),
    }
}

/// Index of the `>` closing a start tag, ignoring any inside quoted
/// attribute values
fn tag_end(bytes: &[u8], from: usize) -> usize {
    let mut quote = None;
    for (index, &byte) in bytes.iter().enumerate().skip(from) {
        match (quote, byte) {
            (None, b'"' | b'\'') => quote = Some(byte),
            (Some(q), _) if q == byte => quote = None,
            (None, b'>') => return index,
            _ => {}
        }
    }
    bytes.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested(depth: usize) -> String {
        format!("{}x{}", "<a>".repeat(depth), "</a>".repeat(depth))
    }

    #[test]
    fn test_parse_simple() {
        let root = parse("<root>hello</root>", ParseOptions::default()).unwrap();
        assert_eq!(root.name(), "root");
        assert_eq!(root.text(), "hello");
    }

    #[test]
    fn test_parse_with_declaration() {
        let root = parse(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<xml><a>1</a><b>2</b></xml>",
            ParseOptions::default(),
        )
        .unwrap();
        assert_eq!(root.name(), "xml");
        assert_eq!(root.children().len(), 2);
    }

    #[test]
    fn test_parse_malformed() {
        let result = parse("<root><open></root>", ParseOptions::default());
        assert!(matches!(result, Err(Error::MalformedDocument(_))));
    }

    #[test]
    fn test_dtd_accepted_by_default() {
        let text = "<!DOCTYPE root [<!ENTITY e \"x\">]><root>&e;</root>";
        let root = parse(text, ParseOptions::default()).unwrap();
        assert_eq!(root.text(), "x");

        let options = ParseOptions {
            allow_dtd: false,
            ..ParseOptions::default()
        };
        assert!(matches!(parse(text, options), Err(Error::MalformedDocument(_))));
    }

    #[test]
    fn test_nodes_limit() {
        let options = ParseOptions {
            nodes_limit: 3,
            ..ParseOptions::default()
        };
        assert!(parse("<r><a/><b/><c/><d/></r>", options).is_err());
    }

    #[test]
    fn test_depth_at_limit_parses() {
        let root = parse(&nested(DEFAULT_MAX_DEPTH), ParseOptions::default()).unwrap();
        assert_eq!(root.name(), "a");
    }

    #[test]
    fn test_deep_document_rejected_before_parsing() {
        let result = parse(&nested(3000), ParseOptions::default());
        assert!(matches!(result, Err(Error::DepthLimitExceeded(DEFAULT_MAX_DEPTH))));

        let options = ParseOptions {
            max_depth: 2,
            ..ParseOptions::default()
        };
        assert!(matches!(parse(&nested(3), options), Err(Error::DepthLimitExceeded(2))));
    }

    #[test]
    fn test_depth_scan_skips_non_elements() {
        let options = ParseOptions {
            max_depth: 2,
            ..ParseOptions::default()
        };
        let text = r#"<?xml version="1.0"?><r><!-- <a><b><c> --><a x="1>2"/><a/><![CDATA[<b><c>]]><b>1</b></r>"#;
        let root = parse(text, options).unwrap();
        assert_eq!(root.children().len(), 3);
    }

    #[test]
    fn test_check_depth_counts_siblings_once() {
        assert!(check_depth(b"<r><a></a><a></a><a/></r>", 2).is_ok());
        assert!(matches!(check_depth(b"<r><a/></r>", 1), Err(Error::DepthLimitExceeded(1))));
    }
}
