//! Parsed XML node
//!
//! Owned, detached copy of one element from the parser's tree. Only what the
//! item tree needs is kept: the local tag name, the child elements and the
//! direct text content.

use std::mem;

/// An element node detached from the parser's document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlNode {
    /// Local tag name (namespace prefix stripped)
    name: String,
    /// Child elements in document order
    children: Vec<XmlNode>,
    /// Concatenated text and CDATA content of the direct children
    text: String,
}

impl XmlNode {
    /// Create a text-only node
    #[cfg(test)]
    pub fn leaf(name: impl Into<String>, text: impl Into<String>) -> Self {
        XmlNode {
            name: name.into(),
            children: Vec::new(),
            text: text.into(),
        }
    }

    /// Create a node with child elements
    #[cfg(test)]
    pub fn branch(name: impl Into<String>, children: Vec<XmlNode>) -> Self {
        XmlNode {
            name: name.into(),
            children,
            text: String::new(),
        }
    }

    fn open(node: roxmltree::Node<'_, '_>) -> Self {
        XmlNode {
            name: node.tag_name().name().to_string(),
            children: Vec::new(),
            text: String::new(),
        }
    }

    /// Build from a parser node, copying its whole subtree
    ///
    /// Walks with an explicit stack of open ancestors, so input depth never
    /// turns into call depth.
    pub(crate) fn from_parsed(root: roxmltree::Node<'_, '_>) -> Self {
        let mut current = (XmlNode::open(root), root.children());
        let mut ancestors = Vec::new();

        loop {
            match current.1.next() {
                Some(child) if child.is_element() => {
                    let parent = mem::replace(&mut current, (XmlNode::open(child), child.children()));
                    ancestors.push(parent);
                }
                Some(child) if child.is_text() => {
                    if let Some(content) = child.text() {
                        current.0.text.push_str(content);
                    }
                }
                Some(_) => {}
                None => match ancestors.pop() {
                    Some(parent) => {
                        let (done, _) = mem::replace(&mut current, parent);
                        current.0.children.push(done);
                    }
                    None => return current.0,
                },
            }
        }
    }

    /// Local tag name
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Direct text content
    #[cfg(test)]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Check if this node has child elements
    #[inline]
    pub fn has_elements(&self) -> bool {
        !self.children.is_empty()
    }

    #[inline]
    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }

    /// Take the child elements, consuming the node
    pub fn into_children(self) -> Vec<XmlNode> {
        self.children
    }

    /// Take the text content, consuming the node
    pub fn into_text(self) -> String {
        self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_node() {
        let node = XmlNode::leaf("name", "value");
        assert_eq!(node.name(), "name");
        assert_eq!(node.text(), "value");
        assert!(!node.has_elements());
    }

    #[test]
    fn test_from_parsed_mixed_content() {
        let doc = roxmltree::Document::parse("<a>one<b>x</b>two<!-- c --><![CDATA[<three>]]></a>").unwrap();
        let node = XmlNode::from_parsed(doc.root_element());

        assert_eq!(node.name(), "a");
        assert!(node.has_elements());
        assert_eq!(node.children().len(), 1);
        assert_eq!(node.children()[0].text(), "x");
        assert_eq!(node.text(), "onetwo<three>");
    }

    #[test]
    fn test_from_parsed_strips_prefix() {
        let doc = roxmltree::Document::parse(r#"<r xmlns:p="urn:p"><p:item>1</p:item></r>"#).unwrap();
        let node = XmlNode::from_parsed(doc.root_element());
        assert_eq!(node.children()[0].name(), "item");
    }

    #[test]
    fn test_from_parsed_keeps_order_across_levels() {
        let doc = roxmltree::Document::parse("<r><a><b>1</b><c>2</c></a><d>3</d></r>").unwrap();
        let node = XmlNode::from_parsed(doc.root_element());

        let expected = XmlNode::branch(
            "r",
            vec![
                XmlNode::branch("a", vec![XmlNode::leaf("b", "1"), XmlNode::leaf("c", "2")]),
                XmlNode::leaf("d", "3"),
            ],
        );
        assert_eq!(node, expected);
    }

    #[test]
    fn test_from_parsed_deep_tree() {
        let depth = 3000;
        let text = format!("{}x{}", "<n>".repeat(depth), "</n>".repeat(depth));

        // roxmltree itself recurses per level, so it gets a large stack here
        let handle = std::thread::Builder::new()
            .stack_size(256 * 1024 * 1024)
            .spawn(move || {
                let doc = roxmltree::Document::parse(&text).unwrap();
                let node = XmlNode::from_parsed(doc.root_element());

                let mut levels = 1;
                let mut cursor = &node;
                while let Some(child) = cursor.children().first() {
                    levels += 1;
                    cursor = child;
                }
                assert_eq!(cursor.text(), "x");

                // unnest before dropping so teardown stays shallow too
                let mut pending = vec![node];
                while let Some(next) = pending.pop() {
                    pending.extend(next.into_children());
                }
                levels
            })
            .unwrap();
        assert_eq!(handle.join().unwrap(), depth);
    }
}
