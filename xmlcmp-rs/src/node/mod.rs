//! Node structures for XML tree representation.
//!
//! A parsed [`Document`] owns a tree of [`XmlNode`]s. Comparison works on
//! [`Node`], a borrowed `Copy` view of one child node, so that sibling lists
//! can be filtered and re-typed (CDATA read as text, for example) without
//! cloning subtrees.

pub mod namespace;
mod xml_content;

pub use namespace::{is_xmlns_attr, split_qname, ExpandedName, NamespaceContext};
pub use xml_content::{XmlElement, XmlNode, XmlProcessingInstruction};

use std::borrow::Cow;
use std::fmt;

use crate::constants::{CDATA_NODE_NAME, COMMENT_NODE_NAME, PI_NODE_NAME, TEXT_NODE_NAME};

/// A parsed XML document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Encoding declared in the XML declaration, if any.
    encoding: Option<String>,
    /// The document element.
    root: XmlElement,
}

impl Document {
    /// Creates a document without an encoding declaration.
    pub fn new(root: XmlElement) -> Self {
        Document {
            encoding: None,
            root,
        }
    }

    /// Builder style: sets the declared encoding.
    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = Some(encoding.into());
        self
    }

    /// Returns the declared encoding.
    pub fn encoding(&self) -> Option<&str> {
        self.encoding.as_deref()
    }

    /// Sets or clears the declared encoding.
    pub fn set_encoding(&mut self, encoding: Option<String>) {
        self.encoding = encoding;
    }

    /// Returns the document element.
    pub fn root(&self) -> &XmlElement {
        &self.root
    }
}

/// Borrowed view of one node, the element type compared by XML models.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Node<'a> {
    Element(&'a XmlElement),
    Text(&'a str),
    CData(&'a str),
    Comment(&'a str),
    ProcessingInstruction(&'a XmlProcessingInstruction),
}

impl<'a> Node<'a> {
    /// Returns the node name used in locators: the qualified name for
    /// elements and a fixed synthetic name for everything else.
    pub fn name(&self) -> &'a str {
        match self {
            Node::Element(e) => e.qname(),
            Node::Text(_) => TEXT_NODE_NAME,
            Node::CData(_) => CDATA_NODE_NAME,
            Node::Comment(_) => COMMENT_NODE_NAME,
            Node::ProcessingInstruction(_) => PI_NODE_NAME,
        }
    }

    /// Returns the string value of the node.
    pub fn text_content(&self) -> Cow<'a, str> {
        match self {
            Node::Element(e) => Cow::Owned(e.text_content()),
            Node::Text(t) | Node::CData(t) | Node::Comment(t) => Cow::Borrowed(t),
            Node::ProcessingInstruction(pi) => Cow::Borrowed(pi.content()),
        }
    }

    /// Returns true if this is an element node.
    pub fn is_element(&self) -> bool {
        matches!(self, Node::Element(_))
    }

    /// Returns the element, if this is an element node.
    pub fn as_element(&self) -> Option<&'a XmlElement> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the text, if this is a text node.
    pub fn as_text(&self) -> Option<&'a str> {
        match self {
            Node::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Returns the processing instruction, if this is one.
    pub fn as_processing_instruction(&self) -> Option<&'a XmlProcessingInstruction> {
        match self {
            Node::ProcessingInstruction(pi) => Some(pi),
            _ => None,
        }
    }
}

impl<'a> From<&'a XmlNode> for Node<'a> {
    fn from(node: &'a XmlNode) -> Self {
        match node {
            XmlNode::Element(e) => Node::Element(e),
            XmlNode::Text(t) => Node::Text(t),
            XmlNode::CData(t) => Node::CData(t),
            XmlNode::Comment(c) => Node::Comment(c),
            XmlNode::ProcessingInstruction(pi) => Node::ProcessingInstruction(pi),
        }
    }
}

impl fmt::Display for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Element(e) => f.write_str(&crate::xml::print_to_string(e)),
            Node::Text(t) => f.write_str(t),
            Node::CData(t) => write!(f, "<![CDATA[{}]]>", t),
            Node::Comment(c) => write!(f, "<!--{}-->", c),
            Node::ProcessingInstruction(pi) => write!(f, "{}", pi),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_names() {
        let e = XmlElement::new("ns:item");
        let pi = XmlProcessingInstruction::new("target", "data");
        assert_eq!(Node::Element(&e).name(), "ns:item");
        assert_eq!(Node::Text("x").name(), "#text");
        assert_eq!(Node::CData("x").name(), "#cdata-section");
        assert_eq!(Node::Comment("x").name(), "#comment");
        assert_eq!(Node::ProcessingInstruction(&pi).name(), "procint");
    }

    #[test]
    fn test_node_from_xml_node() {
        let nodes = vec![
            XmlNode::Element(XmlElement::new("a")),
            XmlNode::Text("t".into()),
            XmlNode::Comment("c".into()),
        ];
        let views: Vec<Node<'_>> = nodes.iter().map(Node::from).collect();
        assert!(views[0].is_element());
        assert_eq!(views[1].as_text(), Some("t"));
        assert_eq!(views[2].text_content(), "c");
    }

    #[test]
    fn test_node_display() {
        let e = XmlElement::new("item").with_attribute("no", "1").with_text("Alice");
        assert_eq!(Node::Element(&e).to_string(), "<item no=\"1\">Alice</item>");
        assert_eq!(Node::Comment(" c ").to_string(), "<!-- c -->");
    }

    #[test]
    fn test_document_encoding() {
        let mut doc = Document::new(XmlElement::new("root")).with_encoding("UTF-8");
        assert_eq!(doc.encoding(), Some("UTF-8"));
        doc.set_encoding(None);
        assert!(doc.encoding().is_none());
    }
}
