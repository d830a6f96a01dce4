//! XML content types for tree nodes.
//!
//! This module provides `XmlNode`, the owned node type of a parsed document,
//! and `XmlElement`, an element with its attributes and ordered children.

use indexmap::IndexMap;

use super::namespace::{split_qname, ExpandedName};

/// Represents one node of an XML document.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    /// An XML element with a qualified name, attributes and children.
    Element(XmlElement),
    /// Character data.
    Text(String),
    /// A CDATA section.
    CData(String),
    /// XML comment (without the `<!--` and `-->` markers).
    Comment(String),
    /// XML processing instruction.
    ProcessingInstruction(XmlProcessingInstruction),
}

impl XmlNode {
    /// Returns true if this is an element node.
    pub fn is_element(&self) -> bool {
        matches!(self, XmlNode::Element(_))
    }

    /// Returns a reference to the element, if this is an element node.
    pub fn as_element(&self) -> Option<&XmlElement> {
        match self {
            XmlNode::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Appends the string value of this node to `out`.
    fn collect_text(&self, out: &mut String) {
        match self {
            XmlNode::Element(e) => {
                for child in &e.children {
                    child.collect_text(out);
                }
            }
            XmlNode::Text(t) | XmlNode::CData(t) => out.push_str(t),
            XmlNode::Comment(_) | XmlNode::ProcessingInstruction(_) => {}
        }
    }
}

impl From<XmlElement> for XmlNode {
    fn from(element: XmlElement) -> Self {
        XmlNode::Element(element)
    }
}

/// An XML element with a qualified name and attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    /// The qualified name of the element (e.g., "div", "ns:element").
    name: String,
    /// The expanded name (namespace URI + local name).
    expanded_name: ExpandedName,
    /// Attributes in document order. The key is the qualified attribute name.
    /// Equality ignores the order.
    attributes: IndexMap<String, String>,
    /// Child nodes in document order.
    children: Vec<XmlNode>,
}

impl XmlElement {
    /// Creates a new element with no namespace, attributes or children.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let local = split_qname(&name).1.to_string();
        Self::with_expanded_name(name, ExpandedName::no_namespace(local))
    }

    /// Creates a new element with resolved namespace information.
    pub fn with_expanded_name(name: impl Into<String>, expanded_name: ExpandedName) -> Self {
        XmlElement {
            name: name.into(),
            expanded_name,
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Builder style: adds an attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Builder style: appends a child node.
    pub fn with_child(mut self, child: impl Into<XmlNode>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Builder style: appends a text child.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    /// Returns the qualified name of the element.
    pub fn qname(&self) -> &str {
        &self.name
    }

    /// Returns the local name of the element.
    pub fn local_name(&self) -> &str {
        &self.expanded_name.local_name
    }

    /// Returns the namespace URI, if the element is in a namespace.
    pub fn namespace_uri(&self) -> Option<&str> {
        self.expanded_name.namespace_uri.as_deref()
    }

    /// Returns the expanded name.
    pub fn expanded_name(&self) -> &ExpandedName {
        &self.expanded_name
    }

    /// Returns the attributes.
    pub fn attributes(&self) -> &IndexMap<String, String> {
        &self.attributes
    }

    /// Looks up an attribute value by qualified name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Sets an attribute, replacing any previous value.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Returns the child nodes.
    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }

    /// Appends a child node.
    pub fn push_child(&mut self, child: impl Into<XmlNode>) {
        self.children.push(child.into());
    }

    /// Iterates over child elements.
    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(XmlNode::as_element)
    }

    /// Returns the first child element with the given qualified name.
    pub fn first_child_element(&self, name: &str) -> Option<&XmlElement> {
        self.child_elements().find(|e| e.name == name)
    }

    /// Returns the concatenated text of all descendant text and CDATA nodes.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.collect_text(&mut out);
        }
        out
    }
}

/// XML processing instruction content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlProcessingInstruction {
    /// The target of the PI (e.g., "xml-stylesheet").
    target: String,
    /// The content/data of the PI (everything after the target).
    content: String,
}

impl XmlProcessingInstruction {
    /// Creates a new PI from target and content strings.
    pub fn new(target: impl Into<String>, content: impl Into<String>) -> Self {
        XmlProcessingInstruction {
            target: target.into(),
            content: content.into(),
        }
    }

    /// Returns the PI target.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Returns the PI content.
    pub fn content(&self) -> &str {
        &self.content
    }
}

impl std::fmt::Display for XmlProcessingInstruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.content.is_empty() {
            write!(f, "<?{}?>", self.target)
        } else {
            write!(f, "<?{} {}?>", self.target, self.content)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_order_does_not_affect_equality() {
        let a1 = XmlElement::new("a").with_attribute("x", "1").with_attribute("y", "2");
        let a2 = XmlElement::new("a").with_attribute("y", "2").with_attribute("x", "1");
        let a3 = a1.clone().with_attribute("z", "3");

        assert_eq!(a1, a2);
        assert_ne!(a1, a3);
    }

    #[test]
    fn test_local_name_from_qname() {
        let e = XmlElement::new("svg:rect");
        assert_eq!(e.qname(), "svg:rect");
        assert_eq!(e.local_name(), "rect");
        assert!(e.namespace_uri().is_none());
    }

    #[test]
    fn test_text_content_is_deep() {
        let e = XmlElement::new("p")
            .with_text("a ")
            .with_child(XmlElement::new("b").with_text("bold"))
            .with_child(XmlNode::CData(" c".into()))
            .with_child(XmlNode::Comment("ignored".into()));
        assert_eq!(e.text_content(), "a bold c");
    }

    #[test]
    fn test_pi_display() {
        assert_eq!(XmlProcessingInstruction::new("pi", "").to_string(), "<?pi?>");
        assert_eq!(
            XmlProcessingInstruction::new("xml-stylesheet", "href=\"a.xsl\"").to_string(),
            "<?xml-stylesheet href=\"a.xsl\"?>"
        );
    }
}
