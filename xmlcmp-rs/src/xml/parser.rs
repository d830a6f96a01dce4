//! XML parser that builds document trees.
//!
//! This parser uses quick-xml's streaming API. Unlike a pretty printer's
//! input, text is kept verbatim: whitespace-only text nodes survive so the
//! comparison model can decide whether they are relevant.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use crate::error::{Error, Result};
use crate::node::{
    Document, ExpandedName, NamespaceContext, XmlElement, XmlNode, XmlProcessingInstruction,
};

/// Incremental document builder fed by quick-xml events.
pub struct XmlParser {
    /// Open elements, innermost last.
    stack: Vec<XmlElement>,
    /// Namespace bindings of the open elements.
    namespaces: NamespaceContext,
    /// Character data accumulated since the last markup event.
    text: String,
    /// The completed document element.
    root: Option<XmlElement>,
    /// Encoding from the XML declaration.
    encoding: Option<String>,
}

impl Default for XmlParser {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlParser {
    /// Creates a new parser.
    pub fn new() -> Self {
        XmlParser {
            stack: Vec::new(),
            namespaces: NamespaceContext::new(),
            text: String::new(),
            root: None,
            encoding: None,
        }
    }

    /// Parses XML from a string.
    pub fn parse_str(self, xml: &str) -> Result<Document> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text_start = false;
        reader.config_mut().trim_text_end = false;
        self.parse_reader(&mut reader)
    }

    /// Parses XML from a file.
    pub fn parse_file<P: AsRef<Path>>(self, path: P) -> Result<Document> {
        let path = path.as_ref();
        debug!(path = %path.display(), "parsing XML file");
        let file = File::open(path)?;
        let mut reader = Reader::from_reader(BufReader::new(file));
        reader.config_mut().trim_text_start = false;
        reader.config_mut().trim_text_end = false;
        self.parse_reader(&mut reader)
    }

    /// Parses XML from a quick-xml Reader.
    fn parse_reader<R: BufRead>(mut self, reader: &mut Reader<R>) -> Result<Document> {
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    self.flush_text()?;
                    let element = self.parse_element(e, reader)?;
                    self.stack.push(element);
                }
                Ok(Event::End(_)) => {
                    self.flush_text()?;
                    self.namespaces.pop_scope();
                    let element = self
                        .stack
                        .pop()
                        .ok_or_else(|| Error::Parse("unbalanced end tag".to_string()))?;
                    self.attach(XmlNode::Element(element))?;
                }
                Ok(Event::Empty(ref e)) => {
                    self.flush_text()?;
                    let element = self.parse_element(e, reader)?;
                    self.namespaces.pop_scope();
                    self.attach(XmlNode::Element(element))?;
                }
                Ok(Event::Text(e)) => {
                    let text = reader
                        .decoder()
                        .decode(e.as_ref())
                        .map_err(|e| Error::Parse(e.to_string()))?;
                    self.text.push_str(&text);
                }
                Ok(Event::GeneralRef(e)) => {
                    let char_ref = e
                        .resolve_char_ref()
                        .map_err(|e| Error::Parse(e.to_string()))?;
                    if let Some(ch) = char_ref {
                        self.text.push(ch);
                    } else {
                        let name = reader
                            .decoder()
                            .decode(e.as_ref())
                            .map_err(|e| Error::Parse(e.to_string()))?;
                        let resolved = resolve_predefined_entity(&name).ok_or_else(|| {
                            Error::Parse(format!("unknown entity reference: &{};", name))
                        })?;
                        self.text.push_str(resolved);
                    }
                }
                Ok(Event::CData(e)) => {
                    self.flush_text()?;
                    let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                    self.attach(XmlNode::CData(text))?;
                }
                Ok(Event::Comment(e)) => {
                    self.flush_text()?;
                    let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                    self.attach(XmlNode::Comment(text))?;
                }
                Ok(Event::PI(e)) => {
                    self.flush_text()?;
                    let target = String::from_utf8_lossy(e.target()).into_owned();
                    let content = String::from_utf8_lossy(e.content()).trim_start().to_string();
                    self.attach(XmlNode::ProcessingInstruction(XmlProcessingInstruction::new(
                        target, content,
                    )))?;
                }
                Ok(Event::Decl(e)) => {
                    if let Some(encoding) = e.encoding() {
                        let encoding = encoding.map_err(|e| Error::Parse(e.to_string()))?;
                        self.encoding = Some(String::from_utf8_lossy(&encoding).into_owned());
                    }
                }
                Ok(Event::DocType(_)) => {
                    // Ignore DOCTYPE
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::Parse(format!("XML parse error: {}", e))),
            }
            buf.clear();
        }

        if !self.stack.is_empty() {
            return Err(Error::Parse("unexpected end of document".to_string()));
        }
        let root = self
            .root
            .ok_or_else(|| Error::Parse("no document element".to_string()))?;
        let mut document = Document::new(root);
        document.set_encoding(self.encoding);
        Ok(document)
    }

    /// Parses an element's name and attributes and opens its namespace scope.
    fn parse_element<R: BufRead>(
        &mut self,
        e: &BytesStart,
        reader: &Reader<R>,
    ) -> Result<XmlElement> {
        let name = reader
            .decoder()
            .decode(e.name().as_ref())
            .map_err(|e| Error::Parse(e.to_string()))?
            .to_string();

        let mut attributes = Vec::new();
        for attr_result in e.attributes() {
            let attr = attr_result.map_err(|e| Error::Parse(format!("Attribute error: {}", e)))?;
            let key = reader
                .decoder()
                .decode(attr.key.as_ref())
                .map_err(|e| Error::Parse(e.to_string()))?
                .to_string();
            let value = attr
                .unescape_value()
                .map_err(|e| Error::Parse(e.to_string()))?
                .to_string();
            attributes.push((key, value));
        }

        self.namespaces.push_scope();
        self.namespaces
            .bind_declarations(attributes.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        let expanded: ExpandedName = self
            .namespaces
            .expand_element(&name)
            .ok_or_else(|| Error::Parse(format!("unbound namespace prefix in <{}>", name)))?;

        let mut element = XmlElement::with_expanded_name(name, expanded);
        for (key, value) in attributes {
            element.set_attribute(key, value);
        }
        Ok(element)
    }

    /// Turns accumulated character data into a text node.
    fn flush_text(&mut self) -> Result<()> {
        if self.text.is_empty() {
            return Ok(());
        }
        let text = std::mem::take(&mut self.text);
        if self.stack.is_empty() {
            // Character data outside the document element may only be whitespace.
            if text.trim().is_empty() {
                return Ok(());
            }
            return Err(Error::Parse(format!(
                "text outside the document element: {:?}",
                text.trim()
            )));
        }
        self.attach(XmlNode::Text(text))
    }

    /// Appends a node to the innermost open element, or installs it as the
    /// document element.
    fn attach(&mut self, node: XmlNode) -> Result<()> {
        if let Some(parent) = self.stack.last_mut() {
            parent.push_child(node);
            return Ok(());
        }
        match node {
            XmlNode::Element(element) => {
                if self.root.is_some() {
                    return Err(Error::Parse("multiple document elements".to_string()));
                }
                self.root = Some(element);
            }
            // Comments and processing instructions in the prolog or epilog
            // do not take part in comparison.
            _ => {}
        }
        Ok(())
    }
}

/// Parses XML from a file.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    XmlParser::new().parse_file(path)
}

/// Parses XML from a string.
pub fn parse_str(xml: &str) -> Result<Document> {
    XmlParser::new().parse_str(xml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_simple_xml() {
        let doc = parse_str(r#"<root><child>text</child></root>"#).unwrap();
        let root = doc.root();
        assert_eq!(root.qname(), "root");
        assert_eq!(root.children().len(), 1);

        let child = root.first_child_element("child").unwrap();
        assert_eq!(child.children(), &[XmlNode::Text("text".into())]);
    }

    #[test]
    fn test_parse_with_attributes() {
        let doc = parse_str(r#"<root id="foo" class="bar">content</root>"#).unwrap();
        assert_eq!(doc.root().attribute("id"), Some("foo"));
        assert_eq!(doc.root().attribute("class"), Some("bar"));
    }

    #[test]
    fn test_whitespace_is_preserved() {
        let doc = parse_str("<root>\n  <a/>\n</root>").unwrap();
        let children = doc.root().children();
        assert_eq!(children.len(), 3);
        assert_eq!(children[0], XmlNode::Text("\n  ".into()));
        assert!(children[1].is_element());
    }

    #[test]
    fn test_entities_resolved() {
        let doc = parse_str(r#"<root a="&lt;&amp;">x &amp; y &#65;&#x42;</root>"#).unwrap();
        assert_eq!(doc.root().attribute("a"), Some("<&"));
        assert_eq!(doc.root().text_content(), "x & y AB");
        assert_eq!(doc.root().children().len(), 1);
    }

    #[test]
    fn test_special_nodes() {
        let xml = r#"<?xml version="1.0" encoding="ISO-8859-1"?>
<!-- prolog comment -->
<root><?pi some data?><![CDATA[<raw>]]><!--c--></root>"#;
        let doc = parse_str(xml).unwrap();
        assert_eq!(doc.encoding(), Some("ISO-8859-1"));
        let children = doc.root().children();
        assert_eq!(
            children[0],
            XmlNode::ProcessingInstruction(XmlProcessingInstruction::new("pi", "some data"))
        );
        assert_eq!(children[1], XmlNode::CData("<raw>".into()));
        assert_eq!(children[2], XmlNode::Comment("c".into()));
    }

    #[test]
    fn test_namespaces_resolved() {
        let xml = r#"<a xmlns="urn:d" xmlns:p="urn:p"><p:b/><c xmlns=""/></a>"#;
        let doc = parse_str(xml).unwrap();
        let root = doc.root();
        assert_eq!(root.namespace_uri(), Some("urn:d"));
        let b = root.first_child_element("p:b").unwrap();
        assert_eq!(b.namespace_uri(), Some("urn:p"));
        assert_eq!(b.local_name(), "b");
        let c = root.first_child_element("c").unwrap();
        assert!(c.namespace_uri().is_none());
    }

    #[test]
    fn test_unbound_prefix_is_error() {
        assert!(matches!(parse_str("<p:a/>"), Err(Error::Parse(_))));
    }

    #[test]
    fn test_malformed_documents() {
        assert!(parse_str("<a><b></a>").is_err());
        assert!(parse_str("<a>").is_err());
        assert!(parse_str("").is_err());
        assert!(parse_str("<a/><b/>").is_err());
    }

    #[test]
    fn test_parse_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "<list><item no=\"1\">Alice</item></list>").unwrap();
        let doc = parse_file(file.path()).unwrap();
        assert_eq!(doc.root().qname(), "list");
        assert!(doc.encoding().is_none());
    }
}
