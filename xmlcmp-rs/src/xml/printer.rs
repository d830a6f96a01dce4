//! XML printer that renders element trees as text.
//!
//! Used to format element values in diff messages, so it writes to any
//! `fmt::Write` sink and never fails on a `String`.

use std::fmt::{self, Write};

use crate::node::{XmlElement, XmlNode};

/// XML printer that outputs element trees in compact form, the way they
/// appear in diff messages.
pub struct XmlPrinter<W: Write> {
    writer: W,
}

impl<W: Write> XmlPrinter<W> {
    /// Creates a new XML printer.
    pub fn new(writer: W) -> Self {
        XmlPrinter { writer }
    }

    /// Prints an element and its subtree.
    pub fn print(&mut self, element: &XmlElement) -> fmt::Result {
        self.print_element(element)
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn print_node(&mut self, node: &XmlNode) -> fmt::Result {
        match node {
            XmlNode::Element(e) => self.print_element(e),
            XmlNode::Text(t) => self.writer.write_str(&to_entities(t, false)),
            XmlNode::CData(t) => write!(self.writer, "<![CDATA[{}]]>", t),
            XmlNode::Comment(c) => write!(self.writer, "<!--{}-->", c),
            XmlNode::ProcessingInstruction(pi) => write!(self.writer, "{}", pi),
        }
    }

    fn print_element(&mut self, element: &XmlElement) -> fmt::Result {
        let qname = element.qname();
        write!(self.writer, "<{}", qname)?;
        for (name, value) in element.attributes() {
            write!(self.writer, " {}=\"{}\"", name, to_entities(value, true))?;
        }

        if element.children().is_empty() {
            return self.writer.write_str(" />");
        }
        self.writer.write_char('>')?;
        for child in element.children() {
            self.print_node(child)?;
        }
        write!(self.writer, "</{}>", qname)
    }
}

/// Converts special characters to XML entities. Quotes are only escaped in
/// attribute values.
fn to_entities(s: &str, attribute: bool) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' if attribute => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    result
}

/// Prints an element tree to a compact string.
pub fn print_to_string(element: &XmlElement) -> String {
    let mut printer = XmlPrinter::new(String::new());
    // Writing into a String cannot fail.
    let _ = printer.print(element);
    printer.into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_str;

    #[test]
    fn test_print_simple() {
        let doc = parse_str(r#"<root id="foo">text</root>"#).unwrap();
        assert_eq!(print_to_string(doc.root()), r#"<root id="foo">text</root>"#);
    }

    #[test]
    fn test_print_empty_element() {
        let doc = parse_str(r#"<root><empty/></root>"#).unwrap();
        assert_eq!(print_to_string(doc.root()), "<root><empty /></root>");
    }

    #[test]
    fn test_entity_encoding() {
        let doc = parse_str(r#"<root attr="&amp;&quot;">a &lt; b</root>"#).unwrap();
        let output = print_to_string(doc.root());
        assert_eq!(output, r#"<root attr="&amp;&quot;">a &lt; b</root>"#);
    }

    #[test]
    fn test_round_trip_mixed_content() {
        let xml = r#"<root>text1<child a="1">inner</child>text2<!--c--><?pi data?></root>"#;
        let doc1 = parse_str(xml).unwrap();
        let doc2 = parse_str(&print_to_string(doc1.root())).unwrap();
        assert_eq!(doc1.root(), doc2.root());
    }
}
