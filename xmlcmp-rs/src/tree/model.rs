//! Comparison models for XML child nodes.

use bitflags::bitflags;
use rustc_hash::FxHashMap;
use tracing::trace;

use super::key::KeyExpression;
use crate::compare::{ComparisonModel, KeyExpressionSupport};
use crate::error::Result;
use crate::node::{is_xmlns_attr, Node, XmlElement, XmlNode};

bitflags! {
    /// Which node properties and node kinds take part in a comparison.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Relevance: u8 {
        /// Element namespace URIs are compared.
        const NAMESPACE = 1;
        /// Whitespace-only text nodes are children.
        const WHITESPACE = 1 << 1;
        /// Comments are children.
        const COMMENT = 1 << 2;
        /// CDATA sections are children of their own kind. Otherwise they are
        /// read as text.
        const CDATA = 1 << 3;
        /// Processing instructions are children.
        const PROCESSING_INSTRUCTION = 1 << 4;
    }
}

impl Default for Relevance {
    fn default() -> Self {
        Relevance::CDATA
    }
}

/// A comparison model for the child nodes of XML elements.
pub trait XmlComparisonModel: for<'a> ComparisonModel<Node<'a>> + KeyExpressionSupport {
    fn relevance(&self) -> Relevance;

    fn set_relevant(&mut self, flags: Relevance, relevant: bool);

    /// Returns the children of `element` that take part in a comparison.
    fn child_nodes<'a>(&self, element: &'a XmlElement) -> Vec<Node<'a>> {
        child_nodes(element, self.relevance())
    }
}

/// Extracts the structural children of `element` under `relevance`.
pub fn child_nodes(element: &XmlElement, relevance: Relevance) -> Vec<Node<'_>> {
    element
        .children()
        .iter()
        .filter_map(|child| match child {
            XmlNode::Element(e) => Some(Node::Element(e)),
            XmlNode::ProcessingInstruction(pi) => relevance
                .contains(Relevance::PROCESSING_INSTRUCTION)
                .then_some(Node::ProcessingInstruction(pi)),
            XmlNode::CData(text) if relevance.contains(Relevance::CDATA) => Some(Node::CData(text)),
            XmlNode::CData(text) => Some(Node::Text(text)),
            XmlNode::Text(text) => (relevance.contains(Relevance::WHITESPACE)
                || !text.trim().is_empty())
            .then_some(Node::Text(text)),
            XmlNode::Comment(c) => relevance
                .contains(Relevance::COMMENT)
                .then_some(Node::Comment(c)),
        })
        .collect()
}

/// Deep equality of two nodes: names, attributes and relevant children.
pub fn equal_nodes(a: Node<'_>, b: Node<'_>, relevance: Relevance) -> bool {
    match (a, b) {
        (Node::Element(e1), Node::Element(e2)) => equal_elements(e1, e2, relevance),
        (Node::ProcessingInstruction(p1), Node::ProcessingInstruction(p2)) => p1 == p2,
        _ => a.name() == b.name() && a.text_content() == b.text_content(),
    }
}

fn equal_elements(e1: &XmlElement, e2: &XmlElement, relevance: Relevance) -> bool {
    if !element_names_match(e1, e2, relevance) || !equal_attributes(e1, e2) {
        return false;
    }
    let c1 = child_nodes(e1, relevance);
    let c2 = child_nodes(e2, relevance);
    c1.len() == c2.len()
        && c1
            .iter()
            .zip(&c2)
            .all(|(a, b)| equal_nodes(*a, *b, relevance))
}

/// Local names match, and namespace URIs too when they are relevant.
pub fn element_names_match(e1: &XmlElement, e2: &XmlElement, relevance: Relevance) -> bool {
    e1.local_name() == e2.local_name()
        && (!relevance.contains(Relevance::NAMESPACE) || e1.namespace_uri() == e2.namespace_uri())
}

/// Attribute maps are equal, ignoring namespace declarations.
fn equal_attributes(e1: &XmlElement, e2: &XmlElement) -> bool {
    let significant = |e: &XmlElement| {
        e.attributes()
            .keys()
            .filter(|name| !is_xmlns_attr(name))
            .count()
    };
    significant(e1) == significant(e2)
        && e1
            .attributes()
            .iter()
            .filter(|(name, _)| !is_xmlns_attr(name))
            .all(|(name, value)| e2.attribute(name) == Some(value.as_str()))
}

/// Locator fragment of `items[index]`: `/name`, with a 1-based ordinal among
/// the siblings of the same name when the name is not unique.
pub fn xml_sub_path(items: &[Node<'_>], index: usize) -> String {
    let name = items[index].name();
    if name.is_empty() {
        return format!("[{}]", index + 1);
    }
    let homonyms = items.iter().filter(|n| n.name() == name).count();
    if homonyms > 1 {
        let ordinal = items[..=index].iter().filter(|n| n.name() == name).count();
        format!("/{}[{}]", name, ordinal)
    } else {
        format!("/{}", name)
    }
}

/// Pairs elements by name. Changed elements with the same name are treated
/// as versions of each other.
#[derive(Debug, Clone, Default)]
pub struct NameBasedXmlModel {
    relevance: Relevance,
}

impl NameBasedXmlModel {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<'a> ComparisonModel<Node<'a>> for NameBasedXmlModel {
    fn equal(&self, a: &Node<'a>, b: &Node<'a>) -> bool {
        equal_nodes(*a, *b, self.relevance)
    }

    fn correspond(&self, a: &Node<'a>, b: &Node<'a>) -> bool {
        a.name() == b.name()
    }

    fn sub_path(&self, items: &[Node<'a>], index: usize) -> String {
        xml_sub_path(items, index)
    }
}

impl KeyExpressionSupport for NameBasedXmlModel {}

impl XmlComparisonModel for NameBasedXmlModel {
    fn relevance(&self) -> Relevance {
        self.relevance
    }

    fn set_relevant(&mut self, flags: Relevance, relevant: bool) {
        self.relevance.set(flags, relevant);
    }
}

/// Pairs elements by local name, refined by per-element key expressions.
///
/// Text nodes always correspond to each other, so changed text is reported
/// as one `different` diff instead of a missing and an unexpected one.
#[derive(Debug, Clone, Default)]
pub struct DefaultXmlModel {
    relevance: Relevance,
    key_expressions: FxHashMap<String, KeyExpression>,
}

impl DefaultXmlModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the key expression registered for `element_name`.
    pub fn key_expression(&self, element_name: &str) -> Option<&KeyExpression> {
        self.key_expressions.get(element_name)
    }
}

impl<'a> ComparisonModel<Node<'a>> for DefaultXmlModel {
    fn equal(&self, a: &Node<'a>, b: &Node<'a>) -> bool {
        equal_nodes(*a, *b, self.relevance)
    }

    fn correspond(&self, a: &Node<'a>, b: &Node<'a>) -> bool {
        match (a, b) {
            (Node::Text(_), Node::Text(_)) => true,
            (Node::Element(e1), Node::Element(e2)) => {
                if e1.local_name() != e2.local_name() {
                    return false;
                }
                match self.key_expressions.get(e1.qname()) {
                    None => true,
                    Some(key) => key.evaluate(e1) == key.evaluate(e2),
                }
            }
            _ => a.name() == b.name(),
        }
    }

    fn sub_path(&self, items: &[Node<'a>], index: usize) -> String {
        xml_sub_path(items, index)
    }
}

impl KeyExpressionSupport for DefaultXmlModel {
    fn add_key_expression(&mut self, element_name: &str, expression: &str) -> Result<()> {
        let key = KeyExpression::parse(expression)?;
        trace!(element = element_name, key = %key, "registered key expression");
        self.key_expressions.insert(element_name.to_string(), key);
        Ok(())
    }
}

impl XmlComparisonModel for DefaultXmlModel {
    fn relevance(&self) -> Relevance {
        self.relevance
    }

    fn set_relevant(&mut self, flags: Relevance, relevant: bool) {
        self.relevance.set(flags, relevant);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::node::XmlProcessingInstruction;
    use crate::xml::parse_str;

    fn element(xml: &str) -> XmlElement {
        parse_str(xml).unwrap().root().clone()
    }

    #[test]
    fn test_equal_elements() {
        let relevance = Relevance::default();
        let a1 = element("<a x='1' y='2'/>");
        let a2 = element("<a y='2' x='1'/>");
        let a3 = element("<a x='1' y='2' z='3'/>");
        let b1 = element("<b x='1' y='2'/>");
        let c1 = element("<c><d/></c>");
        let c2 = element("<c><d/><d/></c>");
        let c3 = element("<c><d/><e/></c>");
        let eq = |x: &XmlElement, y: &XmlElement| equal_nodes(Node::Element(x), Node::Element(y), relevance);

        assert!(eq(&a1, &a2));
        assert!(!eq(&a1, &a3));
        assert!(!eq(&a1, &b1));
        assert!(!eq(&c1, &c2));
        assert!(!eq(&c1, &c3));
    }

    #[test]
    fn test_equality_ignores_namespace_declarations() {
        let a = element("<a xmlns:p='urn:p' x='1'/>");
        let b = element("<a x='1'/>");
        assert!(equal_nodes(Node::Element(&a), Node::Element(&b), Relevance::default()));
    }

    #[test]
    fn test_namespace_relevance() {
        let a = element("<a xmlns='urn:one'/>");
        let b = element("<a xmlns='urn:two'/>");
        assert!(element_names_match(&a, &b, Relevance::default()));
        assert!(!element_names_match(&a, &b, Relevance::default() | Relevance::NAMESPACE));
    }

    #[test]
    fn test_whitespace_relevance() {
        let e = element("<a>\n  <b/>\n</a>");
        assert_eq!(child_nodes(&e, Relevance::default()).len(), 1);
        assert_eq!(child_nodes(&e, Relevance::WHITESPACE).len(), 3);

        let indented = element("<a>\n  <b>x</b>\n</a>");
        let flat = element("<a><b>x</b></a>");
        assert!(equal_nodes(Node::Element(&indented), Node::Element(&flat), Relevance::default()));
        assert!(!equal_nodes(Node::Element(&indented), Node::Element(&flat), Relevance::WHITESPACE));
    }

    #[test]
    fn test_cdata_relevance() {
        let e = element("<a><![CDATA[x]]></a>");
        assert_eq!(child_nodes(&e, Relevance::CDATA), [Node::CData("x")]);
        assert_eq!(child_nodes(&e, Relevance::empty()), [Node::Text("x")]);
    }

    #[test]
    fn test_comment_and_pi_relevance() {
        let e = element("<a><!--c--><?pi data?><b/></a>");
        assert_eq!(child_nodes(&e, Relevance::default()).len(), 1);
        let all = child_nodes(&e, Relevance::COMMENT | Relevance::PROCESSING_INSTRUCTION);
        assert_eq!(all.len(), 3);
        assert_eq!(all[0], Node::Comment("c"));
        assert_eq!(
            all[1].as_processing_instruction(),
            Some(&XmlProcessingInstruction::new("pi", "data"))
        );
    }

    #[test]
    fn test_sub_paths() {
        let e = element("<list><item/><other/><item/>text</list>");
        let children = child_nodes(&e, Relevance::default());
        assert_eq!(xml_sub_path(&children, 0), "/item[1]");
        assert_eq!(xml_sub_path(&children, 1), "/other");
        assert_eq!(xml_sub_path(&children, 2), "/item[2]");
        assert_eq!(xml_sub_path(&children, 3), "/#text");
    }

    #[test]
    fn test_name_based_correspondence() {
        let model = NameBasedXmlModel::new();
        let a = element("<item no='1'>Alice</item>");
        let b = element("<item no='2'>Bob</item>");
        let c = element("<other/>");
        assert!(model.correspond(&Node::Element(&a), &Node::Element(&b)));
        assert!(!model.correspond(&Node::Element(&a), &Node::Element(&c)));
        assert!(!model.equal(&Node::Element(&a), &Node::Element(&b)));
    }

    #[test]
    fn test_name_based_model_rejects_key_expressions() {
        let mut model = NameBasedXmlModel::new();
        assert!(matches!(
            model.add_key_expression("item", "@no"),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_key_expression_correspondence() {
        let mut model = DefaultXmlModel::new();
        let alice1 = element("<item no='1'>Alice</item>");
        let bob1 = element("<item no='1'>Bob</item>");
        let alice2 = element("<item no='2'>Alice</item>");

        assert!(model.correspond(&Node::Element(&alice1), &Node::Element(&alice2)));

        model.add_key_expression("item", "@no").unwrap();
        assert!(model.correspond(&Node::Element(&alice1), &Node::Element(&bob1)));
        assert!(!model.correspond(&Node::Element(&alice1), &Node::Element(&alice2)));

        model.add_key_expression("item", "text()").unwrap();
        assert!(model.correspond(&Node::Element(&alice1), &Node::Element(&alice2)));
        assert_eq!(model.key_expression("item").map(|k| k.as_str()), Some("text()"));
    }

    #[test]
    fn test_invalid_key_expression_is_rejected_at_registration() {
        let mut model = DefaultXmlModel::new();
        assert!(matches!(
            model.add_key_expression("item", "@"),
            Err(Error::InvalidKeyExpression { .. })
        ));
        assert!(model.key_expression("item").is_none());
    }

    #[test]
    fn test_text_nodes_always_correspond() {
        let model = DefaultXmlModel::new();
        assert!(model.correspond(&Node::Text("a"), &Node::Text("b")));
        assert!(!model.correspond(&Node::Text("a"), &Node::Comment("a")));
    }

    #[test]
    fn test_set_relevant() {
        let mut model = DefaultXmlModel::new();
        assert_eq!(model.relevance(), Relevance::CDATA);
        model.set_relevant(Relevance::CDATA, false);
        model.set_relevant(Relevance::COMMENT, true);
        assert_eq!(model.relevance(), Relevance::COMMENT);
    }
}
