//! Recursive comparison of XML documents.
//!
//! [`XmlComparator`] walks two documents in parallel. For every pair of
//! elements it compares names, then attributes, then aligns the children
//! with [`ArrayComparator`]. Children that changed are compared recursively,
//! so a changed attribute deep in a subtree is reported at its own locator
//! instead of as a changed top-level element.
//!
//! # Example
//!
//! ```
//! use xmlcmp::tree::{XmlComparator, XmlComparisonSettings};
//! use xmlcmp::xml::parse_str;
//!
//! let expected = parse_str(r#"<root att="val"><node>text</node></root>"#).unwrap();
//! let actual = parse_str(r#"<root att="val2"><node>text</node></root>"#).unwrap();
//!
//! let comparator = XmlComparator::new(XmlComparisonSettings::default());
//! let diff = comparator.compare(&expected, &actual);
//! assert_eq!(diff.detail_count(), 1);
//! assert_eq!(
//!     comparator.render(&diff.details()[0]),
//!     "Different attribute: expected 'val' but found 'val2' at /root/@att"
//! );
//! ```

mod key;
mod model;
mod settings;

pub use key::KeyExpression;
pub use model::{
    child_nodes, element_names_match, equal_nodes, xml_sub_path, DefaultXmlModel,
    NameBasedXmlModel, Relevance, XmlComparisonModel,
};
pub use settings::XmlComparisonSettings;

use std::borrow::Cow;
use std::fmt;
use std::path::Path;

use tracing::{debug, trace};

use crate::compare::{normalize_space, quoted, AggregateDiff, ArrayComparator, DiffDetail, DiffKind};
use crate::constants::{
    ATTRIBUTE, DOCUMENT_ENCODING, DOCUMENT_LOCATOR, ELEMENT_NAME, ELEMENT_NAMESPACE, ELEMENT_TEXT,
    NO_NAMESPACE, PI_NODE_NAME, PROCESSING_INSTRUCTION, TEXT_NODE_NAME,
};
use crate::error::{Error, Result};
use crate::node::{is_xmlns_attr, Document, Node, XmlElement};
use crate::xml::{parse_file, print_to_string};

/// Encoding assumed for documents without an encoding declaration.
const DEFAULT_ENCODING: &str = "UTF-8";

/// A value reported in an XML diff: a node, or a string such as an
/// attribute value or an element's text.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlValue<'a> {
    Node(Node<'a>),
    Text(Cow<'a, str>),
}

impl<'a> XmlValue<'a> {
    /// Creates a text value.
    pub fn text(text: impl Into<Cow<'a, str>>) -> Self {
        XmlValue::Text(text.into())
    }

    pub fn as_node(&self) -> Option<Node<'a>> {
        match self {
            XmlValue::Node(node) => Some(*node),
            XmlValue::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            XmlValue::Text(text) => Some(text),
            XmlValue::Node(_) => None,
        }
    }
}

impl<'a> From<Node<'a>> for XmlValue<'a> {
    fn from(node: Node<'a>) -> Self {
        XmlValue::Node(node)
    }
}

impl<'a> From<&'a str> for XmlValue<'a> {
    fn from(text: &'a str) -> Self {
        XmlValue::Text(Cow::Borrowed(text))
    }
}

impl fmt::Display for XmlValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XmlValue::Node(node) => node.fmt(f),
            XmlValue::Text(text) => f.write_str(text),
        }
    }
}

/// Value format of XML reports: elements are printed as XML on lines of
/// their own, everything else is quoted.
pub fn xml_format(value: Option<&XmlValue<'_>>) -> String {
    match value {
        Some(XmlValue::Node(Node::Element(element))) => {
            format!("\n{}\n", print_to_string(element))
        }
        other => quoted(other),
    }
}

/// The diff of two XML documents.
pub type XmlDiff<'a, M> = AggregateDiff<'a, Document, XmlComparisonSettings<M>, XmlValue<'a>>;

/// Compares XML documents under a fixed set of settings.
///
/// A comparator can be reused for any number of comparisons; it never
/// changes its settings.
#[derive(Debug, Clone)]
pub struct XmlComparator<M = DefaultXmlModel> {
    settings: XmlComparisonSettings<M>,
}

impl Default for XmlComparator<DefaultXmlModel> {
    fn default() -> Self {
        Self::new(XmlComparisonSettings::default())
    }
}

impl<M: XmlComparisonModel> XmlComparator<M> {
    pub fn new(settings: XmlComparisonSettings<M>) -> Self {
        XmlComparator { settings }
    }

    pub fn settings(&self) -> &XmlComparisonSettings<M> {
        &self.settings
    }

    /// Compares two documents and returns every difference that is not
    /// tolerated.
    pub fn compare<'a>(&'a self, expected: &'a Document, actual: &'a Document) -> XmlDiff<'a, M> {
        let mut diffs = AggregateDiff::new(expected, actual, &self.settings);

        let expected_encoding = expected.encoding().unwrap_or(DEFAULT_ENCODING);
        let actual_encoding = actual.encoding().unwrap_or(DEFAULT_ENCODING);
        if self.settings.is_encoding_relevant()
            && !expected_encoding.eq_ignore_ascii_case(actual_encoding)
        {
            let diff = DiffDetail::different(
                XmlValue::from(expected_encoding),
                XmlValue::from(actual_encoding),
                DOCUMENT_ENCODING,
                DOCUMENT_LOCATOR,
                DOCUMENT_LOCATOR,
            );
            if !self.settings.is_tolerated(&diff) {
                diffs.add_detail(diff);
            }
        }

        let root_path = format!("/{}", expected.root().qname());
        self.compare_elements(expected.root(), actual.root(), &root_path, &mut diffs);
        debug!(diffs = diffs.detail_count(), "compared documents");
        diffs
    }

    /// Parses and compares two files.
    ///
    /// Returns `Ok(())` if the documents match and [`Error::Mismatch`] with
    /// the rendered report if they do not.
    pub fn check_files<P: AsRef<Path>>(&self, expected: P, actual: P) -> Result<()> {
        let expected = parse_file(expected)?;
        let actual = parse_file(actual)?;
        self.check(&expected, &actual)
    }

    /// Compares two documents, failing with [`Error::Mismatch`] on any
    /// difference.
    pub fn check(&self, expected: &Document, actual: &Document) -> Result<()> {
        let diffs = self.compare(expected, actual);
        if diffs.is_empty() {
            return Ok(());
        }
        Err(Error::Mismatch {
            count: diffs.detail_count(),
            report: self.mismatch_report(&diffs),
        })
    }

    /// Panics with a report of all differences if the documents differ.
    pub fn assert_equals(&self, expected: &Document, actual: &Document) {
        if let Err(e) = self.check(expected, actual) {
            panic!("{}", e);
        }
    }

    /// Renders one diff with the XML value format.
    pub fn render(&self, diff: &DiffDetail<XmlValue<'_>>) -> String {
        normalize_space(&diff.render(&xml_format))
    }

    /// Renders a whole diff with the XML value format.
    pub fn report(&self, diffs: &XmlDiff<'_, M>) -> String {
        diffs.render_with(&xml_format)
    }

    fn mismatch_report(&self, diffs: &XmlDiff<'_, M>) -> String {
        let count = diffs.detail_count();
        let mut message = format!(
            "Documents do not match. Found {} difference{}",
            count,
            if count == 1 { "" } else { "s" }
        );
        for diff in diffs.details() {
            message.push('\n');
            message.push_str(&self.render(diff));
        }
        message
    }

    fn compare_elements<'a>(
        &'a self,
        expected: &'a XmlElement,
        actual: &'a XmlElement,
        path: &str,
        diffs: &mut XmlDiff<'a, M>,
    ) {
        if self.settings.is_excluded(path) {
            trace!(path, "skipping excluded element");
            return;
        }
        let start = diffs.detail_count();
        self.compare_names(expected, actual, path, diffs);
        self.compare_attributes(expected, actual, path, diffs);
        self.compare_children(expected, actual, path, diffs);

        let produced = diffs.split_off(start);
        diffs.extend_details(
            produced
                .into_iter()
                .filter(|diff| !self.settings.is_tolerated(diff)),
        );
    }

    fn compare_names<'a>(
        &'a self,
        expected: &'a XmlElement,
        actual: &'a XmlElement,
        path: &str,
        diffs: &mut XmlDiff<'a, M>,
    ) {
        if expected.local_name() != actual.local_name() {
            diffs.add_detail(DiffDetail::different(
                XmlValue::from(expected.local_name()),
                XmlValue::from(actual.local_name()),
                ELEMENT_NAME,
                path,
                path,
            ));
        }
        if self.settings.is_namespace_relevant() && expected.namespace_uri() != actual.namespace_uri() {
            diffs.add_detail(DiffDetail::different(
                XmlValue::from(expected.namespace_uri().unwrap_or(NO_NAMESPACE)),
                XmlValue::from(actual.namespace_uri().unwrap_or(NO_NAMESPACE)),
                ELEMENT_NAMESPACE,
                path,
                path,
            ));
        }
    }

    fn compare_attributes<'a>(
        &'a self,
        expected: &'a XmlElement,
        actual: &'a XmlElement,
        path: &str,
        diffs: &mut XmlDiff<'a, M>,
    ) {
        for (name, expected_value) in expected.attributes() {
            if is_xmlns_attr(name) {
                continue;
            }
            let locator = format!("{}/@{}", path, name);
            if self.settings.is_excluded(&locator) {
                continue;
            }
            let diff = match actual.attribute(name) {
                None => DiffDetail::missing(XmlValue::from(expected_value.as_str()), ATTRIBUTE, locator),
                Some(actual_value) if actual_value != expected_value.as_str() => DiffDetail::different(
                    XmlValue::from(expected_value.as_str()),
                    XmlValue::from(actual_value),
                    ATTRIBUTE,
                    locator.clone(),
                    locator,
                ),
                Some(_) => continue,
            };
            self.add_unless_tolerated(diff, diffs);
        }

        for (name, actual_value) in actual.attributes() {
            if is_xmlns_attr(name) || expected.attribute(name).is_some() {
                continue;
            }
            let diff = DiffDetail::unexpected(
                XmlValue::from(actual_value.as_str()),
                ATTRIBUTE,
                format!("{}/@{}", path, name),
            );
            self.add_unless_tolerated(diff, diffs);
        }
    }

    fn compare_children<'a>(
        &'a self,
        expected: &'a XmlElement,
        actual: &'a XmlElement,
        path: &str,
        diffs: &mut XmlDiff<'a, M>,
    ) {
        let model = self.settings.model();
        let children1 = model.child_nodes(expected);
        let children2 = model.child_nodes(actual);
        let result = ArrayComparator::compare_with(
            &children1,
            &children2,
            model,
            path,
            |node: &Node<'a>| XmlValue::Node(*node),
        );

        for diff in result.into_diffs() {
            let expected_node = diff.expected().and_then(XmlValue::as_node);
            let actual_node = diff.actual().and_then(XmlValue::as_node);
            let kind = diff.kind().clone();
            match (&kind, expected_node, actual_node) {
                (DiffKind::Different, Some(Node::Element(e1)), Some(Node::Element(e2))) => {
                    let child_path = diff.locator_of_expected().unwrap_or(path).to_string();
                    self.compare_elements(e1, e2, &child_path, diffs);
                }
                (DiffKind::Different, Some(Node::Text(t1)), Some(Node::Text(t2))) => {
                    let text_diff = DiffDetail::different(
                        XmlValue::from(t1),
                        XmlValue::from(t2),
                        ELEMENT_TEXT,
                        strip_step(diff.locator_of_expected().unwrap_or(path), TEXT_NODE_NAME),
                        strip_step(diff.locator_of_actual().unwrap_or(path), TEXT_NODE_NAME),
                    );
                    self.add_unless_tolerated(text_diff, diffs);
                }
                (_, Some(Node::ProcessingInstruction(_)), _)
                | (_, _, Some(Node::ProcessingInstruction(_))) => {
                    let relocate = |locator: Option<&str>, node: Option<Node<'_>>| {
                        let pi = node.and_then(|n| n.as_processing_instruction());
                        locator.zip(pi).map(|(locator, pi)| {
                            format!("{}/?{}", strip_step(locator, PI_NODE_NAME), pi.target())
                        })
                    };
                    let locator_of_expected = relocate(diff.locator_of_expected(), expected_node);
                    let locator_of_actual = relocate(diff.locator_of_actual(), actual_node);
                    let pi_diff =
                        diff.relocated(PROCESSING_INSTRUCTION, locator_of_expected, locator_of_actual);
                    self.add_unless_tolerated(pi_diff, diffs);
                }
                _ => diffs.add_detail(diff),
            }
        }
    }

    fn add_unless_tolerated<'a>(&self, diff: DiffDetail<XmlValue<'a>>, diffs: &mut XmlDiff<'a, M>) {
        if !self.settings.is_tolerated(&diff) {
            diffs.add_detail(diff);
        }
    }
}

/// Removes a trailing `/<name>` or `/<name>[k]` step from `locator`.
fn strip_step<'l>(locator: &'l str, name: &str) -> &'l str {
    let Some(slash) = locator.rfind('/') else {
        return locator;
    };
    let step = &locator[slash + 1..];
    let Some(rest) = step.strip_prefix(name) else {
        return locator;
    };
    let ordinal = rest
        .strip_prefix('[')
        .and_then(|r| r.strip_suffix(']'))
        .is_some_and(|k| !k.is_empty() && k.bytes().all(|b| b.is_ascii_digit()));
    if rest.is_empty() || ordinal {
        &locator[..slash]
    } else {
        locator
    }
}
