//! Constants used throughout xmlcmp.
//!
//! Object classifiers label the kind of thing a diff refers to and appear in
//! rendered diff messages. Synthetic node names are used when building
//! locators for non-element children.

/// Classifier for diffs produced by sequence alignment.
pub const LIST_ELEMENT: &str = "list element";

/// Classifier for attribute diffs.
pub const ATTRIBUTE: &str = "attribute";

/// Classifier for text content diffs.
pub const ELEMENT_TEXT: &str = "element text";

/// Classifier for element name diffs.
pub const ELEMENT_NAME: &str = "element name";

/// Classifier for element namespace diffs.
pub const ELEMENT_NAMESPACE: &str = "element namespace";

/// Classifier for processing instruction diffs.
pub const PROCESSING_INSTRUCTION: &str = "processing instruction";

/// Classifier for the document encoding diff.
pub const DOCUMENT_ENCODING: &str = "document encoding";

/// Node name of text children.
pub const TEXT_NODE_NAME: &str = "#text";

/// Node name of CDATA children.
pub const CDATA_NODE_NAME: &str = "#cdata-section";

/// Node name of comment children.
pub const COMMENT_NODE_NAME: &str = "#comment";

/// Node name of processing instruction children in locators. Replaced by
/// `?<target>` before a diff is reported.
pub const PI_NODE_NAME: &str = "procint";

/// Rendering of an absent namespace URI.
pub const NO_NAMESPACE: &str = "none";

/// Locator of document level diffs.
pub const DOCUMENT_LOCATOR: &str = "/";

/// The namespace bound to the `xml` prefix.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";
