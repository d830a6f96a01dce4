//! xmlcmp - structural comparison with tolerance rules
//!
//! This library compares two ordered sequences, or two XML documents, and
//! reports every difference as a [`DiffDetail`]: a value that is missing,
//! unexpected, moved to another position, or changed in place.
//!
//! # Overview
//!
//! The core is [`ArrayComparator`], which aligns two sequences in four
//! passes: identical elements in place, identical elements elsewhere,
//! corresponding elements in place and corresponding elements elsewhere.
//! Whatever is left is missing or unexpected. What "identical" and
//! "corresponding" mean is up to a [`ComparisonModel`].
//!
//! [`XmlComparator`] builds on it to compare documents recursively,
//! pairing changed children through the model and descending into them so
//! that a difference is reported at the deepest locator that explains it.
//!
//! # Tolerance
//!
//! [`ComparisonSettings`] holds rules that silence expected differences,
//! selected by diff kind and an XPath-like locator pattern such as
//! `//item/@no`. A rule without a kind excludes a whole subtree.
//!
//! # Key expressions
//!
//! With [`DefaultXmlModel`] two elements of the same name correspond when a
//! per-name key expression such as `@id` or `text()` evaluates equal for
//! both, which lets reordered records be reported as moves instead of as
//! pairs of missing and unexpected elements.

pub mod compare;
pub mod constants;
pub mod error;
pub mod node;
pub mod tree;
pub mod xml;

// Re-export commonly used types
pub use compare::{
    AggregateDiff, ArrayComparator, ArrayComparisonResult, ComparisonModel, ComparisonSettings,
    DiffDetail, DiffKind, KeyExpressionSupport, PathPattern, PlainValueModel, ToleratedDiff,
};
pub use error::{Error, Result};
pub use node::{Document, Node, XmlElement, XmlNode, XmlProcessingInstruction};
pub use tree::{
    DefaultXmlModel, KeyExpression, NameBasedXmlModel, Relevance, XmlComparator,
    XmlComparisonModel, XmlComparisonSettings, XmlDiff, XmlValue,
};
pub use xml::{parse_file, parse_str, print_to_string, XmlParser, XmlPrinter};
