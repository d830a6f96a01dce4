//! XML parsing and output.
//!
//! The parser builds the owned [`Document`](crate::node::Document) trees the
//! comparator works on. The printer renders elements for diff messages.

mod parser;
mod printer;

pub use parser::{parse_file, parse_str, XmlParser};
pub use printer::{print_to_string, XmlPrinter};
