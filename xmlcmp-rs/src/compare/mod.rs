//! Generic comparison core.
//!
//! A [`ComparisonModel`] tells the engine when two items are equal, when two
//! unequal items are versions of the same thing, and how to name an item's
//! position. [`ArrayComparator`] uses a model to align two sequences and
//! report the differences as [`DiffDetail`]s, which callers collect in an
//! [`AggregateDiff`] and filter with [`ComparisonSettings`].

mod aggregate;
mod array;
mod diff;
mod path;
mod plain;
mod settings;

pub use aggregate::{normalize_space, AggregateDiff};
pub use array::{ArrayComparator, ArrayComparisonResult};
pub use diff::{quoted, DiffDetail, DiffKind, ValueFormat};
pub use path::PathPattern;
pub use plain::PlainValueModel;
pub use settings::{ComparisonSettings, ToleratedDiff};

use crate::error::{Error, Result};

/// Equality, correspondence and locators for items of type `E`.
pub trait ComparisonModel<E> {
    /// Returns true if the two items are identical.
    fn equal(&self, a: &E, b: &E) -> bool;

    /// Returns true if the two items are versions of the same logical item.
    /// Only consulted for items that are not equal.
    fn correspond(&self, a: &E, b: &E) -> bool;

    /// Returns the locator fragment of `items[index]`, appended to the
    /// parent's locator.
    fn sub_path(&self, items: &[E], index: usize) -> String;
}

/// Registration of key expressions that refine correspondence.
///
/// Models without key expression support keep the default, which rejects
/// every registration.
pub trait KeyExpressionSupport {
    /// Registers `expression` as the key of elements named `element_name`.
    fn add_key_expression(&mut self, element_name: &str, expression: &str) -> Result<()> {
        let _ = expression;
        Err(Error::Configuration(format!(
            "{} does not support key expressions (element '{}')",
            std::any::type_name::<Self>(),
            element_name
        )))
    }
}
