//! Comparison model for plain values such as strings or numbers.

use std::fmt;

use super::{ComparisonModel, KeyExpressionSupport};

/// Compares values with `PartialEq` and locates them as `[index]`.
///
/// Correspondence defaults to equality, which means changed values are
/// reported as one missing and one unexpected value. A custom correspondence
/// (same first character, same id field) turns such pairs into a single
/// `Different` diff.
pub struct PlainValueModel<E> {
    correspond: fn(&E, &E) -> bool,
}

fn equal_values<E: PartialEq>(a: &E, b: &E) -> bool {
    a == b
}

impl<E: PartialEq> PlainValueModel<E> {
    pub fn new() -> Self {
        PlainValueModel {
            correspond: equal_values::<E>,
        }
    }

    /// Creates a model whose correspondence is `correspond`.
    pub fn with_correspondence(correspond: fn(&E, &E) -> bool) -> Self {
        PlainValueModel { correspond }
    }
}

impl<E: PartialEq> Default for PlainValueModel<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for PlainValueModel<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for PlainValueModel<E> {}

impl<E> fmt::Debug for PlainValueModel<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlainValueModel").finish_non_exhaustive()
    }
}

impl<E: PartialEq> ComparisonModel<E> for PlainValueModel<E> {
    fn equal(&self, a: &E, b: &E) -> bool {
        a == b
    }

    fn correspond(&self, a: &E, b: &E) -> bool {
        (self.correspond)(a, b)
    }

    fn sub_path(&self, _items: &[E], index: usize) -> String {
        format!("[{}]", index)
    }
}

impl<E> KeyExpressionSupport for PlainValueModel<E> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_correspondence_is_equality() {
        let model = PlainValueModel::new();
        assert!(model.correspond(&"a", &"a"));
        assert!(!model.correspond(&"a", &"b"));
    }

    #[test]
    fn test_custom_correspondence() {
        let model = PlainValueModel::<&str>::with_correspondence(|a, b| {
            a.chars().next() == b.chars().next()
        });
        assert!(model.correspond(&"D", &"D2"));
        assert!(!model.equal(&"D", &"D2"));
    }

    #[test]
    fn test_locators_are_zero_based() {
        let model = PlainValueModel::<i32>::new();
        assert_eq!(model.sub_path(&[1, 2, 3], 0), "[0]");
        assert_eq!(model.sub_path(&[1, 2, 3], 2), "[2]");
    }
}
