//! Diff records and their factory functions.
//!
//! A [`DiffDetail`] describes one discrepancy between an expected and an
//! actual value. Formatting of the values is not part of the record: a value
//! formatter is handed to [`DiffDetail::render`] when a message is built, so
//! two diffs compare equal regardless of how they would be displayed.

use std::fmt;

/// The kind of a difference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DiffKind {
    /// Both sides exist but differ.
    Different,
    /// Present in the expected value only.
    Missing,
    /// Present in the actual value only.
    Unexpected,
    /// Present on both sides at different positions.
    Moved,
    /// Any kind outside the built-in four.
    Other(String),
}

impl fmt::Display for DiffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffKind::Different => f.write_str("DIFFERENT"),
            DiffKind::Missing => f.write_str("MISSING"),
            DiffKind::Unexpected => f.write_str("UNEXPECTED"),
            DiffKind::Moved => f.write_str("MOVED"),
            DiffKind::Other(name) => f.write_str(name),
        }
    }
}

/// Renders one optional diff value as text.
pub type ValueFormat<'f, V> = &'f dyn Fn(Option<&V>) -> String;

/// Default value format: the value's `Display` output in single quotes.
pub fn quoted<V: fmt::Display>(value: Option<&V>) -> String {
    match value {
        Some(v) => format!("'{}'", v),
        None => "none".to_string(),
    }
}

/// One difference between an expected and an actual value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiffDetail<V> {
    expected: Option<V>,
    actual: Option<V>,
    object_classifier: String,
    kind: DiffKind,
    locator_of_expected: Option<String>,
    locator_of_actual: Option<String>,
}

impl<V> DiffDetail<V> {
    /// A value that exists in the expected data only.
    pub fn missing(value: V, classifier: &str, locator: impl Into<String>) -> Self {
        Self::generic(
            Some(value),
            None,
            classifier,
            DiffKind::Missing,
            Some(locator.into()),
            None,
        )
    }

    /// A value that exists in the actual data only.
    pub fn unexpected(value: V, classifier: &str, locator: impl Into<String>) -> Self {
        Self::generic(
            None,
            Some(value),
            classifier,
            DiffKind::Unexpected,
            None,
            Some(locator.into()),
        )
    }

    /// A value found on both sides at different positions.
    pub fn moved(
        value: V,
        classifier: &str,
        locator_from: impl Into<String>,
        locator_to: impl Into<String>,
    ) -> Self
    where
        V: Clone,
    {
        Self::generic(
            Some(value.clone()),
            Some(value),
            classifier,
            DiffKind::Moved,
            Some(locator_from.into()),
            Some(locator_to.into()),
        )
    }

    /// Two versions of the same item that differ.
    pub fn different(
        expected: V,
        actual: V,
        classifier: &str,
        locator_of_expected: impl Into<String>,
        locator_of_actual: impl Into<String>,
    ) -> Self {
        Self::generic(
            Some(expected),
            Some(actual),
            classifier,
            DiffKind::Different,
            Some(locator_of_expected.into()),
            Some(locator_of_actual.into()),
        )
    }

    /// A diff of any kind, including kinds outside the built-in four.
    pub fn generic(
        expected: Option<V>,
        actual: Option<V>,
        classifier: &str,
        kind: DiffKind,
        locator_of_expected: Option<String>,
        locator_of_actual: Option<String>,
    ) -> Self {
        DiffDetail {
            expected,
            actual,
            object_classifier: classifier.to_string(),
            kind,
            locator_of_expected,
            locator_of_actual,
        }
    }

    pub fn expected(&self) -> Option<&V> {
        self.expected.as_ref()
    }

    pub fn actual(&self) -> Option<&V> {
        self.actual.as_ref()
    }

    pub fn object_classifier(&self) -> &str {
        &self.object_classifier
    }

    pub fn kind(&self) -> &DiffKind {
        &self.kind
    }

    pub fn locator_of_expected(&self) -> Option<&str> {
        self.locator_of_expected.as_deref()
    }

    pub fn locator_of_actual(&self) -> Option<&str> {
        self.locator_of_actual.as_deref()
    }

    /// Iterates over the locators that are present.
    pub fn locators(&self) -> impl Iterator<Item = &str> {
        self.locator_of_expected()
            .into_iter()
            .chain(self.locator_of_actual())
    }

    /// Converts the values, keeping kind, classifier and locators.
    pub fn map_values<W>(self, mut f: impl FnMut(V) -> W) -> DiffDetail<W> {
        DiffDetail {
            expected: self.expected.map(&mut f),
            actual: self.actual.map(&mut f),
            object_classifier: self.object_classifier,
            kind: self.kind,
            locator_of_expected: self.locator_of_expected,
            locator_of_actual: self.locator_of_actual,
        }
    }

    /// Returns the same diff under a new classifier and new locators.
    pub fn relocated(
        self,
        classifier: &str,
        locator_of_expected: Option<String>,
        locator_of_actual: Option<String>,
    ) -> Self {
        DiffDetail {
            object_classifier: classifier.to_string(),
            locator_of_expected,
            locator_of_actual,
            ..self
        }
    }

    /// Renders the diff as an English sentence using `format` for values.
    pub fn render(&self, format: ValueFormat<'_, V>) -> String {
        let cls = &self.object_classifier;
        let expected = format(self.expected.as_ref());
        let actual = format(self.actual.as_ref());
        let loc1 = self.locator_of_expected.as_deref().unwrap_or("-");
        let loc2 = self.locator_of_actual.as_deref().unwrap_or("-");
        match self.kind {
            DiffKind::Different => {
                let mut text = format!("Different {}: expected {} but found {}", cls, expected, actual);
                if let Some(loc) = &self.locator_of_actual {
                    text.push_str(" at ");
                    text.push_str(loc);
                }
                text
            }
            DiffKind::Missing => format!("Missing {} {} at {}", cls, expected, loc1),
            DiffKind::Unexpected => format!("Unexpected {} {} found at {}", cls, actual, loc2),
            DiffKind::Moved => format!("Moved {} {} from {} to {}", cls, expected, loc1, loc2),
            DiffKind::Other(ref kind) => format!(
                "{} {}, expected {}, found {} {} {}",
                kind, cls, expected, actual, loc1, loc2
            ),
        }
    }
}

impl<V: fmt::Display> fmt::Display for DiffDetail<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(&quoted))
    }
}
