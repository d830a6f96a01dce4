//! The collected result of one comparison.

use std::fmt;

use super::diff::{quoted, DiffDetail, ValueFormat};

/// All differences found between two values, in discovery order.
///
/// The aggregate borrows the compared values and the settings that produced
/// it; the diff list is owned.
#[derive(Debug)]
pub struct AggregateDiff<'a, T: ?Sized, S, V> {
    expected: &'a T,
    actual: &'a T,
    settings: &'a S,
    details: Vec<DiffDetail<V>>,
}

impl<'a, T: ?Sized, S, V> AggregateDiff<'a, T, S, V> {
    /// Creates an empty aggregate for the given pair of values.
    pub fn new(expected: &'a T, actual: &'a T, settings: &'a S) -> Self {
        AggregateDiff {
            expected,
            actual,
            settings,
            details: Vec::new(),
        }
    }

    pub fn expected(&self) -> &'a T {
        self.expected
    }

    pub fn actual(&self) -> &'a T {
        self.actual
    }

    pub fn settings(&self) -> &'a S {
        self.settings
    }

    /// Appends a diff.
    pub fn add_detail(&mut self, detail: DiffDetail<V>) {
        self.details.push(detail);
    }

    /// Appends several diffs, keeping their order.
    pub fn extend_details(&mut self, details: impl IntoIterator<Item = DiffDetail<V>>) {
        self.details.extend(details);
    }

    /// Returns true if no differences were found.
    pub fn is_empty(&self) -> bool {
        self.details.is_empty()
    }

    pub fn detail_count(&self) -> usize {
        self.details.len()
    }

    /// Returns the diff at `index`, if any.
    pub fn detail(&self, index: usize) -> Option<&DiffDetail<V>> {
        self.details.get(index)
    }

    pub fn details(&self) -> &[DiffDetail<V>] {
        &self.details
    }

    pub fn into_details(self) -> Vec<DiffDetail<V>> {
        self.details
    }

    /// Keeps only the diffs for which `keep` returns true.
    pub fn retain(&mut self, keep: impl FnMut(&DiffDetail<V>) -> bool) {
        self.details.retain(keep);
    }

    /// Removes and returns the diffs recorded from `start` on.
    pub(crate) fn split_off(&mut self, start: usize) -> Vec<DiffDetail<V>> {
        self.details.split_off(start)
    }

    /// Renders the report with a caller supplied value format.
    pub fn render_with(&self, format: ValueFormat<'_, V>) -> String {
        if self.details.is_empty() {
            return "Aggregate diff: Empty".to_string();
        }
        let mut out = String::from("Aggregate diff:\n");
        for detail in &self.details {
            out.push_str("- ");
            out.push_str(&normalize_space(&detail.render(format)));
            out.push('\n');
        }
        out
    }
}

impl<T: ?Sized, S, V: fmt::Display> fmt::Display for AggregateDiff<'_, T, S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_with(&quoted))
    }
}

/// Collapses every whitespace run into a single space and trims the ends.
pub fn normalize_space(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
