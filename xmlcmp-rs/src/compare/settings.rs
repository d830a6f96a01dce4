//! Comparison settings: the model in use plus tolerance rules.

use tracing::debug;

use super::diff::{DiffDetail, DiffKind};
use super::path::PathPattern;
use super::KeyExpressionSupport;
use crate::error::{Error, Result};

/// A rule that suppresses matching diffs.
///
/// A rule without a kind matches diffs of every kind; a rule without a
/// pattern matches every locator. At least one of the two is present.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ToleratedDiff {
    kind: Option<DiffKind>,
    pattern: Option<PathPattern>,
}

impl ToleratedDiff {
    /// Creates a rule, parsing `locator` as a [`PathPattern`].
    pub fn new(kind: Option<DiffKind>, locator: Option<&str>) -> Result<Self> {
        if kind.is_none() && locator.is_none() {
            return Err(Error::Configuration(
                "a tolerated diff needs a kind, a locator or both".to_string(),
            ));
        }
        let pattern = locator.map(PathPattern::parse).transpose()?;
        Ok(ToleratedDiff { kind, pattern })
    }

    pub fn kind(&self) -> Option<&DiffKind> {
        self.kind.as_ref()
    }

    pub fn pattern(&self) -> Option<&PathPattern> {
        self.pattern.as_ref()
    }

    /// Returns true if this rule suppresses `diff`.
    pub fn matches<V>(&self, diff: &DiffDetail<V>) -> bool {
        if self.kind.as_ref().is_some_and(|kind| kind != diff.kind()) {
            return false;
        }
        match &self.pattern {
            None => true,
            Some(pattern) => diff.locators().any(|locator| pattern.matches(locator)),
        }
    }
}

/// The comparison model plus the registry of tolerated diffs.
///
/// Settings are filled before a comparison and only read during one.
#[derive(Debug, Clone, Default)]
pub struct ComparisonSettings<M> {
    model: M,
    tolerated: Vec<ToleratedDiff>,
}

impl<M> ComparisonSettings<M> {
    pub fn new(model: M) -> Self {
        ComparisonSettings {
            model,
            tolerated: Vec::new(),
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// Registers a key expression with the model.
    pub fn add_key_expression(&mut self, element_name: &str, expression: &str) -> Result<&mut Self>
    where
        M: KeyExpressionSupport,
    {
        self.model.add_key_expression(element_name, expression)?;
        Ok(self)
    }

    /// Tolerates different values at `locator`.
    pub fn tolerate_different_at(&mut self, locator: &str) -> Result<&mut Self> {
        self.tolerate(Some(DiffKind::Different), Some(locator))
    }

    /// Tolerates missing values at `locator`.
    pub fn tolerate_missing_at(&mut self, locator: &str) -> Result<&mut Self> {
        self.tolerate(Some(DiffKind::Missing), Some(locator))
    }

    /// Tolerates unexpected values at `locator`.
    pub fn tolerate_unexpected_at(&mut self, locator: &str) -> Result<&mut Self> {
        self.tolerate(Some(DiffKind::Unexpected), Some(locator))
    }

    /// Tolerates moves from or to `locator`.
    pub fn tolerate_moved_at(&mut self, locator: &str) -> Result<&mut Self> {
        self.tolerate(Some(DiffKind::Moved), Some(locator))
    }

    /// Tolerates every diff at `locator`. Comparators skip excluded paths
    /// entirely, see [`is_excluded`](Self::is_excluded).
    pub fn tolerate_any_diff_at(&mut self, locator: &str) -> Result<&mut Self> {
        self.tolerate(None, Some(locator))
    }

    /// Tolerates a diff kind, optionally restricted to `locator`.
    pub fn tolerate_generic_diff(
        &mut self,
        kind: DiffKind,
        locator: Option<&str>,
    ) -> Result<&mut Self> {
        self.tolerate(Some(kind), locator)
    }

    fn tolerate(&mut self, kind: Option<DiffKind>, locator: Option<&str>) -> Result<&mut Self> {
        let rule = ToleratedDiff::new(kind, locator)?;
        debug!(kind = ?rule.kind, pattern = ?locator, "tolerating diffs");
        self.tolerated.push(rule);
        Ok(self)
    }

    pub fn tolerated_diffs(&self) -> &[ToleratedDiff] {
        &self.tolerated
    }

    /// Returns true if some rule suppresses `diff`.
    pub fn is_tolerated<V>(&self, diff: &DiffDetail<V>) -> bool {
        self.tolerated.iter().any(|rule| rule.matches(diff))
    }

    /// Returns true if an any-kind rule covers `path`.
    pub fn is_excluded(&self, path: &str) -> bool {
        self.tolerated.iter().any(|rule| {
            rule.kind.is_none()
                && rule
                    .pattern
                    .as_ref()
                    .is_some_and(|pattern| pattern.matches(path))
        })
    }
}
