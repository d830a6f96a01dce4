//! Locator patterns used by tolerance rules.
//!
//! A pattern is an XPath-like path (`/list/item[2]/@no`, `//item`) that is
//! matched against the locators carried by diffs. Locators are split into
//! steps of a name and an optional ordinal, so `/list/item[1]` and
//! `/list/item` both match the pattern `/list/item[1]`.

use std::fmt;

use crate::error::{Error, Result};

/// A parsed locator pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathPattern {
    source: String,
    steps: Vec<PatternStep>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PatternStep {
    /// Preceded by `//`: any number of locator steps may be skipped.
    descendant: bool,
    name: StepName,
    ordinal: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum StepName {
    /// `*`: any step that is not an attribute.
    AnyNode,
    /// `@*`: any attribute step.
    AnyAttribute,
    Exact(String),
}

/// One step of a locator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LocatorStep<'a> {
    name: &'a str,
    ordinal: Option<usize>,
}

impl PathPattern {
    /// Parses a pattern.
    ///
    /// A leading `/` is optional; `//` introduces a descendant step. The
    /// pattern `/` matches the document locator only.
    pub fn parse(pattern: &str) -> Result<Self> {
        let invalid = |reason: &str| {
            Error::Configuration(format!("invalid path pattern '{}': {}", pattern, reason))
        };
        if pattern.is_empty() {
            return Err(invalid("empty pattern"));
        }

        let body = pattern.strip_prefix('/').unwrap_or(pattern);
        let mut steps = Vec::new();
        if !body.is_empty() {
            let mut descendant = false;
            let tokens: Vec<&str> = body.split('/').collect();
            for (i, token) in tokens.iter().enumerate() {
                if token.is_empty() {
                    // `//` yields one empty token; the first one in the body
                    // stands for a leading `//`.
                    if descendant || i + 1 == tokens.len() {
                        return Err(invalid("empty step"));
                    }
                    descendant = true;
                    continue;
                }
                let (name, ordinal) = split_predicate(token).map_err(|r| invalid(&r))?;
                let name = match name {
                    "*" => StepName::AnyNode,
                    "@*" => StepName::AnyAttribute,
                    other => StepName::Exact(other.to_string()),
                };
                steps.push(PatternStep {
                    descendant,
                    name,
                    ordinal,
                });
                descendant = false;
            }
        }

        Ok(PathPattern {
            source: pattern.to_string(),
            steps,
        })
    }

    /// Returns the pattern text as registered.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns true if `locator` is matched by this pattern.
    pub fn matches(&self, locator: &str) -> bool {
        let steps = locator_steps(locator);
        match_steps(&self.steps, &steps)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl PatternStep {
    fn matches(&self, step: &LocatorStep<'_>) -> bool {
        let name_matches = match &self.name {
            StepName::AnyNode => !step.name.starts_with('@'),
            StepName::AnyAttribute => step.name.starts_with('@'),
            StepName::Exact(name) => name == step.name,
        };
        name_matches
            && self
                .ordinal
                .is_none_or(|k| step.ordinal.unwrap_or(1) == k)
    }
}

fn match_steps(pattern: &[PatternStep], locator: &[LocatorStep<'_>]) -> bool {
    let Some((step, rest)) = pattern.split_first() else {
        return locator.is_empty();
    };
    if step.descendant {
        (0..locator.len())
            .any(|skip| step.matches(&locator[skip]) && match_steps(rest, &locator[skip + 1..]))
    } else {
        match locator.split_first() {
            Some((first, tail)) => step.matches(first) && match_steps(rest, tail),
            None => false,
        }
    }
}

/// Splits `name[k]` into its name and ordinal.
fn split_predicate(token: &str) -> std::result::Result<(&str, Option<usize>), String> {
    let Some(open) = token.find('[') else {
        if token.contains(']') {
            return Err(format!("unbalanced ']' in step '{}'", token));
        }
        return Ok((token, None));
    };
    let predicate = token[open + 1..]
        .strip_suffix(']')
        .ok_or_else(|| format!("unclosed predicate in step '{}'", token))?;
    match predicate.parse::<usize>() {
        Ok(k) if k >= 1 => Ok((&token[..open], Some(k))),
        _ => Err(format!("unsupported predicate '[{}]'", predicate)),
    }
}

/// Splits a locator into steps. Locators are produced by comparators, so
/// anything that does not look like an ordinal is kept as part of the name.
fn locator_steps(locator: &str) -> Vec<LocatorStep<'_>> {
    let body = locator.strip_prefix('/').unwrap_or(locator);
    if body.is_empty() {
        return Vec::new();
    }
    body.split('/')
        .map(|token| match split_predicate(token) {
            Ok((name, ordinal)) => LocatorStep { name, ordinal },
            Err(_) => LocatorStep {
                name: token,
                ordinal: None,
            },
        })
        .collect()
}
