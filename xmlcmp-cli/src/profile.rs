//! Comparison profiles: TOML files holding reusable comparison settings.
//!
//! ```toml
//! [relevance]
//! encoding = true
//! comments = true
//!
//! [keys]
//! item = "@no"
//!
//! [[tolerate]]
//! kind = "moved"
//! path = "//item"
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::{bail, Context};
use serde::Deserialize;
use tracing::debug;
use xmlcmp::{DiffKind, XmlComparisonSettings};

/// Settings read from a profile file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    #[serde(default)]
    pub relevance: RelevanceSection,

    /// Key expressions by element name.
    #[serde(default)]
    pub keys: BTreeMap<String, String>,

    #[serde(default)]
    pub tolerate: Vec<ToleranceRule>,
}

/// Relevance switches. Switches left out keep their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelevanceSection {
    pub encoding: Option<bool>,
    pub namespace: Option<bool>,
    pub whitespace: Option<bool>,
    pub comments: Option<bool>,
    pub cdata: Option<bool>,
    pub processing_instructions: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToleranceKind {
    Different,
    Missing,
    Unexpected,
    Moved,
    /// Every kind; excludes the subtree at the path.
    Any,
}

/// One tolerance rule, from a profile or from `--tolerate KIND:PATH`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToleranceRule {
    pub kind: ToleranceKind,
    pub path: Option<String>,
}

impl Profile {
    /// Parses a profile from TOML content.
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let profile: Profile = toml::from_str(content)?;
        Ok(profile)
    }

    /// Reads and parses a profile file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read profile {}", path.display()))?;
        let profile = Self::parse(&content)
            .with_context(|| format!("invalid profile {}", path.display()))?;
        debug!(
            path = %path.display(),
            keys = profile.keys.len(),
            rules = profile.tolerate.len(),
            "loaded profile"
        );
        Ok(profile)
    }

    /// Applies the profile on top of `settings`.
    pub fn apply(&self, settings: &mut XmlComparisonSettings) -> anyhow::Result<()> {
        let relevance = &self.relevance;
        if let Some(relevant) = relevance.encoding {
            settings.set_encoding_relevant(relevant);
        }
        if let Some(relevant) = relevance.namespace {
            settings.set_namespace_relevant(relevant);
        }
        if let Some(relevant) = relevance.whitespace {
            settings.set_whitespace_relevant(relevant);
        }
        if let Some(relevant) = relevance.comments {
            settings.set_comment_relevant(relevant);
        }
        if let Some(relevant) = relevance.cdata {
            settings.set_cdata_relevant(relevant);
        }
        if let Some(relevant) = relevance.processing_instructions {
            settings.set_processing_instruction_relevant(relevant);
        }

        for (element, expression) in &self.keys {
            settings.add_key_expression(element, expression)?;
        }
        for rule in &self.tolerate {
            rule.apply(settings)?;
        }
        Ok(())
    }
}

impl ToleranceRule {
    pub fn apply(&self, settings: &mut XmlComparisonSettings) -> anyhow::Result<()> {
        let path = self.path.as_deref();
        let kind = match self.kind {
            ToleranceKind::Any => {
                let Some(path) = path else {
                    bail!("tolerating any diff needs a path");
                };
                settings.tolerate_any_diff_at(path)?;
                return Ok(());
            }
            ToleranceKind::Different => DiffKind::Different,
            ToleranceKind::Missing => DiffKind::Missing,
            ToleranceKind::Unexpected => DiffKind::Unexpected,
            ToleranceKind::Moved => DiffKind::Moved,
        };
        settings.tolerate_generic_diff(kind, path)?;
        Ok(())
    }
}

impl FromStr for ToleranceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "different" => Ok(ToleranceKind::Different),
            "missing" => Ok(ToleranceKind::Missing),
            "unexpected" => Ok(ToleranceKind::Unexpected),
            "moved" => Ok(ToleranceKind::Moved),
            "any" => Ok(ToleranceKind::Any),
            other => bail!(
                "unknown diff kind '{}' (expected different, missing, unexpected, moved or any)",
                other
            ),
        }
    }
}

/// Parses `KIND` or `KIND:PATH`.
impl FromStr for ToleranceRule {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let (kind, path) = match s.split_once(':') {
            Some((kind, path)) => (kind, Some(path.to_string())),
            None => (s, None),
        };
        Ok(ToleranceRule {
            kind: kind.parse()?,
            path,
        })
    }
}

impl fmt::Display for ToleranceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(path) = &self.path {
            write!(f, ":{}", path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILE: &str = r#"
[relevance]
encoding = true
cdata = false

[keys]
item = "@no"

[[tolerate]]
kind = "moved"
path = "//item"

[[tolerate]]
kind = "any"
path = "/list/meta"
"#;

    #[test]
    fn test_parse_profile() {
        let profile = Profile::parse(PROFILE).unwrap();
        assert_eq!(profile.relevance.encoding, Some(true));
        assert_eq!(profile.relevance.namespace, None);
        assert_eq!(profile.keys.get("item").map(String::as_str), Some("@no"));
        assert_eq!(
            profile.tolerate[0],
            ToleranceRule {
                kind: ToleranceKind::Moved,
                path: Some("//item".to_string()),
            }
        );
    }

    #[test]
    fn test_apply_profile() {
        let mut settings = XmlComparisonSettings::default();
        Profile::parse(PROFILE).unwrap().apply(&mut settings).unwrap();

        assert!(settings.is_encoding_relevant());
        assert!(!settings.is_cdata_relevant());
        assert!(!settings.is_comment_relevant());
        assert!(settings.model().key_expression("item").is_some());
        assert_eq!(settings.tolerated_diffs().len(), 2);
        assert!(settings.is_excluded("/list/meta"));
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        assert!(Profile::parse("[relevance]\ncolour = true\n").is_err());
        assert!(Profile::parse("[[tolerate]]\nkind = \"renamed\"\n").is_err());
    }

    #[test]
    fn test_invalid_key_expression_fails_on_apply() {
        let profile = Profile::parse("[keys]\nitem = \"count(@no)\"\n").unwrap();
        let mut settings = XmlComparisonSettings::default();
        assert!(profile.apply(&mut settings).is_err());
    }

    #[test]
    fn test_tolerance_rule_from_str() {
        let rule: ToleranceRule = "different://item/@no".parse().unwrap();
        assert_eq!(rule.kind, ToleranceKind::Different);
        assert_eq!(rule.path.as_deref(), Some("//item/@no"));
        assert_eq!(rule.to_string(), "Different://item/@no");

        let rule: ToleranceRule = "MOVED".parse().unwrap();
        assert_eq!(rule.kind, ToleranceKind::Moved);
        assert!(rule.path.is_none());

        assert!("renamed:/a".parse::<ToleranceRule>().is_err());
    }

    #[test]
    fn test_any_without_path_is_rejected() {
        let rule: ToleranceRule = "any".parse().unwrap();
        let mut settings = XmlComparisonSettings::default();
        assert!(rule.apply(&mut settings).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.toml");
        fs::write(&path, PROFILE).unwrap();
        assert_eq!(Profile::load(&path).unwrap().tolerate.len(), 2);
        assert!(Profile::load(&dir.path().join("absent.toml")).is_err());
    }
}
