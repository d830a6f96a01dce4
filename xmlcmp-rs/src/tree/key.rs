//! Key expressions: per-element identity used to pair changed elements.
//!
//! A key expression is a small XPath subset evaluated against one element.
//! Two elements with the same name correspond when their keys are equal.
//!
//! Supported forms:
//!
//! | Expression       | Value                                        |
//! |------------------|----------------------------------------------|
//! | `@attr`          | value of attribute `attr`                    |
//! | `text()`         | first text child                             |
//! | `name()`         | qualified element name                       |
//! | `local-name()`   | local element name                           |
//! | `.`              | string value (all descendant text)           |
//! | `child`          | string value of the first `child` element    |
//! | `child/@attr`    | attribute of the first `child` element       |
//! | `child/text()`   | first text child of the first `child` element |
//!
//! Evaluation never fails: whatever is not found yields the empty string.

use std::fmt;

use crate::error::{Error, Result};
use crate::node::{XmlElement, XmlNode};

/// A parsed key expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyExpression {
    source: String,
    path: KeyPath,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum KeyPath {
    Select(Selector),
    Child(String, Selector),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Selector {
    Attribute(String),
    Text,
    Name,
    LocalName,
    StringValue,
}

impl KeyExpression {
    /// Parses `expression`, failing with [`Error::InvalidKeyExpression`].
    pub fn parse(expression: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidKeyExpression {
            expression: expression.to_string(),
            reason: reason.to_string(),
        };
        let trimmed = expression.trim();
        if trimmed.is_empty() {
            return Err(invalid("expression is empty"));
        }

        let path = match trimmed.split_once('/') {
            None => match parse_selector(trimmed) {
                Some(selector) => KeyPath::Select(selector),
                None if is_name(trimmed) => KeyPath::Child(trimmed.to_string(), Selector::StringValue),
                None => return Err(invalid("unsupported expression")),
            },
            Some((child, rest)) => {
                if !is_name(child) {
                    return Err(invalid("expected a child element name before '/'"));
                }
                let selector = parse_selector(rest)
                    .filter(|s| !matches!(s, Selector::Name | Selector::LocalName))
                    .ok_or_else(|| invalid("expected '@attr', 'text()' or '.' after '/'"))?;
                KeyPath::Child(child.to_string(), selector)
            }
        };

        Ok(KeyExpression {
            source: expression.to_string(),
            path,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Evaluates the expression against `element`.
    pub fn evaluate(&self, element: &XmlElement) -> String {
        match &self.path {
            KeyPath::Select(selector) => selector.evaluate(element),
            KeyPath::Child(name, selector) => element
                .first_child_element(name)
                .map(|child| selector.evaluate(child))
                .unwrap_or_default(),
        }
    }
}

impl fmt::Display for KeyExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl Selector {
    fn evaluate(&self, element: &XmlElement) -> String {
        match self {
            Selector::Attribute(name) => element.attribute(name).unwrap_or_default().to_string(),
            Selector::Text => element
                .children()
                .iter()
                .find_map(|child| match child {
                    XmlNode::Text(t) | XmlNode::CData(t) => Some(t.clone()),
                    _ => None,
                })
                .unwrap_or_default(),
            Selector::Name => element.qname().to_string(),
            Selector::LocalName => element.local_name().to_string(),
            Selector::StringValue => element.text_content(),
        }
    }
}

fn parse_selector(expression: &str) -> Option<Selector> {
    match expression {
        "." => Some(Selector::StringValue),
        "text()" => Some(Selector::Text),
        "name()" => Some(Selector::Name),
        "local-name()" => Some(Selector::LocalName),
        _ => expression
            .strip_prefix('@')
            .filter(|name| is_name(name))
            .map(|name| Selector::Attribute(name.to_string())),
    }
}

/// Checks for an XML name (optionally prefixed).
fn is_name(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || first == '_')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> XmlElement {
        XmlElement::new("ns:item")
            .with_attribute("no", "2")
            .with_text("Bob")
            .with_child(
                XmlElement::new("address")
                    .with_attribute("zip", "12345")
                    .with_text("Main Street"),
            )
    }

    fn eval(expression: &str) -> String {
        KeyExpression::parse(expression).unwrap().evaluate(&item())
    }

    #[test]
    fn test_selectors_on_element() {
        assert_eq!(eval("@no"), "2");
        assert_eq!(eval("text()"), "Bob");
        assert_eq!(eval("name()"), "ns:item");
        assert_eq!(eval("local-name()"), "item");
        assert_eq!(eval("."), "BobMain Street");
    }

    #[test]
    fn test_child_paths() {
        assert_eq!(eval("address"), "Main Street");
        assert_eq!(eval("address/@zip"), "12345");
        assert_eq!(eval("address/text()"), "Main Street");
        assert_eq!(eval(" address/. "), "Main Street");
    }

    #[test]
    fn test_missing_values_are_empty() {
        assert_eq!(eval("@missing"), "");
        assert_eq!(eval("phone"), "");
        assert_eq!(eval("phone/@type"), "");
    }

    #[test]
    fn test_invalid_expressions() {
        for expression in ["", "@", "@1x", "a/b/c", "count(x)", "/list", "a/name()", "a[1]"] {
            assert!(
                matches!(
                    KeyExpression::parse(expression),
                    Err(Error::InvalidKeyExpression { .. })
                ),
                "{expression} should be rejected"
            );
        }
    }

    #[test]
    fn test_display_keeps_source() {
        assert_eq!(KeyExpression::parse("@no").unwrap().to_string(), "@no");
    }
}
