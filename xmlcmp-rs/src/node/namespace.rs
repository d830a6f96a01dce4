//! Namespace handling for XML elements.

use std::collections::HashMap;

use crate::constants::XML_NAMESPACE;

/// Represents an expanded XML name (namespace URI + local name).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExpandedName {
    /// The namespace URI, if the name is in a namespace.
    pub namespace_uri: Option<String>,
    /// The local part of the name (without prefix).
    pub local_name: String,
}

impl ExpandedName {
    /// Creates a new expanded name with a namespace.
    pub fn new(uri: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace_uri: Some(uri.into()),
            local_name: local.into(),
        }
    }

    /// Creates an expanded name with no namespace.
    pub fn no_namespace(local: impl Into<String>) -> Self {
        Self {
            namespace_uri: None,
            local_name: local.into(),
        }
    }
}

/// Tracks namespace bindings during parsing.
pub struct NamespaceContext {
    /// Stack of scopes, each containing prefix -> URI bindings. An empty URI
    /// undeclares the prefix (only legal for the default namespace).
    scopes: Vec<HashMap<String, String>>,
}

impl Default for NamespaceContext {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceContext {
    /// Creates a new namespace context with the `xml` prefix pre-bound.
    pub fn new() -> Self {
        let mut ctx = NamespaceContext {
            scopes: vec![HashMap::new()],
        };
        ctx.bind("xml", XML_NAMESPACE);
        ctx
    }

    /// Pushes a new scope for entering an element.
    pub fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    /// Pops the current scope when leaving an element.
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Binds a prefix to a URI in the current scope. The empty prefix binds
    /// the default namespace.
    pub fn bind(&mut self, prefix: &str, uri: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(prefix.to_string(), uri.to_string());
        }
    }

    /// Binds every `xmlns` / `xmlns:*` attribute in `attributes`.
    pub fn bind_declarations<'a, I>(&mut self, attributes: I)
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (name, value) in attributes {
            if name == "xmlns" {
                self.bind("", value);
            } else if let Some(prefix) = name.strip_prefix("xmlns:") {
                self.bind(prefix, value);
            }
        }
    }

    /// Resolves a prefix to its URI, searching from innermost scope.
    pub fn resolve(&self, prefix: &str) -> Option<&str> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(prefix))
            .filter(|uri| !uri.is_empty())
            .map(String::as_str)
    }

    /// Returns the default namespace (empty prefix binding).
    pub fn default_namespace(&self) -> Option<&str> {
        self.resolve("")
    }

    /// Expands an element qname using the bindings in scope.
    ///
    /// Unprefixed element names pick up the default namespace. An unbound
    /// prefix is reported as `None` so the caller can reject the document.
    pub fn expand_element(&self, qname: &str) -> Option<ExpandedName> {
        match split_qname(qname) {
            (Some(prefix), local) => self
                .resolve(prefix)
                .map(|uri| ExpandedName::new(uri, local)),
            (None, local) => Some(match self.default_namespace() {
                Some(uri) => ExpandedName::new(uri, local),
                None => ExpandedName::no_namespace(local),
            }),
        }
    }
}

/// Splits a qualified name into prefix and local name.
///
/// Returns (Some(prefix), local) for "prefix:local"
/// Returns (None, name) for "name" without prefix
pub fn split_qname(qname: &str) -> (Option<&str>, &str) {
    if let Some(pos) = qname.find(':') {
        (Some(&qname[..pos]), &qname[pos + 1..])
    } else {
        (None, qname)
    }
}

/// Checks if an attribute name is a namespace declaration.
pub fn is_xmlns_attr(name: &str) -> bool {
    name == "xmlns" || name.starts_with("xmlns:")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_qname() {
        assert_eq!(split_qname("svg:rect"), (Some("svg"), "rect"));
        assert_eq!(split_qname("rect"), (None, "rect"));
        assert_eq!(split_qname("ns:foo:bar"), (Some("ns"), "foo:bar"));
    }

    #[test]
    fn test_namespace_context() {
        let mut ctx = NamespaceContext::new();
        ctx.push_scope();
        ctx.bind("svg", "http://www.w3.org/2000/svg");
        assert_eq!(ctx.resolve("svg"), Some("http://www.w3.org/2000/svg"));

        ctx.pop_scope();
        assert!(ctx.resolve("svg").is_none());
    }

    #[test]
    fn test_is_xmlns() {
        assert!(is_xmlns_attr("xmlns"));
        assert!(is_xmlns_attr("xmlns:svg"));
        assert!(!is_xmlns_attr("xml:space"));
        assert!(!is_xmlns_attr("href"));
    }

    #[test]
    fn test_default_namespace_undeclared() {
        let mut ctx = NamespaceContext::new();
        ctx.push_scope();
        ctx.bind("", "http://www.w3.org/1999/xhtml");
        assert_eq!(ctx.default_namespace(), Some("http://www.w3.org/1999/xhtml"));

        ctx.push_scope();
        ctx.bind("", "");
        assert!(ctx.default_namespace().is_none());
    }

    #[test]
    fn test_expand_element() {
        let mut ctx = NamespaceContext::new();
        ctx.push_scope();
        ctx.bind_declarations([("xmlns", "urn:d"), ("xmlns:p", "urn:p"), ("id", "1")]);

        assert_eq!(ctx.expand_element("a"), Some(ExpandedName::new("urn:d", "a")));
        assert_eq!(ctx.expand_element("p:b"), Some(ExpandedName::new("urn:p", "b")));
        assert_eq!(ctx.expand_element("q:c"), None);
        assert_eq!(
            ctx.expand_element("xml:lang"),
            Some(ExpandedName::new(XML_NAMESPACE, "lang"))
        );
    }
}
