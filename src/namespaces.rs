//! XML namespace handling
//!
//! Qualified names, namespace prefix maps and code-space maps. Every schema
//! family carries its own read-only prefix map; element builders resolve the
//! prefixes the schema mandates for each sub-element.

use indexmap::IndexMap;

use crate::error::{Error, Result};

/// Mapping from namespace prefix (e.g. `ns`, `gml`, `brocom`) to URI
pub type NamespaceMap = IndexMap<String, String>;

/// Mapping from attribute name to the controlled-vocabulary URN required on
/// that element's `codeSpace` attribute
pub type CodeSpaceMap = IndexMap<String, String>;

/// Qualified name: optional prefix plus local name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    /// Namespace prefix (None for unprefixed elements)
    pub prefix: Option<String>,
    /// Local name
    pub local: String,
}

impl QName {
    /// Create a QName without a prefix
    pub fn local(local: impl Into<String>) -> Self {
        Self {
            prefix: None,
            local: local.into(),
        }
    }

    /// Create a QName with a prefix
    pub fn prefixed(prefix: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            local: local.into(),
        }
    }

    /// Render the name as it appears in the serialized document
    pub fn qualified(&self) -> String {
        match &self.prefix {
            Some(p) => format!("{}:{}", p, self.local),
            None => self.local.clone(),
        }
    }
}

/// Split a serialized tag into prefix and local part
///
/// Tag matching in the delete transform goes through this instead of
/// substring checks on the full tag, so a future prefix rename cannot change
/// which elements are selected.
pub fn split_qualified(tag: &str) -> (Option<&str>, &str) {
    match tag.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, tag),
    }
}

/// Look up a prefix in a namespace map
pub fn resolve_prefix<'a>(nsmap: &'a NamespaceMap, prefix: &str) -> Result<&'a str> {
    nsmap
        .get(prefix)
        .map(|s| s.as_str())
        .ok_or_else(|| Error::UnknownNamespacePrefix(prefix.to_string()))
}

/// Build a prefixed QName, checking the prefix against the active map
pub fn qname(nsmap: &NamespaceMap, prefix: &str, local: &str) -> Result<QName> {
    resolve_prefix(nsmap, prefix)?;
    Ok(QName::prefixed(prefix, local))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_rendering() {
        assert_eq!(QName::local("sourceDocument").qualified(), "sourceDocument");
        assert_eq!(QName::prefixed("ns2", "location").qualified(), "ns2:location");
    }

    #[test]
    fn test_split_qualified() {
        assert_eq!(split_qualified("brocom:broId"), (Some("brocom"), "broId"));
        assert_eq!(split_qualified("registrationRequest"), (None, "registrationRequest"));
    }

    #[test]
    fn test_resolve_prefix() {
        let mut nsmap = NamespaceMap::new();
        nsmap.insert("gml".to_string(), "http://www.opengis.net/gml/3.2".to_string());

        assert_eq!(
            resolve_prefix(&nsmap, "gml").unwrap(),
            "http://www.opengis.net/gml/3.2"
        );
        assert!(matches!(
            resolve_prefix(&nsmap, "ns9"),
            Err(Error::UnknownNamespacePrefix(_))
        ));
    }

    #[test]
    fn test_qname_checks_prefix() {
        let mut nsmap = NamespaceMap::new();
        nsmap.insert("ns".to_string(), "http://www.broservices.nl/xsd/isgmw/1.1".to_string());

        let q = qname(&nsmap, "ns", "deliveredLocation").unwrap();
        assert_eq!(q.qualified(), "ns:deliveredLocation");
        assert!(qname(&nsmap, "missing", "x").is_err());
    }
}
