use std::fmt;

use xmltree::Element;

/// Qualified XML name: a namespace URI plus a local part.
///
/// Used for fault code values and for identifying detail payload entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    pub namespace_uri: String,
    pub local_name: String,
}

impl QName {
    pub fn new(namespace_uri: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            namespace_uri: namespace_uri.into(),
            local_name: local_name.into(),
        }
    }

    /// Qualified name of an element as parsed by `xmltree`.
    ///
    /// Elements with no namespace yield an empty namespace URI.
    pub fn of_element(element: &Element) -> Self {
        Self {
            namespace_uri: element.namespace.clone().unwrap_or_default(),
            local_name: element.name.clone(),
        }
    }
}

impl fmt::Display for QName {
    /// Clark notation, `{namespace}local`, matching how qualified names are
    /// usually rendered in logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace_uri.is_empty() {
            write!(f, "{}", self.local_name)
        } else {
            write!(f, "{{{}}}{}", self.namespace_uri, self.local_name)
        }
    }
}
