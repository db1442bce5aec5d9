//! Path Resolver
//!
//! Normalizes document sub-path arguments. An omitted path always
//! resolves to the document root.

use std::fmt;

/// Wire form of the document root
pub const ROOT_PATH: &str = ".";

/// A normalized path expression within a document
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JsonPath(String);

impl JsonPath {
    /// Normalize a path expression (surrounding whitespace is dropped,
    /// an empty expression is the root)
    pub fn new(path: &str) -> Self {
        let trimmed = path.trim();
        if trimmed.is_empty() {
            Self::root()
        } else {
            Self(trimmed.to_string())
        }
    }

    /// The document root
    pub fn root() -> Self {
        Self(ROOT_PATH.to_string())
    }

    pub fn is_root(&self) -> bool {
        self.0 == ROOT_PATH
    }

    /// Whether this is a `$` path, whose replies carry one entry per match
    pub fn is_multi(&self) -> bool {
        self.0.starts_with('$')
    }

    /// Wire string form
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JsonPath {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JsonPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for JsonPath {
    fn from(path: String) -> Self {
        Self::new(&path)
    }
}

impl AsRef<str> for JsonPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Resolve an optional path argument to its wire form
pub fn resolve(path: Option<&str>) -> JsonPath {
    path.map(JsonPath::new).unwrap_or_default()
}
