//! Namespaced identifiers.
//!
//! An [`Iri`] is the universal key for entities and relations in the
//! knowledge graph. Equality, ordering and hashing are by the full string
//! form; the prefix/local-name split is only a naming convenience used when
//! synthesizing composite identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An opaque namespaced identifier.
///
/// The separator between prefix and local name is the last `#` or `/` in
/// the string; identifiers without a separator have an empty prefix.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Iri(String);

impl Iri {
    /// Create an identifier from its full string form.
    pub fn new(iri: impl Into<String>) -> Self {
        Iri(iri.into())
    }

    /// Join a prefix and a local name into a full identifier.
    pub fn resolve(prefix: &str, local: &str) -> Self {
        Iri(format!("{}{}", prefix, local))
    }

    /// Full string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The prefix up to and including the last `#` or `/`, or `""` if the
    /// identifier carries no separator.
    pub fn prefix(&self) -> &str {
        match self.0.rfind(['#', '/']) {
            Some(pos) => &self.0[..=pos],
            None => "",
        }
    }

    /// The local name after the last `#` or `/`, or the whole identifier.
    pub fn local_name(&self) -> &str {
        match self.0.rfind(['#', '/']) {
            Some(pos) => &self.0[pos + 1..],
            None => &self.0,
        }
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Iri {
    fn from(s: &str) -> Self {
        Iri::new(s)
    }
}

impl From<String> for Iri {
    fn from(s: String) -> Self {
        Iri::new(s)
    }
}
