use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GateError, Result};

/// Maximum identifier length accepted by the backing database.
const MAX_SCHEMA_NAME_LEN: usize = 63;

/// Tenant schema identifier (e.g. `escola_00000001`).
///
/// Only `[a-z0-9_]` is accepted and the first character may not be a digit,
/// so a `SchemaName` can be placed in a query filter without escaping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SchemaName(String);

impl SchemaName {
    pub fn parse(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        let valid = !raw.is_empty()
            && raw.len() <= MAX_SCHEMA_NAME_LEN
            && !raw.starts_with(|c: char| c.is_ascii_digit())
            && raw
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_');
        if !valid {
            return Err(GateError::BadRequest(format!("invalid schema name: {raw:?}")));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SchemaName {
    type Error = GateError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<SchemaName> for String {
    fn from(value: SchemaName) -> Self {
        value.0
    }
}

impl fmt::Display for SchemaName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The set of tenant schemas a principal may read.
///
/// Empty is a valid, fully authorized state: the principal sees nothing.
/// Entries are trusted from the role directory and never checked against the
/// global set of known tenants; an unknown schema simply matches no rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Entitlement(BTreeSet<SchemaName>);

impl Entitlement {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from directory-provided identifiers.
    ///
    /// Identifiers that are not valid schema names are dropped with a warning.
    pub fn from_raw<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = BTreeSet::new();
        for s in raw {
            match SchemaName::parse(s) {
                Ok(name) => {
                    set.insert(name);
                }
                Err(e) => tracing::warn!(error = %e, "dropping schema from entitlement"),
            }
        }
        Self(set)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, schema: &str) -> bool {
        self.0.iter().any(|s| s.as_str() == schema)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SchemaName> {
        self.0.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(SchemaName::as_str).collect()
    }
}

impl FromIterator<SchemaName> for Entitlement {
    fn from_iter<T: IntoIterator<Item = SchemaName>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
