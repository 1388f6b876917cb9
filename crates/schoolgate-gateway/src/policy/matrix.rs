//! Role -> route prefix permission table.

use std::collections::{BTreeMap, HashMap};

use schoolgate_core::Role;

/// Immutable permission table, built once from validated config.
/// A role without an entry has no permissions (deny-by-default).
#[derive(Debug, Clone, Default)]
pub struct PermissionMatrix {
    rules: HashMap<Role, Vec<String>>,
}

impl PermissionMatrix {
    pub fn new(table: &BTreeMap<Role, Vec<String>>) -> Self {
        Self {
            rules: table.iter().map(|(r, p)| (*r, p.clone())).collect(),
        }
    }

    pub fn prefixes(&self, role: Role) -> &[String] {
        self.rules.get(&role).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `path` is permitted if it equals an allowed prefix or is a sub-path of one
    /// (`/dashboard` permits `/dashboard/x` but not `/dashboardx`).
    pub fn permitted(&self, role: Role, path: &str) -> bool {
        self.prefixes(role).iter().any(|prefix| {
            path == prefix
                || path
                    .strip_prefix(prefix.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }
}
