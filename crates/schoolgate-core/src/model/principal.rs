use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{Entitlement, Role};

/// Subject returned by the identity provider for a valid session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Raw row from the role/entitlement lookup (`get_user_role_info`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    pub role_type: String,
    #[serde(default)]
    pub allowed_schemas: Option<Vec<String>>,
}

/// Row from the user-to-tenant mapping table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantMapping {
    pub schema_name: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// Authenticated user with a resolved role and entitlement.
/// Immutable for the lifetime of one request; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: String,
    pub email: String,
    pub role: Role,
    pub entitlement: Entitlement,
}

impl Principal {
    /// Combine an identity with its directory record.
    /// Fails with `RoleInvalid` when `role_type` is outside the enumerated set.
    pub fn from_record(identity: Identity, record: RoleRecord) -> Result<Self> {
        let role = record.role_type.parse::<Role>()?;
        let entitlement = Entitlement::from_raw(record.allowed_schemas.unwrap_or_default());
        Ok(Self {
            id: identity.user_id,
            email: identity.email.unwrap_or_default(),
            role,
            entitlement,
        })
    }
}
