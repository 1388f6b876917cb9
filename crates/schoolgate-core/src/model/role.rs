use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GateError;

/// Dashboard roles. Any other `role_type` coming from the directory is invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    /// School direction.
    #[serde(rename = "DIRETORIA")]
    Diretoria,
    /// Municipal education secretariat.
    #[serde(rename = "SEC_EDUC_MUN")]
    SecEducMun,
    /// State education secretariat.
    #[serde(rename = "SEC_EDUC_EST")]
    SecEducEst,
    /// Public security secretariat.
    #[serde(rename = "SEC_SEG_PUB")]
    SecSegPub,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::Diretoria,
        Role::SecEducMun,
        Role::SecEducEst,
        Role::SecSegPub,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Diretoria => "DIRETORIA",
            Role::SecEducMun => "SEC_EDUC_MUN",
            Role::SecEducEst => "SEC_EDUC_EST",
            Role::SecSegPub => "SEC_SEG_PUB",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| GateError::RoleInvalid(s.to_string()))
    }
}
