//! Role names known to the platform.
//!
//! Roles are a closed set referenced by accounts, never owned by them.

use serde::{Deserialize, Serialize};

/// Role granted to an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoleName {
    /// Platform administrator.
    Admin,
    /// Fleet operator (carrier).
    Carrier,
    /// Vehicle driver.
    Driver,
}

impl RoleName {
    /// Canonical wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Carrier => "CARRIER",
            Self::Driver => "DRIVER",
        }
    }

    /// Parses a role name, tolerating the gateway's `ROLE_` prefix and case.
    pub fn parse(value: &str) -> Option<Self> {
        let name = value.trim().to_ascii_uppercase();
        let name = name.strip_prefix("ROLE_").unwrap_or(&name);
        match name {
            "ADMIN" => Some(Self::Admin),
            "CARRIER" => Some(Self::Carrier),
            "DRIVER" => Some(Self::Driver),
            _ => None,
        }
    }
}

impl std::fmt::Display for RoleName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
