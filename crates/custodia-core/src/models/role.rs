//! User role within a tenant.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CustodiaError;

/// Role of a user within its tenant.
///
/// Roles form a strict hierarchy — OWNER covers ADMIN, ADMIN covers
/// MEMBER. Unknown role strings are rejected here, at the model
/// boundary, rather than at each call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Owner,
    Admin,
    Member,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "OWNER",
            Role::Admin => "ADMIN",
            Role::Member => "MEMBER",
        }
    }

    /// Position in the hierarchy; higher covers lower.
    const fn rank(&self) -> u8 {
        match self {
            Role::Owner => 2,
            Role::Admin => 1,
            Role::Member => 0,
        }
    }

    /// Whether this role grants at least the permissions of `required`.
    pub fn is_at_least(&self, required: Role) -> bool {
        self.rank() >= required.rank()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CustodiaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OWNER" => Ok(Role::Owner),
            "ADMIN" => Ok(Role::Admin),
            "MEMBER" => Ok(Role::Member),
            other => Err(CustodiaError::Validation {
                message: format!("unknown role: {other}"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_through_strings() {
        for role in [Role::Owner, Role::Admin, Role::Member] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!("SUPERUSER".parse::<Role>().is_err());
        // Case matters: roles are stored upper-case.
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn owner_covers_admin_covers_member() {
        assert!(Role::Owner.is_at_least(Role::Admin));
        assert!(Role::Owner.is_at_least(Role::Member));
        assert!(Role::Admin.is_at_least(Role::Member));
        assert!(!Role::Admin.is_at_least(Role::Owner));
        assert!(!Role::Member.is_at_least(Role::Admin));
    }

    #[test]
    fn serde_uses_uppercase_strings() {
        let json = serde_json::to_string(&Role::Owner).unwrap();
        assert_eq!(json, "\"OWNER\"");
        let back: Role = serde_json::from_str("\"MEMBER\"").unwrap();
        assert_eq!(back, Role::Member);
    }
}
