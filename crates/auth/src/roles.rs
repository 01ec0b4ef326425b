use core::str::FromStr;

use serde::{Deserialize, Serialize};

use courseforge_core::DomainError;

/// Role of an account.
///
/// The set is closed: every account is exactly one of these, and the same
/// variant drives the API role gates and the client navigation. New roles are
/// a code change, not a data change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Instructor,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Instructor => "instructor",
            Role::Admin => "admin",
        }
    }

    /// Whether accounts with this role are usable immediately after
    /// registration. Instructors wait for admin approval.
    pub fn approved_on_registration(&self) -> bool {
        matches!(self, Role::Student)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "instructor" => Ok(Role::Instructor),
            "admin" => Ok(Role::Admin),
            other => Err(DomainError::validation(format!("unknown role: {other}"))),
        }
    }
}
