use std::borrow::Cow;

use serde::{Deserialize, Deserializer, Serialize};

/// Role identifier used for RBAC.
///
/// Roles stay opaque strings at this layer: any name can be carried and
/// compared, but only the three known roles ever grant anything. The name is
/// normalized to uppercase on construction, so a `Role` is always safe to
/// compare and persist.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub const ADMIN: Role = Role(Cow::Borrowed("ADMIN"));
    pub const MANAGER: Role = Role(Cow::Borrowed("MANAGER"));
    pub const EMPLOYEE: Role = Role(Cow::Borrowed("EMPLOYEE"));

    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Cow::Owned(name.as_ref().to_uppercase()))
    }

    /// Like [`Role::new`], but a blank name is no role at all.
    pub fn parse(name: impl AsRef<str>) -> Option<Self> {
        let name = name.as_ref().trim();
        (!name.is_empty()).then(|| Self::new(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against a raw role name. A blank role
    /// matches nothing, not even a blank name.
    pub fn matches(&self, name: &str) -> bool {
        !self.0.trim().is_empty() && self.as_str() == name.trim().to_uppercase()
    }

    /// The known role this name denotes, if any.
    pub fn kind(&self) -> Option<RoleKind> {
        match self.as_str() {
            "ADMIN" => Some(RoleKind::Admin),
            "MANAGER" => Some(RoleKind::Manager),
            "EMPLOYEE" => Some(RoleKind::Employee),
            _ => None,
        }
    }

    pub fn access_level(&self) -> AccessLevel {
        self.kind().map(RoleKind::access_level).unwrap_or(AccessLevel::None)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<RoleKind> for Role {
    fn from(kind: RoleKind) -> Self {
        match kind {
            RoleKind::Admin => Role::ADMIN,
            RoleKind::Manager => Role::MANAGER,
            RoleKind::Employee => Role::EMPLOYEE,
        }
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(Role::new(name))
    }
}

/// The closed set of roles the application assigns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleKind {
    Admin,
    Manager,
    Employee,
}

impl RoleKind {
    pub fn access_level(self) -> AccessLevel {
        match self {
            RoleKind::Admin => AccessLevel::Admin,
            RoleKind::Manager => AccessLevel::Manager,
            RoleKind::Employee => AccessLevel::Employee,
        }
    }
}

/// Ordinal ranking of a user's role (0 = no access, 3 = admin).
///
/// Informational; no gate in this crate compares levels directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[repr(u8)]
pub enum AccessLevel {
    None = 0,
    Employee = 1,
    Manager = 2,
    Admin = 3,
}

impl AccessLevel {
    pub fn value(self) -> u8 {
        self as u8
    }
}

/// Deserialize an optional role without ever failing.
///
/// Only a non-empty JSON string yields a role. Missing, null, empty or
/// non-string values all become `None`, which matches no role check.
pub fn lenient_role<'de, D>(deserializer: D) -> Result<Option<Role>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::String(name)) => Role::parse(name),
        _ => None,
    })
}
