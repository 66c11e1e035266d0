//! The authenticated user record carried by a session.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use itematic_core::{BranchId, CompanyId, UserId};

use crate::Role;

// ─────────────────────────────────────────────────────────────────────────────
// Session User
// ─────────────────────────────────────────────────────────────────────────────

/// Profile of the signed-in user, as returned by `GET /auth/me` and as
/// persisted by the session store.
///
/// # Invariants
/// - `role` is uppercase whenever present.
/// - A missing or non-string role deserializes to `None` and never matches a
///   role check.
/// - `branch_id` absent means company-wide scope. A present but malformed
///   branch id fails deserialization of the whole record; it is never read as
///   "unscoped".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: UserId,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub username: String,

    #[serde(
        default,
        deserialize_with = "crate::roles::lenient_role",
        skip_serializing_if = "Option::is_none"
    )]
    pub role: Option<Role>,

    pub company_id: CompanyId,

    #[serde(default)]
    pub branch_id: Option<BranchId>,

    /// Fine-grained grants in `resource:action` form.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<String>,

    /// Backend fields this client does not interpret, kept so a persisted
    /// record round-trips unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SessionUser {
    pub fn new(id: UserId, company_id: CompanyId) -> Self {
        Self {
            id,
            name: String::new(),
            username: String::new(),
            role: None,
            company_id,
            branch_id: None,
            permissions: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Set the role. A blank name leaves the user without one.
    pub fn with_role(mut self, role: impl AsRef<str>) -> Self {
        self.role = Role::parse(role);
        self
    }

    pub fn with_branch(mut self, branch_id: BranchId) -> Self {
        self.branch_id = Some(branch_id);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>, username: impl Into<String>) -> Self {
        self.name = name.into();
        self.username = username.into();
        self
    }

    /// `true` when the user is not tied to a single branch.
    pub fn is_unscoped(&self) -> bool {
        self.branch_id.is_none()
    }

    /// Re-apply role normalization (records built by hand may bypass `Role::new`).
    pub fn normalized(mut self) -> Self {
        self.role = self.role.take().and_then(|role| Role::parse(role.as_str()));
        self
    }

    /// Merge a patch into this record. Fields absent from the patch are kept.
    pub fn apply(&mut self, patch: UserPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(username) = patch.username {
            self.username = username;
        }
        if let Some(role) = patch.role.and_then(|role| Role::parse(role.as_str())) {
            self.role = Some(role);
        }
        if let Some(company_id) = patch.company_id {
            self.company_id = company_id;
        }
        if let Some(branch_id) = patch.branch_id {
            self.branch_id = branch_id;
        }
        if let Some(permissions) = patch.permissions {
            self.permissions = permissions;
        }
        self.extra.extend(patch.extra);
    }
}

/// Partial update to a [`SessionUser`].
///
/// `branch_id` is tri-state: `None` leaves the scope alone, `Some(None)`
/// lifts it to company-wide, `Some(Some(id))` moves the user to a branch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub username: Option<String>,
    pub role: Option<Role>,
    pub company_id: Option<CompanyId>,
    pub branch_id: Option<Option<BranchId>>,
    pub permissions: Option<Vec<String>>,
    pub extra: Map<String, Value>,
}

impl UserPatch {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Blank names are ignored; the current role is kept.
    pub fn role(mut self, role: impl AsRef<str>) -> Self {
        self.role = Role::parse(role);
        self
    }

    pub fn branch(mut self, branch_id: Option<BranchId>) -> Self {
        self.branch_id = Some(branch_id);
        self
    }
}

/// A full record replaces every field it carries (including the scope).
impl From<SessionUser> for UserPatch {
    fn from(user: SessionUser) -> Self {
        Self {
            name: Some(user.name),
            username: Some(user.username),
            role: user.role,
            company_id: Some(user.company_id),
            branch_id: Some(user.branch_id),
            permissions: Some(user.permissions),
            extra: user.extra,
        }
    }
}
