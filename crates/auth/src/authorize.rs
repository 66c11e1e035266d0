//! Client-side authorization predicates.
//!
//! Every function here is pure and total: an absent user, a user without a
//! role, an unknown role or an unparseable branch all resolve to the most
//! restrictive answer. Nothing here panics or errors.

use thiserror::Error;

use crate::{AccessLevel, Action, BranchRef, Permission, RoleKind, SessionUser};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("not authenticated")]
    Unauthenticated,

    #[error("insufficient role for '{0}'")]
    InsufficientRole(Action),

    #[error("branch access denied: {0}")]
    BranchAccessDenied(BranchRef),
}

/// `true` iff the user holds `role` (case-insensitive).
pub fn has_role(user: Option<&SessionUser>, role: &str) -> bool {
    user.and_then(|u| u.role.as_ref())
        .is_some_and(|held| held.matches(role))
}

/// `true` iff the user holds at least one of `roles`.
pub fn has_any_role<I, S>(user: Option<&SessionUser>, roles: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    roles.into_iter().any(|r| has_role(user, r.as_ref()))
}

/// `true` iff the user holds every one of `roles`.
///
/// A user carries a single role, so only a one-entry list (or repeats of the
/// same role) can pass. An empty list is denied rather than vacuously true.
pub fn has_all_roles<I, S>(user: Option<&SessionUser>, roles: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut any = false;
    for role in roles {
        if !has_role(user, role.as_ref()) {
            return false;
        }
        any = true;
    }
    any
}

/// Branch-scope check.
///
/// Unscoped users (no `branch_id`) reach every branch of their company;
/// scoped users only their own.
pub fn can_access_branch(user: Option<&SessionUser>, branch: impl Into<BranchRef>) -> bool {
    let Some(user) = user else {
        return false;
    };
    match user.branch_id {
        None => true,
        Some(own) => branch.into().id() == Some(own),
    }
}

/// Ordinal ranking of the user's role.
pub fn access_level(user: Option<&SessionUser>) -> AccessLevel {
    user.and_then(|u| u.role.as_ref())
        .map(|r| r.access_level())
        .unwrap_or(AccessLevel::None)
}

/// Authorize a coarse action, reporting why it was refused.
///
/// - ADMIN: always allowed.
/// - MANAGER: allowed without a branch; with one, only inside their scope.
/// - EMPLOYEE: with a branch, only inside their scope; without, read-only.
/// - anything else: refused.
pub fn authorize_action(
    user: Option<&SessionUser>,
    action: Action,
    branch: Option<BranchRef>,
) -> Result<(), AuthzError> {
    let Some(u) = user else {
        return Err(AuthzError::Unauthenticated);
    };

    let kind = u.role.as_ref().and_then(|r| r.kind());
    match (kind, branch) {
        (Some(RoleKind::Admin), _) => Ok(()),
        (Some(RoleKind::Manager), None) => Ok(()),
        (Some(RoleKind::Manager | RoleKind::Employee), Some(branch)) => {
            if can_access_branch(user, branch) {
                Ok(())
            } else {
                Err(AuthzError::BranchAccessDenied(branch))
            }
        }
        (Some(RoleKind::Employee), None) if action == Action::Read => Ok(()),
        _ => Err(AuthzError::InsufficientRole(action)),
    }
}

/// Boolean form of [`authorize_action`].
pub fn can_perform_action(user: Option<&SessionUser>, action: Action, branch: Option<BranchRef>) -> bool {
    authorize_action(user, action, branch).is_ok()
}

/// Fine-grained check against `user.permissions`.
///
/// `permission` is `resource:action[:branch]`. The user must hold the
/// `resource:action` grant; a branch segment additionally requires branch
/// access.
pub fn has_permission(user: Option<&SessionUser>, permission: &str) -> bool {
    let Some(u) = user else {
        return false;
    };
    let permission = Permission::new(permission.to_string());
    let Some(grant) = permission.grant() else {
        return false;
    };
    if !u.permissions.iter().any(|p| *p == grant) {
        return false;
    }
    match permission.branch() {
        Some(branch) => can_access_branch(user, branch),
        None => true,
    }
}

/// Authorization queries bound to one (possibly absent) user.
///
/// This is what screens hold on to: built from the current session snapshot
/// and dropped when the snapshot changes.
#[derive(Debug, Clone, Copy)]
pub struct Authorizer<'a> {
    user: Option<&'a SessionUser>,
}

impl<'a> Authorizer<'a> {
    pub fn new(user: Option<&'a SessionUser>) -> Self {
        Self { user }
    }

    pub fn user(&self) -> Option<&'a SessionUser> {
        self.user
    }

    pub fn has_role(&self, role: &str) -> bool {
        let result = has_role(self.user, role);
        tracing::debug!(
            role,
            user_role = self.user.and_then(|u| u.role.as_ref()).map(|r| r.as_str()),
            result,
            "role check"
        );
        result
    }

    pub fn has_any_role<I, S>(&self, roles: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        has_any_role(self.user, roles)
    }

    pub fn has_all_roles<I, S>(&self, roles: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        has_all_roles(self.user, roles)
    }

    pub fn can_access_branch(&self, branch: impl Into<BranchRef>) -> bool {
        can_access_branch(self.user, branch)
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        has_permission(self.user, permission)
    }

    pub fn access_level(&self) -> AccessLevel {
        access_level(self.user)
    }

    pub fn can_perform_action(&self, action: Action, branch: Option<BranchRef>) -> bool {
        can_perform_action(self.user, action, branch)
    }

    pub fn authorize_action(&self, action: Action, branch: Option<BranchRef>) -> Result<(), AuthzError> {
        let outcome = authorize_action(self.user, action, branch);
        if let Err(err) = &outcome {
            tracing::debug!(%action, error = %err, "action refused");
        }
        outcome
    }
}
