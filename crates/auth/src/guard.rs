//! Route guard: decides what a protected route resolves to.

use serde::Serialize;

use crate::{Role, SessionUser, has_any_role};

/// Where unauthenticated visitors are sent by default.
pub const DEFAULT_LANDING: &str = "/";

/// The slice of session state a guard needs.
pub trait GuardState {
    fn is_loading(&self) -> bool;
    fn is_authenticated(&self) -> bool;
    fn user(&self) -> Option<&SessionUser>;
}

/// Plain [`GuardState`] value, for callers that do not hold a session snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct GuardContext<'a> {
    pub loading: bool,
    pub authenticated: bool,
    pub user: Option<&'a SessionUser>,
}

impl GuardState for GuardContext<'_> {
    fn is_loading(&self) -> bool {
        self.loading
    }

    fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    fn user(&self) -> Option<&SessionUser> {
        self.user
    }
}

/// Roles allowed through a guard (any one of them suffices).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredRoles(Vec<Role>);

impl RequiredRoles {
    pub fn roles(&self) -> &[Role] {
        &self.0
    }
}

impl From<Role> for RequiredRoles {
    fn from(role: Role) -> Self {
        Self(vec![role])
    }
}

impl From<&str> for RequiredRoles {
    fn from(role: &str) -> Self {
        Self(vec![Role::new(role)])
    }
}

impl From<Vec<Role>> for RequiredRoles {
    fn from(roles: Vec<Role>) -> Self {
        Self(roles)
    }
}

impl From<&[&str]> for RequiredRoles {
    fn from(roles: &[&str]) -> Self {
        Self(roles.iter().map(Role::new).collect())
    }
}

impl From<Vec<&str>> for RequiredRoles {
    fn from(roles: Vec<&str>) -> Self {
        RequiredRoles::from(roles.as_slice())
    }
}

impl<const N: usize> From<[&str; N]> for RequiredRoles {
    fn from(roles: [&str; N]) -> Self {
        RequiredRoles::from(&roles[..])
    }
}

/// Outcome of evaluating a guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GuardDecision {
    /// Session state is still being resolved; show a neutral indicator.
    Loading,
    /// Not signed in; navigate away (replacing the history entry).
    Redirect { to: String },
    /// Signed in without a required role; the route resolves to a denial view.
    AccessDenied,
    /// Render the guarded content.
    Render,
}

/// Guard for one protected route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGuard {
    required: Option<RequiredRoles>,
    landing: String,
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::any_authenticated()
    }
}

impl RouteGuard {
    /// Any signed-in user may pass.
    pub fn any_authenticated() -> Self {
        Self {
            required: None,
            landing: DEFAULT_LANDING.to_string(),
        }
    }

    /// Only users holding one of `roles` may pass.
    pub fn requiring(roles: impl Into<RequiredRoles>) -> Self {
        Self {
            required: Some(roles.into()),
            landing: DEFAULT_LANDING.to_string(),
        }
    }

    pub fn with_landing(mut self, landing: impl Into<String>) -> Self {
        self.landing = landing.into();
        self
    }

    pub fn required(&self) -> Option<&RequiredRoles> {
        self.required.as_ref()
    }

    /// Evaluate the guard.
    ///
    /// Loading is checked first: while the store is being read the session
    /// reports unauthenticated even for users who turn out to be signed in.
    pub fn evaluate<S: GuardState + ?Sized>(&self, state: &S) -> GuardDecision {
        if state.is_loading() {
            return GuardDecision::Loading;
        }
        if !state.is_authenticated() {
            return GuardDecision::Redirect {
                to: self.landing.clone(),
            };
        }
        if let Some(required) = &self.required {
            let names = required.roles().iter().map(|r| r.as_str());
            if !has_any_role(state.user(), names) {
                return GuardDecision::AccessDenied;
            }
        }
        GuardDecision::Render
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itematic_core::{CompanyId, UserId};

    fn user(role: &str) -> SessionUser {
        SessionUser::new(UserId::new(1), CompanyId::new(1)).with_role(role)
    }

    fn signed_in(user: &SessionUser) -> GuardContext<'_> {
        GuardContext {
            loading: false,
            authenticated: true,
            user: Some(user),
        }
    }

    #[test]
    fn loading_wins_over_everything() {
        let ctx = GuardContext {
            loading: true,
            authenticated: false,
            user: None,
        };
        assert_eq!(RouteGuard::requiring("ADMIN").evaluate(&ctx), GuardDecision::Loading);
        assert_eq!(RouteGuard::any_authenticated().evaluate(&ctx), GuardDecision::Loading);
    }

    #[test]
    fn anonymous_is_redirected_to_landing() {
        let ctx = GuardContext::default();
        assert_eq!(
            RouteGuard::any_authenticated().evaluate(&ctx),
            GuardDecision::Redirect { to: "/".to_string() }
        );
        assert_eq!(
            RouteGuard::any_authenticated().with_landing("/login").evaluate(&ctx),
            GuardDecision::Redirect { to: "/login".to_string() }
        );
    }

    #[test]
    fn wrong_role_is_denied_not_redirected() {
        let u = user("EMPLOYEE");
        assert_eq!(
            RouteGuard::requiring(["ADMIN"]).evaluate(&signed_in(&u)),
            GuardDecision::AccessDenied
        );
    }

    #[test]
    fn any_listed_role_passes_case_insensitively() {
        let u = user("manager");
        let guard = RouteGuard::requiring(vec!["admin", "Manager"]);
        assert_eq!(guard.evaluate(&signed_in(&u)), GuardDecision::Render);
    }

    #[test]
    fn no_requirement_renders_for_any_session() {
        let u = user("auditor");
        assert_eq!(RouteGuard::default().evaluate(&signed_in(&u)), GuardDecision::Render);
    }

    #[test]
    fn empty_requirement_denies() {
        let u = user("ADMIN");
        let guard = RouteGuard::requiring(Vec::<Role>::new());
        assert_eq!(guard.evaluate(&signed_in(&u)), GuardDecision::AccessDenied);
    }

    #[test]
    fn authenticated_without_user_record_is_denied_on_role_routes() {
        let ctx = GuardContext {
            loading: false,
            authenticated: true,
            user: None,
        };
        assert_eq!(RouteGuard::requiring(Role::ADMIN).evaluate(&ctx), GuardDecision::AccessDenied);
    }
}
