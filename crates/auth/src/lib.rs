//! `itematic-auth`: client-side authorization model.
//!
//! Pure role and branch-scope rules over the signed-in user's record. This
//! crate does no IO; the client crate feeds it session snapshots.

pub mod authorize;
pub mod capabilities;
pub mod guard;
pub mod permissions;
pub mod roles;
pub mod scope;
pub mod user;

pub use authorize::{
    AuthzError, Authorizer, access_level, authorize_action, can_access_branch, can_perform_action,
    has_all_roles, has_any_role, has_permission, has_role,
};
pub use capabilities::Capabilities;
pub use guard::{DEFAULT_LANDING, GuardContext, GuardDecision, GuardState, RequiredRoles, RouteGuard};
pub use permissions::{Action, Permission};
pub use roles::{AccessLevel, Role, RoleKind};
pub use scope::BranchRef;
pub use user::{SessionUser, UserPatch};
