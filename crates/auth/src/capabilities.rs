//! Role → UI capability mapping.
//!
//! Screens ask for a capability rather than a role so the mapping lives in
//! one place. Unknown or missing roles get nothing.

use serde::Serialize;

use crate::{RoleKind, SessionUser};

/// What the signed-in user may see and do in the management screens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub view_inventory: bool,
    pub manage_company: bool,
    pub manage_branches: bool,
    pub manage_users: bool,
    pub edit_items: bool,
    pub delete_items: bool,
    pub manage_categories: bool,
}

impl Capabilities {
    pub fn for_user(user: Option<&SessionUser>) -> Self {
        let kind = user.and_then(|u| u.role.as_ref()).and_then(|r| r.kind());
        match kind {
            Some(RoleKind::Admin) => Self {
                view_inventory: true,
                manage_company: true,
                manage_branches: true,
                manage_users: true,
                edit_items: true,
                delete_items: true,
                manage_categories: true,
            },
            Some(RoleKind::Manager) => Self {
                view_inventory: true,
                edit_items: true,
                manage_categories: true,
                ..Self::default()
            },
            Some(RoleKind::Employee) => Self {
                view_inventory: true,
                ..Self::default()
            },
            None => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itematic_core::{CompanyId, UserId};

    fn caps(role: &str) -> Capabilities {
        let u = SessionUser::new(UserId::new(1), CompanyId::new(1)).with_role(role);
        Capabilities::for_user(Some(&u))
    }

    #[test]
    fn admin_has_everything() {
        let c = caps("admin");
        assert!(c.manage_company && c.manage_branches && c.manage_users);
        assert!(c.edit_items && c.delete_items && c.manage_categories);
    }

    #[test]
    fn manager_edits_but_does_not_delete_or_administer() {
        let c = caps("MANAGER");
        assert!(c.edit_items && c.manage_categories && c.view_inventory);
        assert!(!c.delete_items);
        assert!(!c.manage_users && !c.manage_branches && !c.manage_company);
    }

    #[test]
    fn employee_only_views() {
        let c = caps("employee");
        assert_eq!(
            c,
            Capabilities {
                view_inventory: true,
                ..Capabilities::default()
            }
        );
    }

    #[test]
    fn nobody_gets_nothing() {
        assert_eq!(Capabilities::for_user(None), Capabilities::default());
        assert_eq!(caps("auditor"), Capabilities::default());
    }
}
