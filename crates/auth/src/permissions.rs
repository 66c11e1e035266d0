use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use itematic_core::DomainError;

use crate::BranchRef;

/// Coarse action a user may attempt on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for Action {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "create" => Ok(Action::Create),
            "read" => Ok(Action::Read),
            "update" => Ok(Action::Update),
            "delete" => Ok(Action::Delete),
            other => Err(DomainError::validation(format!("unknown action '{other}'"))),
        }
    }
}

/// Permission identifier in `resource:action[:branch]` form.
///
/// The first two segments name the grant a user must hold (e.g.
/// `"items:update"`); an optional third segment scopes the check to a branch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `resource:action` grant, or `None` when either segment is missing.
    pub fn grant(&self) -> Option<String> {
        let mut parts = self.as_str().split(':');
        let resource = parts.next().filter(|s| !s.is_empty())?;
        let action = parts.next().filter(|s| !s.is_empty())?;
        Some(format!("{resource}:{action}"))
    }

    /// The branch segment, if one was given.
    pub fn branch(&self) -> Option<BranchRef> {
        self.as_str()
            .split(':')
            .nth(2)
            .filter(|s| !s.is_empty())
            .map(BranchRef::from)
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itematic_core::BranchId;

    #[test]
    fn action_parses_case_insensitively() {
        assert_eq!("READ".parse::<Action>().unwrap(), Action::Read);
        assert!("archive".parse::<Action>().is_err());
    }

    #[test]
    fn permission_segments() {
        let p = Permission::new("items:update:7");
        assert_eq!(p.grant().as_deref(), Some("items:update"));
        assert_eq!(p.branch(), Some(BranchRef::Id(BranchId::new(7))));

        let p = Permission::new("items:read");
        assert_eq!(p.grant().as_deref(), Some("items:read"));
        assert_eq!(p.branch(), None);
    }

    #[test]
    fn incomplete_permission_has_no_grant() {
        assert_eq!(Permission::new("items").grant(), None);
        assert_eq!(Permission::new("items:").grant(), None);
        assert_eq!(Permission::new("").grant(), None);
    }
}
