//! Branch references as they arrive from callers (route params, form values,
//! JSON payloads) and their coercion to a [`BranchId`].

use itematic_core::BranchId;
use serde_json::Value;

/// A requested branch, after numeric coercion.
///
/// Inputs that cannot be read as an integer become `Invalid`, which never
/// equals any branch. Coercion itself cannot fail.
///
/// Strings are parsed strictly: after trimming, the whole string must be an
/// integer, so `"5abc"` is `Invalid` rather than branch 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchRef {
    Id(BranchId),
    Invalid,
}

impl BranchRef {
    pub fn id(&self) -> Option<BranchId> {
        match self {
            BranchRef::Id(id) => Some(*id),
            BranchRef::Invalid => None,
        }
    }
}

impl core::fmt::Display for BranchRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BranchRef::Id(id) => core::fmt::Display::fmt(id, f),
            BranchRef::Invalid => f.write_str("<invalid branch>"),
        }
    }
}

impl From<BranchId> for BranchRef {
    fn from(id: BranchId) -> Self {
        BranchRef::Id(id)
    }
}

impl From<i64> for BranchRef {
    fn from(value: i64) -> Self {
        BranchRef::Id(BranchId::new(value))
    }
}

impl From<i32> for BranchRef {
    fn from(value: i32) -> Self {
        BranchRef::from(i64::from(value))
    }
}

impl From<u32> for BranchRef {
    fn from(value: u32) -> Self {
        BranchRef::from(i64::from(value))
    }
}

impl From<&str> for BranchRef {
    fn from(value: &str) -> Self {
        value.parse::<BranchId>().map(BranchRef::Id).unwrap_or(BranchRef::Invalid)
    }
}

impl From<&String> for BranchRef {
    fn from(value: &String) -> Self {
        BranchRef::from(value.as_str())
    }
}

impl From<String> for BranchRef {
    fn from(value: String) -> Self {
        BranchRef::from(value.as_str())
    }
}

impl From<&Value> for BranchRef {
    fn from(value: &Value) -> Self {
        match value {
            Value::Number(n) => n.as_i64().map(BranchRef::from).unwrap_or(BranchRef::Invalid),
            Value::String(s) => BranchRef::from(s.as_str()),
            _ => BranchRef::Invalid,
        }
    }
}
