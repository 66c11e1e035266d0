//! Strongly-typed identifiers used across the domain.
//!
//! The backend keys every resource with an integer. Identifiers accept either a
//! JSON number or a numeric string on the way in (older persisted records and
//! form fields carry strings) and always serialize as numbers.

use core::str::FromStr;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::DomainError;

/// Identifier of a company (the tenant boundary).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CompanyId(i64);

/// Identifier of a branch within a company.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct BranchId(i64);

/// Identifier of a user account.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct UserId(i64);

/// Identifier of an inventory item.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ItemId(i64);

/// Identifier of an item category.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CategoryId(i64);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Int(i64),
    Str(String),
}

macro_rules! impl_numeric_id {
    ($t:ty, $name:literal) => {
        impl $t {
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            pub const fn get(&self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i64> for $t {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$t> for i64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = s
                    .trim()
                    .parse::<i64>()
                    .map_err(|e| DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                Ok(Self(value))
            }
        }

        impl<'de> Deserialize<'de> for $t {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                match RawId::deserialize(deserializer)? {
                    RawId::Int(value) => Ok(Self(value)),
                    RawId::Str(s) => s.parse().map_err(serde::de::Error::custom),
                }
            }
        }
    };
}

impl_numeric_id!(CompanyId, "CompanyId");
impl_numeric_id!(BranchId, "BranchId");
impl_numeric_id!(UserId, "UserId");
impl_numeric_id!(ItemId, "ItemId");
impl_numeric_id!(CategoryId, "CategoryId");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_trimmed_numeric_strings() {
        assert_eq!(" 42 ".parse::<BranchId>().unwrap(), BranchId::new(42));
    }

    #[test]
    fn rejects_non_numeric_strings() {
        let err = "north".parse::<BranchId>().unwrap_err();
        assert!(matches!(err, DomainError::InvalidId(_)));
        assert!(err.to_string().contains("BranchId"));
    }

    #[test]
    fn deserializes_numbers_and_numeric_strings() {
        let a: UserId = serde_json::from_str("7").unwrap();
        let b: UserId = serde_json::from_str("\"7\"").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn deserialize_rejects_other_shapes() {
        assert!(serde_json::from_str::<CompanyId>("\"nine\"").is_err());
        assert!(serde_json::from_str::<CompanyId>("true").is_err());
        assert!(serde_json::from_str::<CompanyId>("{}").is_err());
    }

    #[test]
    fn serializes_as_plain_number() {
        assert_eq!(serde_json::to_string(&ItemId::new(3)).unwrap(), "3");
    }
}
