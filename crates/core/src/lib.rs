//! `itematic-core`: shared domain primitives.
//!
//! Identifiers and the domain error model used by the auth and client crates.
//! No IO lives here.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{BranchId, CategoryId, CompanyId, ItemId, UserId};
