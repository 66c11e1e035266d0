//! Typed clients for the backend's resources.
//!
//! Each service wraps a shared [`ApiClient`](crate::api::ApiClient); the
//! bearer token comes from whatever token source that client carries.

pub mod branches;
pub mod categories;
pub mod company;
pub mod health;
pub mod items;
pub mod users;

pub use branches::BranchService;
pub use categories::CategoryService;
pub use company::CompanyService;
pub use health::HealthService;
pub use items::ItemService;
pub use users::UserService;
