//! Data models
//!
//! Shared between the server and API consumers.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY).

pub mod customer;
pub mod document;
pub mod employee;
pub mod leave;
pub mod project;
pub mod resource_allocation;
pub mod session;
pub mod status;
pub mod timesheet;
pub mod user;

// Re-exports
pub use customer::*;
pub use document::*;
pub use employee::*;
pub use leave::*;
pub use project::*;
pub use resource_allocation::*;
pub use session::*;
pub use status::*;
pub use timesheet::*;
pub use user::*;
