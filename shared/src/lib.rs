//! Shared types for the HRMS backend
//!
//! Common types used across the workspace: the coded error system,
//! data models with their Create/Update payloads, and small utilities
//! shared by the server and its tests.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResult, ErrorCategory, ErrorCode, ErrorResponse};
pub use models::ApprovalStatus;
