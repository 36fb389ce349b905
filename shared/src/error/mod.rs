//! Coded error system shared by the whole backend
//!
//! Every failure is an [`AppError`] wrapping a stable u16 [`ErrorCode`].
//! The leading digit of the code picks its [`ErrorCategory`] (0xxx general,
//! 1xxx auth, 2xxx permission, 3xxx employee, 4xxx timesheet, 5xxx leave,
//! 6xxx customer/project/allocation, 7xxx document, 8xxx notification,
//! 9xxx system), and each code maps to one HTTP status. On the wire a
//! failure serializes as an [`ErrorResponse`].
//!
//! ```
//! use shared::error::{AppError, ErrorCode};
//!
//! let err = AppError::validation("hours must be a multiple of 0.5")
//!     .with_detail("field", "hours_worked");
//! assert_eq!(err.code, ErrorCode::ValidationFailed);
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult, ErrorResponse};
