//! Unified error system
//!
//! This module provides the platform's error handling building blocks:
//! - [`ErrorCode`]: standardized numeric error codes
//! - [`ErrorCategory`]: classification of errors by domain
//! - [`AppError`]: rich error type with codes, messages, and details
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 4xxx: Order errors
//! - 6xxx: Product / inventory errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode};
//!
//! let err = AppError::with_message(ErrorCode::ValidationFailed, "Missing delivery address");
//! assert_eq!(u16::from(err.code), 2);
//! ```

mod category;
mod codes;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult};
