//! Shared types for the pharmacy delivery platform
//!
//! Common types used across crates: data models for products, orders,
//! carts and notifications, the unified error system, and session types.

pub mod error;
pub mod models;
pub mod types;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResult, ErrorCategory, ErrorCode};
pub use types::{ResponseStatus, SessionContext, UserRole};
