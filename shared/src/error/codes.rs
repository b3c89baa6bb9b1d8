//! Unified error codes for the pharmacy delivery platform
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 4xxx: Order errors
//! - 6xxx: Product / inventory errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Invalid request
    InvalidRequest = 5,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order is already in a terminal status (cancelled or delivered)
    OrderAlreadyTerminal = 4002,

    // ==================== 6xxx: Product / Inventory ====================
    /// Product not found
    ProductNotFound = 6001,
    /// Requested quantity exceeds available stock
    InsufficientStock = 6002,
    /// Requested quantity is zero or negative
    InvalidQuantity = 6003,

    // ==================== 9xxx: System ====================
    /// Internal error
    InternalError = 9001,
    /// Record store write failed mid-sequence
    StorageWriteFailure = 9002,
    /// Compensation of partial stock changes failed
    CompensationFailed = 9003,
}

impl ErrorCode {
    /// Default human-readable message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Unknown => "Unknown error",
            Self::ValidationFailed => "Validation failed",
            Self::NotFound => "Resource not found",
            Self::InvalidRequest => "Invalid request",
            Self::OrderNotFound => "Order not found",
            Self::OrderAlreadyTerminal => "Order is already in a terminal status",
            Self::ProductNotFound => "Product not found",
            Self::InsufficientStock => "Insufficient stock",
            Self::InvalidQuantity => "Invalid quantity",
            Self::InternalError => "Internal error",
            Self::StorageWriteFailure => "Record store write failed",
            Self::CompensationFailed => "Stock compensation failed",
        }
    }

    /// Numeric code value
    pub const fn value(&self) -> u16 {
        *self as u16
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", *self as u16)
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code as u16
    }
}

/// Error returned when a u16 does not map to a known [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Success),
            1 => Ok(Self::Unknown),
            2 => Ok(Self::ValidationFailed),
            3 => Ok(Self::NotFound),
            5 => Ok(Self::InvalidRequest),
            4001 => Ok(Self::OrderNotFound),
            4002 => Ok(Self::OrderAlreadyTerminal),
            6001 => Ok(Self::ProductNotFound),
            6002 => Ok(Self::InsufficientStock),
            6003 => Ok(Self::InvalidQuantity),
            9001 => Ok(Self::InternalError),
            9002 => Ok(Self::StorageWriteFailure),
            9003 => Ok(Self::CompensationFailed),
            _ => Err(InvalidErrorCode(value)),
        }
    }
}
