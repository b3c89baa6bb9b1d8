//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the code range:
/// - 0xxx: General errors
/// - 4xxx: Order errors
/// - 6xxx: Product / inventory errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Order errors (4xxx)
    Order,
    /// Product / inventory errors (6xxx)
    Product,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            4000..5000 => Self::Order,
            6000..7000 => Self::Product,
            _ => Self::System,
        }
    }
}

impl From<ErrorCode> for ErrorCategory {
    fn from(code: ErrorCode) -> Self {
        Self::from_code(code.value())
    }
}
