//! Application error type

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Result alias for fallible operations inside the engine
pub type AppResult<T> = Result<T, AppError>;

/// Application error with structured error code and details
///
/// The primary error type for the platform, providing:
/// - Standardized error codes via [`ErrorCode`]
/// - Human-readable messages safe to display directly
/// - Optional structured details (per-item failure lists, context, etc.)
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct AppError {
    /// The error code identifying the type of error
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details (per-item errors, context, etc.)
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Create a new error with the default message for the error code
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            details: None,
        }
    }

    /// Create a new error with a custom message
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Add a detail entry to this error
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Attach a list of per-item failure messages under the `errors` detail key
    pub fn with_errors(self, errors: Vec<String>) -> Self {
        self.with_detail("errors", Value::from(errors))
    }

    /// Per-item failure messages, falling back to the top-level message
    pub fn error_list(&self) -> Vec<String> {
        self.details
            .as_ref()
            .and_then(|d| d.get("errors"))
            .and_then(|v| v.as_array())
            .map(|a| {
                a.iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_else(|| vec![self.message.clone()])
    }

    // ==================== Convenience constructors ====================

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    /// Create a product not found error
    pub fn product_not_found(product_id: impl Into<String>) -> Self {
        let id = product_id.into();
        Self::with_message(ErrorCode::ProductNotFound, format!("Product {} not found", id))
            .with_detail("product_id", id)
    }

    /// Create an insufficient stock error
    pub fn insufficient_stock(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InsufficientStock, msg)
    }

    /// Create an invalid quantity error
    pub fn invalid_quantity(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InvalidQuantity, msg)
    }

    /// Create an order not found error
    pub fn order_not_found(order_id: impl Into<String>) -> Self {
        let id = order_id.into();
        Self::with_message(ErrorCode::OrderNotFound, format!("Order {} not found", id))
            .with_detail("order_id", id)
    }

    /// Create an already-terminal error (cancel on a cancelled/delivered order)
    pub fn already_terminal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::OrderAlreadyTerminal, msg)
    }

    /// Create a storage write failure error
    pub fn storage_write(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::StorageWriteFailure, msg)
    }

    /// Create a compensation failure error carrying both the original and
    /// compensation failure messages
    pub fn compensation_failed(original: impl Into<String>, compensation: impl Into<String>) -> Self {
        Self::new(ErrorCode::CompensationFailed)
            .with_detail("original_error", original.into())
            .with_detail("compensation_error", compensation.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, msg)
    }
}
