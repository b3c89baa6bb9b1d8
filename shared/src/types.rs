//! Session and response envelope types

use serde::{Deserialize, Serialize};

/// Role of a logged-in user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Customer,
    Pharmacy,
    Rider,
    Admin,
}

/// Identity of the session invoking an engine or propagator operation
///
/// Passed explicitly into every call that acts "as" a user, so the core
/// stays testable without ambient global session state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub user_id: String,
    pub role: UserRole,
}

impl SessionContext {
    pub fn new(user_id: impl Into<String>, role: UserRole) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }
}

/// Status tag carried by every API response record
///
/// Callers branch on this tag, never on exceptions: the API boundary
/// always returns a result object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Success,
    Warning,
    Error,
}
