//! Notification Model

use crate::types::UserRole;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Notification kind
///
/// Raised by role-side actions that affect another role's order view.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    OrderAccepted,
    OrderRejected,
    OrderCancelled,
    OrderReady,
    OrderCompleted,
    System,
}

/// Notification record in the shared notification list
///
/// Lifecycle: `unread -> read` once the target session's poll observes it.
/// Entries are never removed individually; bulk clear is the only deletion
/// path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Monotonic, creation-time-derived id
    pub id: String,
    pub target_user_id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    /// Related order, if any
    pub order_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub read: bool,
    pub sender_id: Option<String>,
    pub sender_role: Option<UserRole>,
}
