//! Cross-session notification propagation
//!
//! Sessions share one persistent notification list through the record
//! store; there is no push channel. Each session polls the list on a fixed
//! interval and raises UI-facing events (toast, sound cue, badge counts)
//! through a single injected [`Notifier`] capability.
//!
//! Per-notification state machine: `unread -> read` (terminal for the
//! normal flow), or `-> cleared` via the bulk clear operation. A
//! notification is never un-read and never removed individually.

mod propagator;

pub use propagator::Propagator;

use crate::store::{RecordStore, StoreExt, NOTIFICATIONS};
use chrono::Utc;
use shared::error::AppResult;
use shared::models::{Notification, NotificationKind};
use shared::types::UserRole;
use std::sync::atomic::{AtomicU64, Ordering};

/// UI-facing event sink
///
/// The core calls this unconditionally; the surrounding app wires a
/// concrete implementation (DOM toasts, desktop notifications, ...).
pub trait Notifier: Send + Sync {
    /// One toast per newly observed notification
    fn toast(&self, notification: &Notification);
    /// Audible cue accompanying a toast
    fn sound_cue(&self);
    /// Unread notification count, captured before marking read
    fn unread_badge(&self, count: usize);
    /// Cart item count for the current user
    fn cart_badge(&self, count: i64);
}

/// [`Notifier`] that logs every event through `tracing`
///
/// Default sink for headless runs and demos.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn toast(&self, notification: &Notification) {
        tracing::info!(
            id = %notification.id,
            kind = ?notification.kind,
            title = %notification.title,
            message = %notification.message,
            "Notification"
        );
    }

    fn sound_cue(&self) {
        tracing::debug!("Notification sound cue");
    }

    fn unread_badge(&self, count: usize) {
        tracing::debug!(count, "Unread badge");
    }

    fn cart_badge(&self, count: i64) {
        tracing::debug!(count, "Cart badge");
    }
}

/// Payload for appending one notification to the shared list
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub target_user_id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub order_id: Option<String>,
    pub sender_id: Option<String>,
    pub sender_role: Option<UserRole>,
}

/// Process-wide tiebreaker so ids stay monotonic within one millisecond
static NOTIFICATION_SEQ: AtomicU64 = AtomicU64::new(0);

fn next_notification_id() -> String {
    let seq = NOTIFICATION_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("ntf-{}-{:04}", Utc::now().timestamp_millis(), seq)
}

/// Append one notification to the shared list
///
/// Always appends; entries are never merged with earlier ones, even when
/// type and target match (last-write log semantics).
pub fn create_notification(
    store: &dyn RecordStore,
    input: NewNotification,
) -> AppResult<Notification> {
    let notification = Notification {
        id: next_notification_id(),
        target_user_id: input.target_user_id,
        kind: input.kind,
        title: input.title,
        message: input.message,
        order_id: input.order_id,
        created_at: Utc::now(),
        read: false,
        sender_id: input.sender_id,
        sender_role: input.sender_role,
    };

    let mut notifications: Vec<Notification> = store.load(NOTIFICATIONS)?;
    notifications.push(notification.clone());
    store.save(NOTIFICATIONS, &notifications)?;

    tracing::debug!(
        id = %notification.id,
        target = %notification.target_user_id,
        kind = ?notification.kind,
        "Notification appended"
    );
    Ok(notification)
}

/// Unread notification count for one user
pub fn unread_count(store: &dyn RecordStore, user_id: &str) -> AppResult<usize> {
    let notifications: Vec<Notification> = store.load(NOTIFICATIONS)?;
    Ok(notifications
        .iter()
        .filter(|n| n.target_user_id == user_id && !n.read)
        .count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn create_test_input(target: &str) -> NewNotification {
        NewNotification {
            target_user_id: target.to_string(),
            kind: NotificationKind::OrderReady,
            title: "Order ready".to_string(),
            message: "Your order is ready for pickup".to_string(),
            order_id: Some("ord-1".to_string()),
            sender_id: Some("ph-1".to_string()),
            sender_role: Some(UserRole::Pharmacy),
        }
    }

    #[test]
    fn test_create_appends_unread() {
        let store = MemoryStore::new();
        let n = create_notification(&store, create_test_input("u1")).unwrap();
        assert!(!n.read);
        assert_eq!(unread_count(&store, "u1").unwrap(), 1);
        assert_eq!(unread_count(&store, "u2").unwrap(), 0);
    }

    #[test]
    fn test_duplicates_are_not_merged() {
        let store = MemoryStore::new();
        create_notification(&store, create_test_input("u1")).unwrap();
        create_notification(&store, create_test_input("u1")).unwrap();
        let all: Vec<Notification> = store.load(NOTIFICATIONS).unwrap();
        assert_eq!(all.len(), 2);
        assert_ne!(all[0].id, all[1].id);
    }

    #[test]
    fn test_ids_are_monotonic() {
        let a = next_notification_id();
        let b = next_notification_id();
        assert!(b > a, "{} should sort after {}", b, a);
    }
}
