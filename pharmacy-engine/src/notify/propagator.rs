//! Poll-driven notification propagator
//!
//! One propagator per session. Two independent recurring checks run on
//! fixed intervals: the notification poll (default 2000 ms) and the
//! cart-badge poll (default 1000 ms). The intervals are not synchronized
//! with each other or with engine operations; a change in another session
//! becomes visible here eventually, within one interval.

use super::Notifier;
use crate::store::{RecordStore, StoreExt, CARTS, NOTIFICATIONS};
use shared::error::AppResult;
use shared::models::{CartEntry, Notification};
use shared::types::SessionContext;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Cross-session notification propagator for one session
pub struct Propagator<N: Notifier> {
    store: Arc<dyn RecordStore>,
    ctx: SessionContext,
    notifier: N,
}

impl<N: Notifier> Propagator<N> {
    pub fn new(store: Arc<dyn RecordStore>, ctx: SessionContext, notifier: N) -> Self {
        Self {
            store,
            ctx,
            notifier,
        }
    }

    /// One notification poll cycle
    ///
    /// Reads the full shared list, raises toast + sound for every unread
    /// notification targeted at this session's user, then marks those
    /// entries read and writes the list back. The unread badge is raised
    /// with the count captured before marking. Returns the number of
    /// notifications observed this cycle.
    pub fn poll_once(&self) -> AppResult<usize> {
        let mut notifications: Vec<Notification> = self.store.load(NOTIFICATIONS)?;

        let mut observed = 0usize;
        for notification in notifications
            .iter_mut()
            .filter(|n| n.target_user_id == self.ctx.user_id && !n.read)
        {
            self.notifier.toast(notification);
            self.notifier.sound_cue();
            notification.read = true;
            observed += 1;
        }

        // Skip the write-back when nothing changed so an idle session does
        // not stomp concurrent appends from other sessions.
        if observed > 0 {
            self.store.save(NOTIFICATIONS, &notifications)?;
        }
        self.notifier.unread_badge(observed);
        Ok(observed)
    }

    /// Mark every notification belonging to this user read
    ///
    /// Used when the user opens the notification center. Returns the
    /// number of entries flipped.
    pub fn mark_all_read(&self) -> AppResult<usize> {
        let mut notifications: Vec<Notification> = self.store.load(NOTIFICATIONS)?;
        let mut changed = 0usize;
        for notification in notifications
            .iter_mut()
            .filter(|n| n.target_user_id == self.ctx.user_id && !n.read)
        {
            notification.read = true;
            changed += 1;
        }
        if changed > 0 {
            self.store.save(NOTIFICATIONS, &notifications)?;
        }
        self.notifier.unread_badge(0);
        Ok(changed)
    }

    /// Remove every notification belonging to this user
    ///
    /// The only deletion path for notification records.
    pub fn clear_all(&self) -> AppResult<usize> {
        let mut notifications: Vec<Notification> = self.store.load(NOTIFICATIONS)?;
        let before = notifications.len();
        notifications.retain(|n| n.target_user_id != self.ctx.user_id);
        let removed = before - notifications.len();
        if removed > 0 {
            self.store.save(NOTIFICATIONS, &notifications)?;
        }
        self.notifier.unread_badge(0);
        Ok(removed)
    }

    /// One cart-badge cycle: derive this user's cart item count
    ///
    /// Entirely decoupled from the notification list.
    pub fn update_cart_badge(&self) -> AppResult<i64> {
        let carts: Vec<CartEntry> = self.store.load(CARTS)?;
        let count = carts
            .iter()
            .filter(|c| c.user_id == self.ctx.user_id)
            .map(|c| c.quantity)
            .sum();
        self.notifier.cart_badge(count);
        Ok(count)
    }

    /// Drive both recurring checks until the session shuts down
    ///
    /// Timers run for the lifetime of the session; a poll failure is
    /// logged and retried on the next tick.
    pub async fn run(
        &self,
        notify_interval: Duration,
        cart_interval: Duration,
        shutdown: CancellationToken,
    ) {
        let mut notify_tick = tokio::time::interval(notify_interval);
        let mut cart_tick = tokio::time::interval(cart_interval);
        tracing::debug!(
            user_id = %self.ctx.user_id,
            notify_ms = notify_interval.as_millis() as u64,
            cart_ms = cart_interval.as_millis() as u64,
            "Propagator started"
        );

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::debug!(user_id = %self.ctx.user_id, "Propagator stopped");
                    return;
                }
                _ = notify_tick.tick() => {
                    if let Err(e) = self.poll_once() {
                        tracing::warn!(user_id = %self.ctx.user_id, error = %e, "Notification poll failed");
                    }
                }
                _ = cart_tick.tick() => {
                    if let Err(e) = self.update_cart_badge() {
                        tracing::warn!(user_id = %self.ctx.user_id, error = %e, "Cart badge poll failed");
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{create_notification, NewNotification};
    use crate::store::MemoryStore;
    use parking_lot::Mutex;
    use shared::models::NotificationKind;
    use shared::types::UserRole;

    /// Records every raised event for assertions
    #[derive(Default)]
    struct RecordingNotifier {
        toasts: Mutex<Vec<String>>,
        sounds: Mutex<usize>,
        unread_badges: Mutex<Vec<usize>>,
        cart_badges: Mutex<Vec<i64>>,
    }

    impl Notifier for &RecordingNotifier {
        fn toast(&self, notification: &Notification) {
            self.toasts.lock().push(notification.id.clone());
        }
        fn sound_cue(&self) {
            *self.sounds.lock() += 1;
        }
        fn unread_badge(&self, count: usize) {
            self.unread_badges.lock().push(count);
        }
        fn cart_badge(&self, count: i64) {
            self.cart_badges.lock().push(count);
        }
    }

    fn create_test_notification(target: &str) -> NewNotification {
        NewNotification {
            target_user_id: target.to_string(),
            kind: NotificationKind::OrderAccepted,
            title: "Order accepted".to_string(),
            message: "The pharmacy accepted your order".to_string(),
            order_id: Some("ord-1".to_string()),
            sender_id: Some("ph-1".to_string()),
            sender_role: Some(UserRole::Pharmacy),
        }
    }

    fn propagator_for<'a>(
        store: &Arc<MemoryStore>,
        user: &str,
        notifier: &'a RecordingNotifier,
    ) -> Propagator<&'a RecordingNotifier> {
        let store: Arc<dyn RecordStore> = store.clone();
        Propagator::new(store, SessionContext::new(user, UserRole::Customer), notifier)
    }

    #[test]
    fn test_poll_raises_once_then_goes_quiet() {
        let store = Arc::new(MemoryStore::new());
        create_notification(store.as_ref(), create_test_notification("u1")).unwrap();

        let notifier = RecordingNotifier::default();
        let propagator = propagator_for(&store, "u1", &notifier);

        assert_eq!(propagator.poll_once().unwrap(), 1);
        assert_eq!(notifier.toasts.lock().len(), 1);
        assert_eq!(*notifier.sounds.lock(), 1);
        assert_eq!(*notifier.unread_badges.lock(), vec![1]);

        // second cycle observes nothing new
        assert_eq!(propagator.poll_once().unwrap(), 0);
        assert_eq!(notifier.toasts.lock().len(), 1);
        assert_eq!(*notifier.unread_badges.lock(), vec![1, 0]);
    }

    #[test]
    fn test_poll_ignores_other_users() {
        let store = Arc::new(MemoryStore::new());
        create_notification(store.as_ref(), create_test_notification("someone-else")).unwrap();

        let notifier = RecordingNotifier::default();
        let propagator = propagator_for(&store, "u1", &notifier);

        assert_eq!(propagator.poll_once().unwrap(), 0);
        assert!(notifier.toasts.lock().is_empty());
        // the other user's entry stays unread
        assert_eq!(
            crate::notify::unread_count(store.as_ref(), "someone-else").unwrap(),
            1
        );
    }

    #[test]
    fn test_mark_all_read_without_toasts() {
        let store = Arc::new(MemoryStore::new());
        create_notification(store.as_ref(), create_test_notification("u1")).unwrap();
        create_notification(store.as_ref(), create_test_notification("u1")).unwrap();

        let notifier = RecordingNotifier::default();
        let propagator = propagator_for(&store, "u1", &notifier);

        assert_eq!(propagator.mark_all_read().unwrap(), 2);
        assert!(notifier.toasts.lock().is_empty());
        assert_eq!(propagator.poll_once().unwrap(), 0);
    }

    #[test]
    fn test_clear_all_removes_only_own_entries() {
        let store = Arc::new(MemoryStore::new());
        create_notification(store.as_ref(), create_test_notification("u1")).unwrap();
        create_notification(store.as_ref(), create_test_notification("u2")).unwrap();

        let notifier = RecordingNotifier::default();
        let propagator = propagator_for(&store, "u1", &notifier);

        assert_eq!(propagator.clear_all().unwrap(), 1);
        let remaining: Vec<Notification> = store.load(NOTIFICATIONS).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].target_user_id, "u2");
    }

    #[test]
    fn test_cart_badge_sums_own_quantities() {
        let store = Arc::new(MemoryStore::new());
        store
            .save(
                CARTS,
                &vec![
                    CartEntry {
                        user_id: "u1".to_string(),
                        product_id: "p1".to_string(),
                        quantity: 2,
                    },
                    CartEntry {
                        user_id: "u1".to_string(),
                        product_id: "p2".to_string(),
                        quantity: 3,
                    },
                    CartEntry {
                        user_id: "u2".to_string(),
                        product_id: "p1".to_string(),
                        quantity: 9,
                    },
                ],
            )
            .unwrap();

        let notifier = RecordingNotifier::default();
        let propagator = propagator_for(&store, "u1", &notifier);

        assert_eq!(propagator.update_cart_badge().unwrap(), 5);
        assert_eq!(*notifier.cart_badges.lock(), vec![5]);
    }

    #[tokio::test]
    async fn test_run_stops_on_cancellation() {
        let store = Arc::new(MemoryStore::new());
        let notifier = RecordingNotifier::default();
        let propagator = propagator_for(&store, "u1", &notifier);

        let token = CancellationToken::new();
        let cancel = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            cancel.cancel();
        });
        propagator
            .run(
                Duration::from_millis(10),
                Duration::from_millis(10),
                token,
            )
            .await;
        // at least the immediate first ticks fired
        assert!(!notifier.unread_badges.lock().is_empty());
        assert!(!notifier.cart_badges.lock().is_empty());
    }
}
