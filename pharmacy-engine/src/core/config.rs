//! Engine configuration
//!
//! All settings can be overridden through environment variables:
//!
//! | Variable | Default | Purpose |
//! |----------|---------|---------|
//! | WORK_DIR | /var/lib/pharmacy/engine | Work directory for the record store |
//! | NOTIFY_POLL_MS | 2000 | Notification poll interval (ms) |
//! | CART_BADGE_POLL_MS | 1000 | Cart badge poll interval (ms) |
//! | LOW_STOCK_THRESHOLD | 5 | Default low-stock report threshold |

use crate::report::DEFAULT_LOW_STOCK_THRESHOLD;
use std::time::Duration;

/// Engine configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Work directory holding the record store file
    pub work_dir: String,
    /// Notification poll interval
    pub notify_poll_interval: Duration,
    /// Cart badge poll interval
    pub cart_badge_poll_interval: Duration,
    /// Default low-stock report threshold
    pub low_stock_threshold: i64,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR")
                .unwrap_or_else(|_| "/var/lib/pharmacy/engine".into()),
            notify_poll_interval: Duration::from_millis(
                std::env::var("NOTIFY_POLL_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(2000),
            ),
            cart_badge_poll_interval: Duration::from_millis(
                std::env::var("CART_BADGE_POLL_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(1000),
            ),
            low_stock_threshold: std::env::var("LOW_STOCK_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            work_dir: "/var/lib/pharmacy/engine".into(),
            notify_poll_interval: Duration::from_millis(2000),
            cart_badge_poll_interval: Duration::from_millis(1000),
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
        }
    }
}
