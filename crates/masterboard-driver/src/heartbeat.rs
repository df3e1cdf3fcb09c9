//! Connection Monitor - Detects link aliveness from incoming sensor packets
//!
//! **Purpose**: Detect if the master board is still responding (powered on,
//! cable/wifi connected).
//!
//! **Caller-Supplied Time Pattern**:
//! - All methods take a monotonic timestamp (`Duration` since an arbitrary anchor)
//! - The same monitor works against a wall clock or a simulated clock
//! - Stored as microseconds in an `AtomicU64` for lock-free reads

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Link health monitor
///
/// Tracks the time since the last sensor packet was received.
#[derive(Debug)]
pub struct ConnectionMonitor {
    last_feedback_us: AtomicU64,
    timeout: Duration,
}

impl ConnectionMonitor {
    /// Create a new connection monitor
    ///
    /// # Parameters
    /// - `timeout`: Maximum duration without feedback before the link is considered lost
    /// - `now`: Current monotonic time, used as the initial "last feedback"
    ///
    /// # Example
    /// ```
    /// # use masterboard_driver::ConnectionMonitor;
    /// # use std::time::Duration;
    /// let monitor = ConnectionMonitor::new(Duration::from_millis(100), Duration::ZERO);
    /// assert!(monitor.check_connection(Duration::from_millis(99)));
    /// assert!(!monitor.check_connection(Duration::from_millis(100)));
    /// ```
    pub fn new(timeout: Duration, now: Duration) -> Self {
        Self {
            last_feedback_us: AtomicU64::new(now.as_micros() as u64),
            timeout,
        }
    }

    /// Check if the link is still alive at `now`
    ///
    /// Returns true if feedback was received within the timeout window
    pub fn check_connection(&self, now: Duration) -> bool {
        self.time_since_last_feedback(now) < self.timeout
    }

    /// Register that a sensor packet was received at `now`
    pub fn register_feedback(&self, now: Duration) {
        self.last_feedback_us
            .store(now.as_micros() as u64, Ordering::Relaxed);
    }

    /// Get time since last feedback
    pub fn time_since_last_feedback(&self, now: Duration) -> Duration {
        let last_us = self.last_feedback_us.load(Ordering::Relaxed);
        // now is monotonic, so a smaller value only happens on misuse
        Duration::from_micros((now.as_micros() as u64).saturating_sub(last_us))
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
