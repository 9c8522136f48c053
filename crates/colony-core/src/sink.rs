//! Listeners for drained notifications.
//!
//! The tick cycle hands every sink the notifications raised during the
//! tick. A colony without sinks is fine: the queue is drained into the
//! [`TickSummary`](crate::tick::TickSummary) either way.

use tracing::debug;

use colony_types::Notification;

/// Receives each tick's notifications.
pub trait NotificationSink: Send {
    /// Called once per tick after the queue is drained, even when
    /// `notifications` is empty.
    fn deliver(&mut self, tick: u64, notifications: &[Notification]);
}

/// A sink that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpSink;

impl NotificationSink for NoOpSink {
    fn deliver(&mut self, _tick: u64, _notifications: &[Notification]) {}
}

/// A sink that writes every notification to the debug log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn deliver(&mut self, tick: u64, notifications: &[Notification]) {
        for notification in notifications {
            debug!(tick, notification = ?notification, "Notification");
        }
    }
}
