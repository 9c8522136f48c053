//! Notification queue drained once per tick.
//!
//! Registries and tasks push [`Notification`]s here as they happen. The
//! tick cycle drains the queue at the end of each tick and hands the batch
//! to whatever listeners exist. Pushing with nobody listening is fine.

use colony_types::Notification;

/// FIFO buffer of notifications produced during the current tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationQueue {
    pending: Vec<Notification>,
}

impl NotificationQueue {
    /// Create an empty queue.
    pub const fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    /// Append a notification.
    pub fn push(&mut self, notification: Notification) {
        self.pending.push(notification);
    }

    /// Take every queued notification, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.pending)
    }

    /// Queued notifications, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.pending.iter()
    }

    /// Number of queued notifications.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use colony_types::PostedTaskId;

    use super::*;

    #[test]
    fn drain_empties_in_order() {
        let mut queue = NotificationQueue::new();
        let first = PostedTaskId::new();
        let second = PostedTaskId::new();
        queue.push(Notification::PostedTaskCompleted { posted: first });
        queue.push(Notification::PostedTaskCompleted { posted: second });

        let drained = queue.drain();
        assert_eq!(
            drained,
            vec![
                Notification::PostedTaskCompleted { posted: first },
                Notification::PostedTaskCompleted { posted: second },
            ]
        );
        assert!(queue.is_empty());
        assert!(queue.drain().is_empty());
    }
}
