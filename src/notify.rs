//! Notification dispatch.
//!
//! Stores report the outcome of explicit save/reset actions through a
//! `Notifier`. The GUI drains a `NotificationQueue` into toasts.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

/// Oldest notifications are dropped beyond this many pending entries.
const MAX_PENDING: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

pub trait Notifier: Send + Sync {
    fn show_notification(&self, kind: NotificationKind, message: &str);
}

/// Bounded FIFO of notifications waiting to be displayed.
#[derive(Debug, Default)]
pub struct NotificationQueue {
    pending: Mutex<VecDeque<Notification>>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns everything queued so far, oldest first.
    pub fn drain(&self) -> Vec<Notification> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Notifier for NotificationQueue {
    fn show_notification(&self, kind: NotificationKind, message: &str) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if pending.len() == MAX_PENDING {
            pending.pop_front();
        }
        pending.push_back(Notification {
            kind,
            message: message.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_in_order() {
        let queue = NotificationQueue::new();
        queue.show_notification(NotificationKind::Success, "saved");
        queue.show_notification(NotificationKind::Error, "failed");

        let drained = queue.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].message, "saved");
        assert_eq!(drained[1].kind, NotificationKind::Error);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_queue_is_bounded() {
        let queue = NotificationQueue::new();
        for i in 0..(MAX_PENDING + 4) {
            queue.show_notification(NotificationKind::Info, &i.to_string());
        }
        let drained = queue.drain();
        assert_eq!(drained.len(), MAX_PENDING);
        assert_eq!(drained[0].message, "4");
    }
}
