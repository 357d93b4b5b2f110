//! Notification sink for user-facing toasts

use tokio::sync::mpsc;

/// Visual variant of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationVariant {
    /// An operation completed successfully.
    Success,
    /// An operation failed.
    Destructive,
}

/// A user-facing notification.
///
/// Fire-and-forget: there is no delivery guarantee and no ordering
/// guarantee across concurrent operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Short headline, e.g. "Saved".
    pub title: String,
    /// Longer description shown under the title.
    pub description: String,
    /// Visual variant.
    pub variant: NotificationVariant,
}

impl Notification {
    /// Creates a success notification.
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NotificationVariant::Success,
        }
    }

    /// Creates a destructive (failure) notification.
    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NotificationVariant::Destructive,
        }
    }
}

/// Receives notifications emitted by the cache layer.
///
/// `notify` must not block; implementations typically hand the
/// notification to a channel or UI queue and return immediately.
pub trait NotificationSink: Send + Sync {
    /// Delivers a notification. Delivery is best-effort.
    fn notify(&self, notification: Notification);
}

/// A sink that forwards notifications into an unbounded channel.
///
/// The UI side holds the receiver and drains it on its own schedule. If
/// the receiver is dropped, notifications are silently discarded.
///
/// # Example
///
/// ```
/// use medidesk_lib::notify::{ChannelSink, Notification, NotificationSink};
///
/// let (sink, mut rx) = ChannelSink::new();
/// sink.notify(Notification::success("Saved", "Patient record updated"));
/// assert!(rx.try_recv().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelSink {
    /// Creates a sink and the receiver that drains it.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl NotificationSink for ChannelSink {
    fn notify(&self, notification: Notification) {
        // A closed receiver just means nobody is listening anymore.
        let _ = self.tx.send(notification);
    }
}

/// A sink that drops every notification. Useful in tests and headless
/// callers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn notify(&self, _notification: Notification) {}
}
