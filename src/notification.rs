//! Non-fatal decode diagnostics.
//!
//! A decoder that skips a record, meets a bad terminator byte or an old file
//! version records a [`Notification`] and keeps going. The collection is
//! returned with the decoded value, and every entry is also forwarded to the
//! `log` facade at the matching level when it is recorded.

use std::fmt;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NotificationType {
    /// Informational, e.g. a block the decoder reads but does not interpret.
    Info,
    /// Suspicious but harmless, e.g. an old version number.
    Warning,
    /// A record or line that was skipped.
    Error,
}

impl NotificationType {
    /// The `log` level the notification is forwarded at.
    pub fn log_level(self) -> log::Level {
        match self {
            Self::Info => log::Level::Info,
            Self::Warning => log::Level::Warn,
            Self::Error => log::Level::Error,
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub notification_type: NotificationType,
    pub message: String,
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.notification_type, self.message)
    }
}

/// Notifications of one decode, in the order they were raised.
#[derive(Debug, Clone, Default)]
pub struct NotificationCollection {
    items: Vec<Notification>,
}

impl NotificationCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a notification and logs it.
    pub fn notify(&mut self, notification_type: NotificationType, message: impl Into<String>) {
        let message = message.into();
        log::log!(notification_type.log_level(), "{message}");
        self.items.push(Notification {
            notification_type,
            message,
        });
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.notify(NotificationType::Error, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.notify(NotificationType::Warning, message);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.notify(NotificationType::Info, message);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Notification> {
        self.items.iter()
    }

    /// Number of notifications of the given severity.
    pub fn count(&self, notification_type: NotificationType) -> usize {
        self.iter()
            .filter(|n| n.notification_type == notification_type)
            .count()
    }

    pub fn has_type(&self, notification_type: NotificationType) -> bool {
        self.iter().any(|n| n.notification_type == notification_type)
    }

    /// Highest severity recorded, if any.
    pub fn worst(&self) -> Option<NotificationType> {
        self.iter().map(|n| n.notification_type).max()
    }
}

impl<'a> IntoIterator for &'a NotificationCollection {
    type Item = &'a Notification;
    type IntoIter = std::slice::Iter<'a, Notification>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
