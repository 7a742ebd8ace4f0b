use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
    pub expires_at: Instant,
}

impl Notification {
    pub fn new(message: impl Into<String>, level: NotificationLevel, duration: Duration) -> Self {
        Self {
            message: message.into(),
            level,
            expires_at: Instant::now() + duration,
        }
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Short-lived panel notices, newest first.
#[derive(Debug, Default)]
pub struct NotificationManager {
    notifications: Vec<Notification>,
    default_duration: Duration,
}

impl NotificationManager {
    pub fn new() -> Self {
        Self::with_default_duration(Duration::from_secs(5))
    }

    pub fn with_default_duration(default_duration: Duration) -> Self {
        Self {
            notifications: Vec::new(),
            default_duration,
        }
    }

    pub fn notify(&mut self, message: impl Into<String>, level: NotificationLevel) {
        let notification = Notification::new(message, level, self.default_duration);
        self.notifications.insert(0, notification);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.notify(message, NotificationLevel::Info);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.notify(message, NotificationLevel::Warning);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.notify(message, NotificationLevel::Error);
    }

    /// Remove expired notifications, returns true if any were removed
    pub fn update(&mut self) -> bool {
        let initial_len = self.notifications.len();
        self.notifications.retain(|n| !n.is_expired());
        self.notifications.len() != initial_len
    }

    pub fn current(&self) -> Option<&Notification> {
        self.notifications.first()
    }

    pub fn all(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn dismiss_current(&mut self) -> bool {
        if self.notifications.is_empty() {
            false
        } else {
            self.notifications.remove(0);
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_notification_is_current() {
        let mut manager = NotificationManager::new();
        manager.info("first");
        manager.warn("second");
        assert_eq!(manager.current().map(|n| n.message.as_str()), Some("second"));
        assert_eq!(manager.all().len(), 2);
    }

    #[test]
    fn expired_notifications_are_dropped_on_update() {
        let mut manager = NotificationManager::with_default_duration(Duration::from_millis(0));
        manager.info("gone");
        assert!(manager.update());
        assert!(manager.current().is_none());
    }

    #[test]
    fn dismiss_removes_the_current_entry() {
        let mut manager = NotificationManager::new();
        assert!(!manager.dismiss_current());
        manager.info("one");
        assert!(manager.dismiss_current());
        assert!(manager.current().is_none());
    }
}
