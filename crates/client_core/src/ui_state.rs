//! Busy indicator and notification state, as pure transitions.
//!
//! Each transition returns the [`UiChange`] a [`UiSurface`] has to render, or
//! `None` when nothing visible changed.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Info,
    Warning,
    Success,
    Danger,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Success => "success",
            Self::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiChange {
    BusyShown,
    BusyHidden,
    Notified(Notification),
    Dismissed(u64),
    NavigationScheduled { target: String, delay: Duration },
}

/// Rendering side of the UI. Implementations must not block.
pub trait UiSurface: Send + Sync {
    fn render(&self, change: &UiChange);
    fn navigate(&self, target: &str);
}

#[derive(Debug, Default)]
pub struct UiState {
    busy: bool,
    notifications: Vec<Notification>,
    next_notification_id: u64,
}

impl UiState {
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn show_busy(&mut self) -> Option<UiChange> {
        if self.busy {
            return None;
        }
        self.busy = true;
        Some(UiChange::BusyShown)
    }

    pub fn hide_busy(&mut self) -> Option<UiChange> {
        if !self.busy {
            return None;
        }
        self.busy = false;
        Some(UiChange::BusyHidden)
    }

    pub fn notify(&mut self, severity: Severity, message: impl Into<String>) -> UiChange {
        self.next_notification_id += 1;
        let notification = Notification {
            id: self.next_notification_id,
            severity,
            message: message.into(),
        };
        self.notifications.push(notification.clone());
        UiChange::Notified(notification)
    }

    pub fn dismiss(&mut self, id: u64) -> Option<UiChange> {
        let idx = self.notifications.iter().position(|n| n.id == id)?;
        self.notifications.remove(idx);
        Some(UiChange::Dismissed(id))
    }
}
