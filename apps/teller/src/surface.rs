//! Terminal rendering of UI changes.

use client_core::{Severity, UiChange, UiSurface};

pub struct TerminalSurface;

fn severity_tag(severity: Severity) -> &'static str {
    match severity {
        Severity::Info => "[info]",
        Severity::Warning => "[warning]",
        Severity::Success => "[success]",
        Severity::Danger => "[danger]",
    }
}

impl UiSurface for TerminalSurface {
    fn render(&self, change: &UiChange) {
        match change {
            UiChange::BusyShown => eprintln!("... working"),
            UiChange::BusyHidden => {}
            UiChange::Notified(notification) => {
                tracing::debug!(
                    id = notification.id,
                    severity = notification.severity.as_str(),
                    "notification shown"
                );
                println!("{} {}", severity_tag(notification.severity), notification.message);
            }
            UiChange::Dismissed(id) => tracing::debug!(id, "notification dismissed"),
            UiChange::NavigationScheduled { target, delay } => {
                tracing::debug!(path = %target, delay_ms = delay.as_millis() as u64, "navigation scheduled");
            }
        }
    }

    fn navigate(&self, target: &str) {
        println!("-> {target}");
    }
}
