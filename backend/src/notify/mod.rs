//! Outcome reporting.
//!
//! Core operations report what happened to a [`Notifier`]; presentation is
//! left to whoever owns the notifier (the HTTP layer returns them in the
//! response envelope).

use serde::Serialize;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    /// Non-fatal problem; the operation still took effect
    Warning,
    Error,
}

/// A single outcome message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

/// Receiver of outcome reports.
pub trait Notifier {
    fn notify(&mut self, kind: NotificationKind, message: &str);
}

/// Notifier that keeps every report in order and mirrors it to the log.
#[derive(Debug, Default)]
pub struct NotificationLog {
    entries: Vec<Notification>,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Notification] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<Notification> {
        self.entries
    }
}

impl Notifier for NotificationLog {
    fn notify(&mut self, kind: NotificationKind, message: &str) {
        match kind {
            NotificationKind::Success => tracing::debug!("notify success: {}", message),
            NotificationKind::Warning => tracing::warn!("notify warning: {}", message),
            NotificationKind::Error => tracing::info!("notify error: {}", message),
        }
        self.entries.push(Notification {
            kind,
            message: message.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_keeps_order() {
        let mut log = NotificationLog::new();
        log.notify(NotificationKind::Error, "Erreur réseau: offline");
        log.notify(NotificationKind::Success, "Jeu enregistré avec succès");

        let kinds: Vec<NotificationKind> = log.entries().iter().map(|n| n.kind).collect();
        assert_eq!(kinds, vec![NotificationKind::Error, NotificationKind::Success]);
        assert_eq!(log.into_entries()[1].message, "Jeu enregistré avec succès");
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        let value = serde_json::to_value(NotificationKind::Warning).unwrap();
        assert_eq!(value, "warning");
    }
}
