// Alert banner - dismissible status messages in a named container
use crate::application::document::{Document, Node};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

pub const MAIN_ALERT_BOX: &str = "main-alert-box";
pub const DEFAULT_DISMISS_AFTER: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Success,
    Info,
    Warning,
    Danger,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Success => "success",
            AlertKind::Info => "info",
            AlertKind::Warning => "warning",
            AlertKind::Danger => "danger",
        }
    }
}

pub struct AlertBanner {
    document: Arc<dyn Document>,
    dismiss_after: Duration,
    sequence: AtomicU64,
}

impl AlertBanner {
    pub fn new(document: Arc<dyn Document>, dismiss_after: Duration) -> Self {
        Self {
            document,
            dismiss_after,
            sequence: AtomicU64::new(0),
        }
    }

    /// Replaces the container's content with one alert. Non-error alerts
    /// dismiss themselves after the configured delay unless a newer alert
    /// has taken their place.
    pub fn show(&self, kind: AlertKind, message: &str, container_id: &str) {
        if !self.document.exists(container_id) {
            tracing::warn!("Alert container with id '{}' not found", container_id);
            return;
        }

        let alert_id = self.sequence.fetch_add(1, Ordering::Relaxed).to_string();
        let alert = Node::new("div")
            .class("alert")
            .class(format!("alert-{}", kind.as_str()))
            .class("alert-dismissible")
            .attr("role", "alert")
            .attr("data-alert-id", alert_id.clone())
            .text(message)
            .child(Node::new("button").class("btn-close").attr("aria-label", "Close"));
        self.document.replace_children(container_id, vec![alert]);

        if kind == AlertKind::Danger {
            return;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::debug!("No runtime available, alert in '{}' will not auto-dismiss", container_id);
            return;
        };
        let document = self.document.clone();
        let container_id = container_id.to_string();
        let delay = self.dismiss_after;
        runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            dismiss(document.as_ref(), &container_id, &alert_id);
        });
    }
}

/// Removes the alert with `alert_id` if it is still the one displayed.
pub fn dismiss(document: &dyn Document, container_id: &str, alert_id: &str) {
    let current = document.children(container_id);
    let still_shown = current
        .iter()
        .any(|n| n.attributes.get("data-alert-id").map(String::as_str) == Some(alert_id));
    if still_shown {
        document.replace_children(container_id, Vec::new());
    }
}
