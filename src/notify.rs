//! System notifications.

use std::fmt::Write;

use notify_rust::Notification;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber, error};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

use crate::{APP_NAME, APP_NAME_PRETTY, Visual};

/// Send a system notification with a summary and body.
pub fn notify(summary: &str, body: &str) {
    Notification::new()
        .appname(APP_NAME)
        .summary(&format!("{} - {}", APP_NAME_PRETTY, summary))
        .body(body)
        .show()
        .map_err(|e| error!("Failed to send notification: {}", e))
        .ok();
}

/// Announce the visual the indicator just switched to.
pub fn notify_visual(visual: Visual) {
    notify(visual_summary(visual), visual.label());
}

fn visual_summary(visual: Visual) -> &'static str {
    match visual {
        Visual::Neutral => "unmuted",
        Visual::Highlighted => "muted",
    }
}

/// Collects the message of a tracing event plus the fields worth showing,
/// such as the status source that failed.
#[derive(Default)]
struct EventBody {
    message: Option<String>,
    fields: Vec<(&'static str, String)>,
}

const SHOWN_FIELDS: &[&str] = &["source", "command"];

impl EventBody {
    fn push(&mut self, field: &Field, value: String) {
        match field.name() {
            "message" => self.message = Some(value),
            name if SHOWN_FIELDS.contains(&name) => self.fields.push((name, value)),
            _ => {}
        }
    }

    fn render(self) -> Option<String> {
        let mut body = self.message?;
        for (name, value) in self.fields {
            write!(body, "\n{}: {}", name, value).ok();
        }
        Some(body)
    }
}

impl Visit for EventBody {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.push(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.push(field, format!("{:?}", value));
    }
}

/// Tracing layer that sends notifications for warnings and errors.
#[derive(Debug, Default)]
pub struct NotificationLayer {}

impl NotificationLayer {
    pub fn new() -> Self {
        Self {}
    }
}

fn should_notify(level: Level) -> Option<&'static str> {
    match level {
        Level::ERROR => Some("error"),
        Level::WARN => Some("warning"),
        _ => None,
    }
}

impl<S: Subscriber> Layer<S> for NotificationLayer {
    fn on_event(&self, event: &Event<'_>, _: Context<'_, S>) {
        let Some(summary) = should_notify(*event.metadata().level()) else {
            return;
        };

        let mut body = EventBody::default();
        event.record(&mut body);

        if let Some(body) = body.render() {
            notify(summary, &body);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_warnings_and_errors_notify() {
        assert_eq!(should_notify(Level::ERROR), Some("error"));
        assert_eq!(should_notify(Level::WARN), Some("warning"));
        assert_eq!(should_notify(Level::INFO), None);
        assert_eq!(should_notify(Level::DEBUG), None);
        assert_eq!(should_notify(Level::TRACE), None);
    }

    #[test]
    fn test_visual_summary_names_the_state() {
        assert_eq!(visual_summary(Visual::Highlighted), "muted");
        assert_eq!(visual_summary(Visual::Neutral), "unmuted");
    }

    #[test]
    fn test_body_lists_source_after_message() {
        let body = EventBody {
            message: Some("Failed to query mic status".to_string()),
            fields: vec![("source", "pactl".to_string())],
        };
        assert_eq!(
            body.render().as_deref(),
            Some("Failed to query mic status\nsource: pactl")
        );
    }

    #[test]
    fn test_body_without_message_is_skipped() {
        let body = EventBody {
            message: None,
            fields: vec![("source", "pactl".to_string())],
        };
        assert_eq!(body.render(), None);
    }
}
