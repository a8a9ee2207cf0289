//! UI update events pushed from a widget to the page.
//!
//! The page script listens on an `EventSource` and applies each event to the
//! DOM. Every event is sent as a named SSE event with a JSON payload.
//!
//! # Example
//!
//! ```rust
//! use canned_chat::events::{WidgetEvent, sse_event};
//!
//! let event = WidgetEvent::Typing { visible: true };
//! let sse = sse_event(&event);
//! assert!(sse.starts_with("event: widget.typing\n"));
//! ```

use serde::{Deserialize, Serialize};

use crate::widget::Origin;

/// A change the page must apply to its widget markup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "data")]
pub enum WidgetEvent {
    /// Append a rendered bubble to the history panel.
    #[serde(rename = "widget.message")]
    Message {
        /// Author of the message.
        origin: Origin,
        /// Escaped bubble markup.
        html: String,
    },

    /// Replace the history panel with the full rendered history.
    ///
    /// Sent when a stream starts or resynchronises.
    #[serde(rename = "widget.history")]
    History { html: String },

    /// Show or hide the typing indicator.
    #[serde(rename = "widget.typing")]
    Typing { visible: bool },

    /// Enable or disable the send control.
    #[serde(rename = "widget.submit")]
    Submit { enabled: bool },

    /// Replace the input field contents.
    #[serde(rename = "widget.input")]
    Input { value: String },

    /// Scroll the history panel to its newest entry after a settle delay.
    #[serde(rename = "widget.scroll")]
    Scroll {
        /// Delay before scrolling, letting layout settle.
        after_ms: u64,
        /// Offset the server-side layout model scrolled to.
        scroll_top: u32,
    },

    /// Focus the input field.
    #[serde(rename = "widget.focus")]
    Focus,
}

/// SSE event name for a [`WidgetEvent`].
#[must_use]
pub fn event_name(evt: &WidgetEvent) -> &'static str {
    match evt {
        WidgetEvent::Message { .. } => "widget.message",
        WidgetEvent::History { .. } => "widget.history",
        WidgetEvent::Typing { .. } => "widget.typing",
        WidgetEvent::Submit { .. } => "widget.submit",
        WidgetEvent::Input { .. } => "widget.input",
        WidgetEvent::Scroll { .. } => "widget.scroll",
        WidgetEvent::Focus => "widget.focus",
    }
}

/// Format a [`WidgetEvent`] as an SSE frame.
#[must_use]
pub fn sse_event(evt: &WidgetEvent) -> String {
    let json = serde_json::to_string(evt).unwrap_or_else(|e| {
        serde_json::json!({ "type": "error", "data": { "message": e.to_string() } }).to_string()
    });

    format!("event: {}\ndata: {json}\n\n", event_name(evt))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sse_event_format() {
        let sse = sse_event(&WidgetEvent::Focus);
        assert!(sse.starts_with("event: widget.focus\n"));
        assert!(sse.contains("data: "));
        assert!(sse.ends_with("\n\n"));
    }

    #[test]
    fn test_message_payload_shape() {
        let event = WidgetEvent::Message {
            origin: Origin::User,
            html: "<p>hi</p>".to_string(),
        };
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "widget.message");
        assert_eq!(json["data"]["origin"], "user");
        assert_eq!(json["data"]["html"], "<p>hi</p>");
    }

    #[test]
    fn test_event_names_match_serde_tags() {
        let events = [
            WidgetEvent::History {
                html: String::new(),
            },
            WidgetEvent::Typing { visible: false },
            WidgetEvent::Submit { enabled: true },
            WidgetEvent::Input {
                value: String::new(),
            },
            WidgetEvent::Scroll {
                after_ms: 10,
                scroll_top: 0,
            },
        ];
        for event in events {
            let json = serde_json::to_value(&event).unwrap();
            assert_eq!(json["type"], event_name(&event));
        }
    }
}
