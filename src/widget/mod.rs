//! The chat widget core.
//!
//! The widget is split into a pure state machine and a thin effectful shell:
//!
//! - [`state`]: `(WidgetState, Event) -> (WidgetState, Vec<Effect>)`
//! - [`chat`]: [`ChatWidget`], which applies effects, keeps the history and
//!   runs the response timer
//! - [`render`]: message to escaped bubble markup
//! - [`viewport`]: scroll model of the history panel
//! - [`responder`]: injectable response provider
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use canned_chat::widget::{ChatWidget, CannedResponder, SubmitOutcome, WidgetSettings};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let widget = ChatWidget::new("demo", Arc::new(CannedResponder::default()), WidgetSettings::default());
//! assert_eq!(widget.submit("hi"), SubmitOutcome::Accepted);
//! assert_eq!(widget.message_count(), 1);
//! # }
//! ```

mod chat;
mod message;
pub mod render;
pub mod responder;
pub mod state;
pub mod viewport;

pub use chat::{ChatWidget, SubmitOutcome, WeakChatWidget, WidgetSettings};
pub use message::{Message, Origin};
pub use render::{escape_html, render};
pub use responder::{CannedResponder, ResponseProvider};
pub use state::{Effect, Event, IgnoreReason, WidgetState, transition};
pub use viewport::HistoryViewport;
