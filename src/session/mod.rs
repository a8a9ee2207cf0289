//! Per-browser widget sessions.
//!
//! Each page load owns one [`ChatWidget`](crate::widget::ChatWidget),
//! identified by a UUID. Sessions live in memory only and are dropped after a
//! period of inactivity once no page is connected.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use canned_chat::session::SessionStore;
//! use canned_chat::widget::{CannedResponder, WidgetSettings};
//!
//! let store = SessionStore::new(Arc::new(CannedResponder::default()), WidgetSettings::default());
//! let widget = store.create();
//! assert!(store.get(widget.id()).is_some());
//! ```

mod store;

pub use store::SessionStore;
