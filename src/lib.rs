//! Canned Chat
//!
//! A browser chat widget that answers every message with a fixed canned
//! response after a simulated thinking delay.
//!
//! # Architecture
//!
//! - **Widget**: pure state machine plus an effectful shell that keeps the
//!   history, renders bubbles and runs the response timer
//! - **Server**: Axum HTTP server; the page forwards submits over JSON and
//!   receives UI updates over SSE
//! - **UI**: server-rendered HTML shell with a small static script
//!
//! # Modules
//!
//! - [`widget`]: chat widget core
//! - [`events`]: UI update events and SSE framing
//! - [`session`]: per-browser widget sessions
//! - [`config`]: layered configuration
//! - [`server`]: router and handlers

#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::unused_async)]

pub mod config;
pub mod error;
pub mod events;
pub mod pages;
pub mod server;
pub mod session;
pub mod widget;

use std::sync::Arc;

use crate::config::AppConfig;
use session::SessionStore;

/// Application state shared across all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Live widget sessions.
    pub sessions: SessionStore,
    /// Global configuration.
    pub config: Arc<AppConfig>,
}
