use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, Request, State},
    http::{HeaderName, StatusCode, header},
    middleware::Next,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::AppState;
use crate::config::AppConfig;
use crate::error::ChatError;
use crate::events::{WidgetEvent, sse_event};
use crate::pages::{chat_content, html_shell};
use crate::session::SessionStore;
use crate::widget::{CannedResponder, ChatWidget, Message, SubmitOutcome, WeakChatWidget};

/// Build shared state from configuration.
#[must_use]
pub fn build_state(config: Arc<AppConfig>) -> AppState {
    let provider = Arc::new(CannedResponder::new(
        config.widget.canned_response.clone(),
        config.widget.response_delay(),
    ));
    let sessions = SessionStore::new(provider, config.widget.settings());

    AppState { sessions, config }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    Router::new()
        .route("/", get(index_handler))
        .route("/api/chat", post(api_chat))
        .route("/api/sessions", get(api_list_sessions).post(api_create_session))
        .route("/api/sessions/{id}", axum::routing::delete(api_delete_session))
        .route("/api/sessions/{id}/events", get(api_session_events))
        .route("/api/sessions/{id}/messages", get(api_get_messages))
        .route("/api/sessions/{id}/history", get(api_get_history))
        .nest_service("/static", ServeDir::new("static"))
        .layer(axum::middleware::from_fn(
            move |req: Request, next: Next| async move {
                match tokio::time::timeout(timeout, next.run(req)).await {
                    Ok(res) => res,
                    Err(_) => (StatusCode::REQUEST_TIMEOUT, "Request timed out").into_response(),
                }
            },
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    info!(
        name: "widget.config.loaded",
        response_delay_ms = config.widget.response_delay_ms,
        scroll_settle_ms = config.widget.scroll_settle_ms,
        "Widget configuration loaded"
    );

    let state = build_state(Arc::clone(&config));
    spawn_session_reaper(
        state.sessions.clone(),
        config.session.idle_timeout(),
        config.session.cleanup_interval(),
    );

    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        "Server started"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

/// Periodically drop idle widget sessions.
fn spawn_session_reaper(sessions: SessionStore, idle_timeout: Duration, every: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            let removed = sessions.cleanup_expired_with_timeout(idle_timeout);
            if removed > 0 {
                info!(
                    name: "session.expired",
                    removed,
                    remaining = sessions.len(),
                    "Expired idle sessions"
                );
            }
        }
    });
}

// ─────────────────────────────────────────────────────────────────────────────
// HTML Page Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Index page: a fresh widget per page load.
async fn index_handler(State(state): State<AppState>) -> Html<String> {
    let widget = state.sessions.create();
    tracing::debug!(session_id = %widget.id(), "Created widget for page load");
    Html(html_shell("Career Assistant", &chat_content(&widget)))
}

// ─────────────────────────────────────────────────────────────────────────────
// API Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Request body for chat API.
#[derive(Debug, Deserialize)]
struct ChatRequest {
    /// Raw input field contents.
    message: String,
    /// Session ID; a new session is created if absent or empty.
    #[serde(default)]
    session_id: Option<String>,
}

/// Response from chat API.
#[derive(Debug, Serialize)]
struct ChatResponse {
    session_id: String,
    /// Whether the message was appended.
    accepted: bool,
    /// Why the message was ignored, if it was.
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'static str>,
    /// URL of the widget's SSE stream.
    events_url: String,
}

/// Session info for creation and listing.
#[derive(Debug, Serialize)]
struct SessionInfo {
    session_id: String,
    message_count: usize,
    awaiting_response: bool,
    last_activity: DateTime<Utc>,
    events_url: String,
}

impl SessionInfo {
    fn from_widget(widget: &ChatWidget) -> Self {
        Self {
            session_id: widget.id().to_string(),
            message_count: widget.message_count(),
            awaiting_response: widget.state().is_awaiting_response(),
            last_activity: widget.last_activity(),
            events_url: events_url(widget.id()),
        }
    }
}

fn events_url(session_id: &str) -> String {
    format!("/api/sessions/{session_id}/events")
}

fn find_widget(state: &AppState, id: &str) -> Result<ChatWidget, ChatError> {
    state
        .sessions
        .get(id)
        .ok_or_else(|| ChatError::SessionNotFound(id.to_string()))
}

/// POST /api/chat - Submit the input field.
///
/// An unknown session ID is a 404: the page that owned it has lost its
/// stream and must reload rather than talk to a widget nobody renders.
async fn api_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ChatError> {
    let widget = match req.session_id.as_deref() {
        Some(id) if !id.is_empty() => find_widget(&state, id)?,
        _ => state.sessions.create(),
    };

    let outcome = widget.submit(&req.message);
    let reason = match outcome {
        SubmitOutcome::Accepted => None,
        SubmitOutcome::Ignored(reason) => Some(reason.as_str()),
    };

    tracing::debug!(
        session_id = %widget.id(),
        accepted = reason.is_none(),
        message_count = widget.message_count(),
        "Chat request processed"
    );

    Ok(Json(ChatResponse {
        session_id: widget.id().to_string(),
        accepted: reason.is_none(),
        reason,
        events_url: events_url(widget.id()),
    }))
}

/// GET /api/sessions - List live sessions.
async fn api_list_sessions(State(state): State<AppState>) -> Json<Vec<SessionInfo>> {
    let sessions = state
        .sessions
        .list_ids()
        .iter()
        .filter_map(|id| state.sessions.get(id))
        .map(|widget| SessionInfo::from_widget(&widget))
        .collect();
    Json(sessions)
}

/// POST /api/sessions - Create a widget session.
async fn api_create_session(State(state): State<AppState>) -> (StatusCode, Json<SessionInfo>) {
    let widget = state.sessions.create();
    (StatusCode::CREATED, Json(SessionInfo::from_widget(&widget)))
}

/// DELETE /api/sessions/{id} - Drop a widget session.
async fn api_delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ChatError> {
    state
        .sessions
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(ChatError::SessionNotFound(id))
}

/// GET /api/sessions/{id}/messages - Message history as JSON.
async fn api_get_messages(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Message>>, ChatError> {
    Ok(Json(find_widget(&state, &id)?.messages()))
}

/// GET /api/sessions/{id}/history - Message history as rendered bubbles.
async fn api_get_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, ChatError> {
    Ok(Html(find_widget(&state, &id)?.render_history()))
}

/// GET /api/sessions/{id}/events - SSE stream of UI updates.
///
/// The stream opens with a snapshot of the widget and then carries every
/// later change.
async fn api_session_events(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ChatError> {
    let widget = find_widget(&state, &id)?;
    let (rx, snapshot) = widget.subscribe_with_snapshot();
    let updates = widget_updates(widget.downgrade(), rx, snapshot);
    drop(widget);

    tracing::info!(session_id = %id, "Starting SSE stream");

    let sse_stream = async_stream::stream! {
        futures::pin_mut!(updates);
        while let Some(event) = updates.next().await {
            yield Ok::<String, Infallible>(sse_event(&event));
        }
        tracing::debug!(session_id = %id, "SSE stream closed");
    };

    Ok(build_sse_response(axum::body::Body::from_stream(sse_stream)))
}

/// Snapshot followed by live updates.
///
/// A subscriber that falls behind the channel gets a fresh snapshot in place
/// of the events it missed. The stream ends when the widget is dropped.
fn widget_updates(
    handle: WeakChatWidget,
    rx: broadcast::Receiver<WidgetEvent>,
    snapshot: Vec<WidgetEvent>,
) -> impl Stream<Item = WidgetEvent> + Send {
    async_stream::stream! {
        for event in snapshot {
            yield event;
        }
        let mut updates = BroadcastStream::new(rx);
        while let Some(item) = updates.next().await {
            match item {
                Ok(event) => {
                    yield event;
                }
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    let Some(widget) = handle.upgrade() else {
                        break;
                    };
                    tracing::warn!(
                        name: "widget.stream.resync",
                        widget_id = %widget.id(),
                        skipped,
                        "Event subscriber lagged, resending snapshot"
                    );
                    let (rx, snapshot) = widget.subscribe_with_snapshot();
                    drop(widget);
                    updates = BroadcastStream::new(rx);
                    for event in snapshot {
                        yield event;
                    }
                }
            }
        }
    }
}

fn build_sse_response(body: axum::body::Body) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
            (HeaderName::from_static("x-accel-buffering"), "no"),
        ],
        body,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::WidgetSettings;

    #[tokio::test(start_paused = true)]
    async fn test_lagged_stream_resends_snapshot() {
        let widget = ChatWidget::new(
            "lag",
            Arc::new(CannedResponder::default()),
            WidgetSettings::default(),
        );
        let (rx, snapshot) = widget.subscribe_with_snapshot();
        let updates = widget_updates(widget.downgrade(), rx, snapshot);

        // 7 rounds of 11 events overflow the 64-slot channel.
        for round in 0..7 {
            assert_eq!(widget.submit(&format!("round {round}")), SubmitOutcome::Accepted);
            tokio::time::sleep(Duration::from_millis(1001)).await;
            tokio::task::yield_now().await;
        }

        let events: Vec<WidgetEvent> = Box::pin(updates).take(8).collect().await;
        let names: Vec<_> = events.iter().map(crate::events::event_name).collect();
        assert_eq!(
            names,
            vec![
                "widget.history",
                "widget.submit",
                "widget.typing",
                "widget.scroll",
                "widget.history",
                "widget.submit",
                "widget.typing",
                "widget.scroll",
            ]
        );
        match &events[4] {
            WidgetEvent::History { html } => {
                assert_eq!(html.matches("class=\"message ").count(), 14);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(events[5], WidgetEvent::Submit { enabled: true });
        assert_eq!(events[6], WidgetEvent::Typing { visible: false });
    }

    #[tokio::test]
    async fn test_updates_end_when_widget_is_dropped() {
        let widget = ChatWidget::new(
            "gone",
            Arc::new(CannedResponder::default()),
            WidgetSettings::default(),
        );
        let (rx, snapshot) = widget.subscribe_with_snapshot();
        let updates = widget_updates(widget.downgrade(), rx, snapshot);
        drop(widget);

        let events: Vec<WidgetEvent> = Box::pin(updates).collect().await;
        assert_eq!(events.len(), 4);
    }
}
