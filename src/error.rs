//! Errors surfaced by the HTTP layer.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors that can occur while serving the widget.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// No widget session exists under the given ID.
    #[error("Session not found: {0}")]
    SessionNotFound(String),
}

impl ChatError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::SessionNotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self, "Request failed");
        (self.status(), self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_not_found_maps_to_404() {
        let err = ChatError::SessionNotFound("abc".to_string());
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Session not found: abc");
    }
}
