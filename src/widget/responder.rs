//! Response providers.
//!
//! A provider decides how long the widget "thinks" and what it answers. The
//! widget never reads the clock itself: it asks the provider for a delay and
//! sleeps on the Tokio timer, so tests can drive time with a paused runtime.

use std::time::Duration;

use async_trait::async_trait;

/// Text returned by [`CannedResponder`] unless configured otherwise.
pub const DEFAULT_CANNED_RESPONSE: &str = "I'm currently running in a local mode without an active AI connection. I can't provide real-time career advice right now, but feel free to explore other features!";

/// Simulated thinking time before the response is delivered.
pub const DEFAULT_RESPONSE_DELAY: Duration = Duration::from_millis(1000);

/// Source of assistant replies.
#[async_trait]
pub trait ResponseProvider: Send + Sync + std::fmt::Debug {
    /// How long to wait before delivering a reply.
    fn delay(&self) -> Duration;

    /// Produce the reply for `prompt`.
    async fn respond(&self, prompt: &str) -> String;

    /// Provider name for logging.
    fn provider_name(&self) -> &'static str;
}

/// Always answers with the same fixed text, regardless of input.
#[derive(Debug, Clone)]
pub struct CannedResponder {
    text: String,
    delay: Duration,
}

impl CannedResponder {
    #[must_use]
    pub fn new(text: impl Into<String>, delay: Duration) -> Self {
        Self {
            text: text.into(),
            delay,
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Default for CannedResponder {
    fn default() -> Self {
        Self::new(DEFAULT_CANNED_RESPONSE, DEFAULT_RESPONSE_DELAY)
    }
}

#[async_trait]
impl ResponseProvider for CannedResponder {
    fn delay(&self) -> Duration {
        self.delay
    }

    async fn respond(&self, _prompt: &str) -> String {
        self.text.clone()
    }

    fn provider_name(&self) -> &'static str {
        "canned"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_canned_ignores_prompt() {
        let responder = CannedResponder::default();
        assert_eq!(responder.respond("hi").await, DEFAULT_CANNED_RESPONSE);
        assert_eq!(responder.respond("anything else").await, DEFAULT_CANNED_RESPONSE);
        assert_eq!(responder.delay(), Duration::from_secs(1));
    }
}
