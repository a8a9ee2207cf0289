//! The chat widget: state, history and the response timer.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use super::message::Message;
use super::render::{render, render_history};
use super::responder::ResponseProvider;
use super::state::{Effect, Event, IgnoreReason, WidgetState, check_submit, transition};
use super::viewport::HistoryViewport;
use crate::events::WidgetEvent;

/// Capacity of the per-widget UI event channel.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Presentation settings for a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidgetSettings {
    /// Deferral before scrolling, letting layout settle.
    pub scroll_settle: Duration,
    /// Visible height of the history panel, in pixels.
    pub viewport_height: u32,
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self {
            scroll_settle: Duration::from_millis(10),
            viewport_height: 480,
        }
    }
}

/// Result of a submit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The message was appended and a response is scheduled.
    Accepted,
    /// Nothing changed.
    Ignored(IgnoreReason),
}

/// A chat widget.
///
/// Cloning is cheap and yields a handle to the same widget.
#[derive(Debug, Clone)]
pub struct ChatWidget {
    inner: Arc<WidgetInner>,
}

/// Non-owning handle to a [`ChatWidget`].
///
/// Long-lived listeners hold one of these so a dropped session is not kept
/// alive by its own event stream.
#[derive(Debug, Clone)]
pub struct WeakChatWidget {
    inner: Weak<WidgetInner>,
}

impl WeakChatWidget {
    /// The widget, if any session still owns it.
    #[must_use]
    pub fn upgrade(&self) -> Option<ChatWidget> {
        self.inner.upgrade().map(|inner| ChatWidget { inner })
    }
}

#[derive(Debug)]
struct WidgetInner {
    id: String,
    provider: Arc<dyn ResponseProvider>,
    settings: WidgetSettings,
    events: broadcast::Sender<WidgetEvent>,
    core: Mutex<WidgetCore>,
}

#[derive(Debug)]
struct WidgetCore {
    state: WidgetState,
    messages: Vec<Message>,
    viewport: HistoryViewport,
    last_activity: DateTime<Utc>,
}

/// What a single transition did.
#[derive(Debug, Default)]
struct Applied {
    /// The transition produced effects.
    accepted: bool,
    /// Prompt to answer, if a response must be scheduled.
    scheduled: Option<String>,
}

impl ChatWidget {
    /// Create an idle widget with an empty history.
    pub fn new(
        id: impl Into<String>,
        provider: Arc<dyn ResponseProvider>,
        settings: WidgetSettings,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(WidgetInner {
                id: id.into(),
                provider,
                settings,
                events,
                core: Mutex::new(WidgetCore {
                    state: WidgetState::new(),
                    messages: Vec::new(),
                    viewport: HistoryViewport::new(settings.viewport_height),
                    last_activity: Utc::now(),
                }),
            }),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    #[must_use]
    pub fn downgrade(&self) -> WeakChatWidget {
        WeakChatWidget {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Subscribe to UI updates produced from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<WidgetEvent> {
        self.inner.events.subscribe()
    }

    /// Subscribe and capture the current UI state in one step.
    ///
    /// The snapshot (history, submit control, typing indicator, scroll
    /// position) describes the widget exactly as of the subscription: every
    /// later change arrives on the receiver and none is in both.
    #[must_use]
    pub fn subscribe_with_snapshot(&self) -> (broadcast::Receiver<WidgetEvent>, Vec<WidgetEvent>) {
        let core = self.lock();
        // Events are published under this lock, so nothing slips in between.
        let rx = self.inner.events.subscribe();
        let snapshot = vec![
            WidgetEvent::History {
                html: render_history(&core.messages),
            },
            WidgetEvent::Submit {
                enabled: core.state.submit_enabled(),
            },
            WidgetEvent::Typing {
                visible: core.state.typing_visible(),
            },
            WidgetEvent::Scroll {
                after_ms: self.settle_ms(),
                scroll_top: core.viewport.scroll_top(),
            },
        ];
        (rx, snapshot)
    }

    /// Submit `raw` as a user message.
    ///
    /// Blank input and submissions while a response is pending are ignored.
    /// An accepted submission schedules the response on the Tokio timer, so
    /// this must be called from within a runtime.
    pub fn submit(&self, raw: &str) -> SubmitOutcome {
        let rejected = {
            let core = self.lock();
            check_submit(&core.state, raw).err()
        };
        if let Some(reason) = rejected {
            tracing::debug!(
                name: "widget.submit.ignored",
                widget_id = %self.inner.id,
                reason = reason.as_str(),
                "Submission ignored"
            );
            return SubmitOutcome::Ignored(reason);
        }

        match self.apply(Event::Submit(raw.to_string())).scheduled {
            Some(prompt) => {
                tracing::info!(
                    name: "widget.submit.accepted",
                    widget_id = %self.inner.id,
                    length = prompt.len(),
                    "Submission accepted"
                );
                self.schedule_response(prompt);
                SubmitOutcome::Accepted
            }
            // Another handle won the race between the check and the transition.
            None => SubmitOutcome::Ignored(IgnoreReason::AwaitingResponse),
        }
    }

    /// Deliver the response produced by the timer.
    ///
    /// Returns `false` if no response was pending.
    pub fn deliver_response(&self, text: impl Into<String>) -> bool {
        let delivered = self.apply(Event::ResponseDelivered(text.into())).accepted;
        if delivered {
            tracing::info!(
                name: "widget.response.delivered",
                widget_id = %self.inner.id,
                "Response delivered"
            );
        } else {
            tracing::warn!(
                name: "widget.response.ignored",
                widget_id = %self.inner.id,
                reason = IgnoreReason::NotAwaiting.as_str(),
                "Response arrived while idle"
            );
        }
        delivered
    }

    /// Snapshot of the widget state.
    #[must_use]
    pub fn state(&self) -> WidgetState {
        self.lock().state.clone()
    }

    #[must_use]
    pub fn messages(&self) -> Vec<Message> {
        self.lock().messages.clone()
    }

    #[must_use]
    pub fn message_count(&self) -> usize {
        self.lock().messages.len()
    }

    /// Snapshot of the history panel layout.
    #[must_use]
    pub fn viewport(&self) -> HistoryViewport {
        self.lock().viewport.clone()
    }

    /// Rendered markup of the whole history.
    #[must_use]
    pub fn render_history(&self) -> String {
        render_history(&self.lock().messages)
    }

    #[must_use]
    pub fn last_activity(&self) -> DateTime<Utc> {
        self.lock().last_activity
    }

    /// Whether the widget has been idle for longer than `timeout`.
    ///
    /// A widget with a pending response or a connected page never expires.
    #[must_use]
    pub fn is_expired_with_timeout(&self, timeout: Duration) -> bool {
        if self.inner.events.receiver_count() > 0 {
            return false;
        }
        let core = self.lock();
        if core.state.is_awaiting_response() {
            return false;
        }
        // A last activity in the future means clock skew; treat as fresh.
        (Utc::now() - core.last_activity)
            .to_std()
            .is_ok_and(|idle| idle > timeout)
    }

    fn lock(&self) -> MutexGuard<'_, WidgetCore> {
        self.inner
            .core
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn settle_ms(&self) -> u64 {
        u64::try_from(self.inner.settings.scroll_settle.as_millis()).unwrap_or(u64::MAX)
    }

    /// Run `event` through the state machine and carry out its effects.
    ///
    /// UI events are published while the core lock is held so that
    /// [`Self::subscribe_with_snapshot`] never sees a half-applied round.
    fn apply(&self, event: Event) -> Applied {
        let settle_ms = self.settle_ms();
        let mut applied = Applied::default();

        let mut core = self.lock();
        let (next, effects) = transition(&core.state, event);
        core.state = next;
        if effects.is_empty() {
            return applied;
        }
        applied.accepted = true;
        core.last_activity = Utc::now();

        for effect in effects {
            let outgoing = match effect {
                Effect::AppendMessage(message) => {
                    core.viewport.push(&message);
                    let bubble = WidgetEvent::Message {
                        origin: message.origin(),
                        html: render(&message),
                    };
                    core.messages.push(message);
                    bubble
                }
                Effect::ClearInput => WidgetEvent::Input {
                    value: String::new(),
                },
                Effect::SetSubmitEnabled(enabled) => WidgetEvent::Submit { enabled },
                Effect::SetTypingVisible(visible) => {
                    core.viewport.set_typing_visible(visible);
                    WidgetEvent::Typing { visible }
                }
                Effect::ScrollToLatest => WidgetEvent::Scroll {
                    after_ms: settle_ms,
                    scroll_top: core.viewport.scroll_to_latest(),
                },
                Effect::FocusInput => WidgetEvent::Focus,
                Effect::ScheduleResponse { prompt } => {
                    applied.scheduled = Some(prompt);
                    continue;
                }
            };
            // No subscribers is fine: the page may not be connected yet.
            let _ = self.inner.events.send(outgoing);
        }
        applied
    }

    fn schedule_response(&self, prompt: String) {
        let widget = self.clone();
        let provider = Arc::clone(&self.inner.provider);
        let delay = provider.delay();

        tracing::debug!(
            name: "widget.response.scheduled",
            widget_id = %self.inner.id,
            provider = provider.provider_name(),
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            "Response scheduled"
        );

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let reply = provider.respond(&prompt).await;
            widget.deliver_response(reply);
        });
    }
}
