//! Pure widget state machine.
//!
//! Every user or timer action becomes an [`Event`]. [`transition`] takes the
//! current [`WidgetState`] and an event and returns the next state together
//! with the [`Effect`]s the UI layer must carry out. Nothing in this module
//! touches the clock, the network or the page.
//!
//! ```text
//! Idle --Submit(non-empty)--> Awaiting --ResponseDelivered--> Idle
//! ```

use super::message::Message;

/// Widget state owned by a single chat widget.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WidgetState {
    is_awaiting_response: bool,
}

impl WidgetState {
    /// Fresh idle state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_awaiting_response(&self) -> bool {
        self.is_awaiting_response
    }

    /// Submission is only possible while idle.
    #[must_use]
    pub fn submit_enabled(&self) -> bool {
        !self.is_awaiting_response
    }

    /// The typing indicator is shown for exactly the awaiting period.
    #[must_use]
    pub fn typing_visible(&self) -> bool {
        self.is_awaiting_response
    }
}

/// Something that happened to the widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The user pressed send (or Enter) with the given raw text.
    Submit(String),
    /// The scheduled response arrived.
    ResponseDelivered(String),
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Render and append a message to the history.
    AppendMessage(Message),
    /// Empty the input field.
    ClearInput,
    /// Enable or disable the send control.
    SetSubmitEnabled(bool),
    /// Show or hide the typing indicator.
    SetTypingVisible(bool),
    /// Start the response timer for the given prompt.
    ScheduleResponse { prompt: String },
    /// Move the history view to its newest entry after the settle tick.
    ScrollToLatest,
    /// Return keyboard focus to the input field.
    FocusInput,
}

/// Why an event left the state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Input was empty or whitespace only.
    EmptyInput,
    /// A response is still pending.
    AwaitingResponse,
    /// A response arrived although none was pending.
    NotAwaiting,
}

impl IgnoreReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EmptyInput => "empty_input",
            Self::AwaitingResponse => "awaiting_response",
            Self::NotAwaiting => "not_awaiting",
        }
    }
}

/// Check whether `raw` would be accepted as a submission in `state`.
///
/// Returns the trimmed text on success.
pub fn check_submit<'a>(state: &WidgetState, raw: &'a str) -> Result<&'a str, IgnoreReason> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(IgnoreReason::EmptyInput);
    }
    if state.is_awaiting_response {
        return Err(IgnoreReason::AwaitingResponse);
    }
    Ok(text)
}

/// Apply `event` to `state`.
///
/// Rejected events return the unchanged state and no effects.
#[must_use]
pub fn transition(state: &WidgetState, event: Event) -> (WidgetState, Vec<Effect>) {
    match event {
        Event::Submit(raw) => {
            let Ok(text) = check_submit(state, &raw) else {
                return (state.clone(), Vec::new());
            };
            let text = text.to_string();
            let next = WidgetState {
                is_awaiting_response: true,
            };
            let effects = vec![
                Effect::AppendMessage(Message::user(text.clone())),
                Effect::ScrollToLatest,
                Effect::ClearInput,
                Effect::SetSubmitEnabled(false),
                Effect::SetTypingVisible(true),
                Effect::ScrollToLatest,
                Effect::ScheduleResponse { prompt: text },
            ];
            (next, effects)
        }
        Event::ResponseDelivered(text) => {
            if !state.is_awaiting_response {
                return (state.clone(), Vec::new());
            }
            let next = WidgetState {
                is_awaiting_response: false,
            };
            let effects = vec![
                Effect::SetTypingVisible(false),
                Effect::AppendMessage(Message::assistant(text)),
                Effect::ScrollToLatest,
                Effect::SetSubmitEnabled(true),
                Effect::FocusInput,
            ];
            (next, effects)
        }
    }
}
