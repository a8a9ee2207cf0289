//! Layout model of the scrollable history panel.
//!
//! The browser owns the real geometry; this model mirrors it closely enough
//! to keep the scroll invariant observable and testable on the server: after
//! every append, `scroll_top` equals [`HistoryViewport::max_scroll_offset`].

use super::message::Message;

/// Characters that fit on one rendered line of a bubble.
const CHARS_PER_LINE: usize = 48;
/// Pixel height of one text line.
const LINE_HEIGHT: u32 = 20;
/// Vertical padding and margin around each bubble.
const BUBBLE_CHROME: u32 = 28;
/// Height reserved for the typing indicator when visible.
const TYPING_INDICATOR_HEIGHT: u32 = 36;

/// Scroll state of the history panel, in pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryViewport {
    viewport_height: u32,
    content_height: u32,
    typing_visible: bool,
    scroll_top: u32,
}

impl HistoryViewport {
    /// Create an empty viewport of the given visible height.
    #[must_use]
    pub fn new(viewport_height: u32) -> Self {
        Self {
            viewport_height,
            content_height: 0,
            typing_visible: false,
            scroll_top: 0,
        }
    }

    /// Estimated rendered height of a bubble.
    #[must_use]
    pub fn bubble_height(message: &Message) -> u32 {
        let lines: usize = message
            .text()
            .lines()
            .map(|line| line.chars().count().div_ceil(CHARS_PER_LINE).max(1))
            .sum::<usize>()
            .max(1);
        u32::try_from(lines)
            .unwrap_or(u32::MAX)
            .saturating_mul(LINE_HEIGHT)
            .saturating_add(BUBBLE_CHROME)
    }

    /// Account for a newly appended bubble.
    pub fn push(&mut self, message: &Message) {
        self.content_height = self
            .content_height
            .saturating_add(Self::bubble_height(message));
    }

    pub fn set_typing_visible(&mut self, visible: bool) {
        self.typing_visible = visible;
        // Hiding the indicator can shrink the content below the current offset.
        self.scroll_top = self.scroll_top.min(self.max_scroll_offset());
    }

    /// Total scrollable height, including the typing indicator.
    #[must_use]
    pub fn scroll_height(&self) -> u32 {
        if self.typing_visible {
            self.content_height.saturating_add(TYPING_INDICATOR_HEIGHT)
        } else {
            self.content_height
        }
    }

    #[must_use]
    pub fn max_scroll_offset(&self) -> u32 {
        self.scroll_height().saturating_sub(self.viewport_height)
    }

    #[must_use]
    pub fn scroll_top(&self) -> u32 {
        self.scroll_top
    }

    /// Move the view so the newest entry is visible.
    pub fn scroll_to_latest(&mut self) -> u32 {
        self.scroll_top = self.max_scroll_offset();
        self.scroll_top
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_history_does_not_scroll() {
        let mut view = HistoryViewport::new(400);
        view.push(&Message::user("hi"));
        assert_eq!(view.scroll_to_latest(), 0);
    }

    #[test]
    fn test_scroll_reaches_bottom_after_each_push() {
        let mut view = HistoryViewport::new(100);
        for i in 0..10 {
            view.push(&Message::user(format!("message {i}")));
            view.scroll_to_latest();
            assert_eq!(view.scroll_top(), view.max_scroll_offset());
        }
        assert!(view.scroll_top() > 0);
    }

    #[test]
    fn test_long_text_wraps_to_more_lines() {
        let short = HistoryViewport::bubble_height(&Message::user("x"));
        let long = HistoryViewport::bubble_height(&Message::user("x".repeat(CHARS_PER_LINE * 3)));
        assert_eq!(long - short, 2 * LINE_HEIGHT);
    }

    #[test]
    fn test_typing_indicator_adds_height() {
        let mut view = HistoryViewport::new(0);
        view.push(&Message::user("hi"));
        let before = view.scroll_height();
        view.set_typing_visible(true);
        assert_eq!(view.scroll_height(), before + TYPING_INDICATOR_HEIGHT);
        view.scroll_to_latest();
        view.set_typing_visible(false);
        assert_eq!(view.scroll_top(), view.max_scroll_offset());
    }
}
