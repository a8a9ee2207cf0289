//! HTML rendering of chat bubbles.

use std::fmt::Write as _;

use super::message::Message;

/// Escape text for insertion into HTML element content or attribute values.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Render a message as a chat bubble.
///
/// # Example
///
/// ```rust
/// use canned_chat::widget::{Message, render};
///
/// let html = render(&Message::user("<b>hi</b>"));
/// assert!(html.contains("&lt;b&gt;hi&lt;/b&gt;"));
/// ```
#[must_use]
pub fn render(message: &Message) -> String {
    format!(
        r#"<div class="message {}"><div class="message-bubble"><p>{}</p></div></div>"#,
        message.origin().css_class(),
        escape_html(message.text())
    )
}

/// Render a full history in display order.
#[must_use]
pub fn render_history(messages: &[Message]) -> String {
    messages.iter().fold(String::new(), |mut out, message| {
        let _ = writeln!(out, "{}", render(message));
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_tag_is_literal_text() {
        let html = render(&Message::user("<script>alert('x')</script>"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
    }

    #[test]
    fn test_bubble_classes_follow_origin() {
        assert!(render(&Message::user("a")).starts_with(r#"<div class="message user-message">"#));
        assert!(render(&Message::assistant("b")).starts_with(r#"<div class="message ai-message">"#));
    }

    #[test]
    fn test_escape_covers_attribute_quotes() {
        assert_eq!(escape_html(r#"a & "b""#), "a &amp; &quot;b&quot;");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_history_keeps_order() {
        let html = render_history(&[Message::user("first"), Message::assistant("second")]);
        let first = html.find("first").unwrap();
        let second = html.find("second").unwrap();
        assert!(first < second);
        assert_eq!(html.lines().count(), 2);
    }
}
