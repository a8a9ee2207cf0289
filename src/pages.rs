//! Server-rendered page markup.

use crate::widget::{ChatWidget, escape_html};

/// Wrap page content in the application shell.
#[must_use]
pub fn html_shell(title: &str, content: &str) -> String {
    let title = escape_html(title);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta name="description" content="Career assistant chat">
    <title>{title}</title>
    <link rel="stylesheet" href="/static/app.css">
    <script defer src="/static/chat.js"></script>
</head>
<body>
    <main id="app" class="app">
        {content}
    </main>
</body>
</html>"#
    )
}

/// Chat widget markup bound to `widget`.
///
/// The element IDs are the contract with `static/chat.js`. The send button
/// starts disabled; the event stream's opening snapshot enables it.
#[must_use]
pub fn chat_content(widget: &ChatWidget) -> String {
    let session_id = escape_html(widget.id());
    let history = widget.render_history();
    let state = widget.state();
    let typing_style = if state.typing_visible() {
        "display: block"
    } else {
        "display: none"
    };

    format!(
        r#"
    <section class="chat-container" id="chatWidget" data-session-id="{session_id}">
        <header class="chat-header">
            <h1>Career Assistant</h1>
        </header>

        <div class="chat-panel" id="chatPanel" aria-live="polite" aria-label="Chat messages">
            <div class="chat-history" id="chatHistory">
{history}            </div>
            <div class="typing-indicator" id="typingIndicator" style="{typing_style}">
                <div class="message-bubble">
                    <span class="dot"></span><span class="dot"></span><span class="dot"></span>
                </div>
            </div>
        </div>

        <div class="chat-input">
            <div class="input-wrapper">
                <input type="text" id="messageInput" placeholder="Ask me about your career..." autocomplete="off">
            </div>
            <button type="button" id="sendButton" disabled>Send</button>
        </div>
    </section>
    "#
    )
}
