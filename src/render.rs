//! HTML rendering for message elements.
//!
//! Mirrors the markup the chat page styles:
//!
//! ```html
//! <div class="message">
//!   <div class="avatar bot">FB</div>
//!   <div class="bubble bot">text<br>more text</div>
//!   <div class="meta">caption</div>
//! </div>
//! ```

use crate::message::{Message, Role};

/// Element id of the typing indicator.
pub const TYPING_INDICATOR_ID: &str = "typing-indicator";

/// Text shown inside the typing indicator bubble.
pub const TYPING_TEXT: &str = "Typing...";

/// Escape the five HTML-significant characters.
///
/// Every character is escaped exactly once, so `&amp;` becomes `&amp;amp;`.
#[must_use]
pub fn escape_html(unsafe_text: &str) -> String {
    let mut out = String::with_capacity(unsafe_text.len());
    for ch in unsafe_text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape text and turn newlines into `<br>`.
///
/// Escaping has to come first, otherwise the inserted break markup would be
/// escaped along with the text.
#[must_use]
pub fn render_text(text: &str) -> String {
    escape_html(text).replace('\n', "<br>")
}

/// Render a message element.
#[must_use]
pub fn message_html(message: &Message) -> String {
    element_html(message.role, &message.text, message.meta.as_deref(), None)
}

/// Render the typing indicator element.
#[must_use]
pub fn typing_indicator_html() -> String {
    element_html(Role::Bot, TYPING_TEXT, None, Some(TYPING_INDICATOR_ID))
}

fn element_html(role: Role, text: &str, meta: Option<&str>, id: Option<&str>) -> String {
    let class = role.css_class();
    let (id_attr, bubble_extra) = match id {
        Some(id) => (format!(r#" id="{id}""#), " typing"),
        None => (String::new(), ""),
    };
    let meta_html = meta
        .filter(|m| !m.is_empty())
        .map(|m| format!(r#"<div class="meta">{}</div>"#, escape_html(m)))
        .unwrap_or_default();

    format!(
        r#"<div class="message"{id_attr}><div class="avatar {class}">{avatar}</div><div class="bubble {class}{bubble_extra}">{body}</div>{meta_html}</div>"#,
        avatar = role.avatar_label(),
        body = render_text(text),
    )
}
