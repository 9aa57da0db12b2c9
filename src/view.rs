//! View seam between the controller and whatever displays the chat.
//!
//! [`ChatView`] is the set of element operations the controller needs. The
//! browser page implements it over the DOM; [`HtmlView`] keeps the same state
//! in memory and renders it to markup, which is what the tests and any
//! server-side rendering use.

use crate::message::Message;
use crate::render::{message_html, typing_indicator_html};

/// Element operations the chat controller performs.
pub trait ChatView: Send {
    /// Append a message to the end of the list.
    fn append_message(&mut self, message: &Message);

    /// Show the typing indicator. No-op when it is already shown.
    fn show_typing(&mut self);

    /// Remove the typing indicator. No-op when it is absent.
    fn hide_typing(&mut self);

    /// Remove every element from the message list, the typing indicator included.
    fn clear_messages(&mut self);

    /// Current value of the input field.
    fn input_value(&self) -> String;

    /// Replace the value of the input field.
    fn set_input_value(&mut self, value: &str);

    /// Move keyboard focus to the input field.
    fn focus_input(&mut self);

    /// Show or hide the example prompts panel.
    fn set_examples_visible(&mut self, visible: bool);
}

#[derive(Debug, Clone)]
enum Node {
    Message { message: Message, html: String },
    Typing { html: String },
}

impl Node {
    fn html(&self) -> &str {
        match self {
            Self::Message { html, .. } | Self::Typing { html } => html,
        }
    }
}

/// In-memory view holding the rendered message list.
#[derive(Debug, Clone, Default)]
pub struct HtmlView {
    nodes: Vec<Node>,
    input: String,
    input_focused: bool,
    examples_visible: bool,
}

impl HtmlView {
    /// Create an empty view.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages in display order, typing indicator excluded.
    pub fn messages(&self) -> Vec<&Message> {
        self.nodes
            .iter()
            .filter_map(|node| match node {
                Node::Message { message, .. } => Some(message),
                Node::Typing { .. } => None,
            })
            .collect()
    }

    /// Number of messages, typing indicator excluded.
    pub fn message_count(&self) -> usize {
        self.messages().len()
    }

    /// The most recently appended message.
    pub fn last_message(&self) -> Option<&Message> {
        self.messages().pop()
    }

    /// Whether the typing indicator is currently in the list.
    pub fn has_typing_indicator(&self) -> bool {
        self.nodes.iter().any(|node| matches!(node, Node::Typing { .. }))
    }

    /// Whether the input field has focus.
    pub fn input_focused(&self) -> bool {
        self.input_focused
    }

    /// Whether the example prompts panel is shown.
    pub fn examples_visible(&self) -> bool {
        self.examples_visible
    }

    /// Markup of the whole message list.
    pub fn to_html(&self) -> String {
        self.nodes.iter().map(Node::html).collect()
    }
}

impl ChatView for HtmlView {
    fn append_message(&mut self, message: &Message) {
        self.nodes.push(Node::Message {
            html: message_html(message),
            message: message.clone(),
        });
    }

    fn show_typing(&mut self) {
        if !self.has_typing_indicator() {
            self.nodes.push(Node::Typing {
                html: typing_indicator_html(),
            });
        }
    }

    fn hide_typing(&mut self) {
        self.nodes.retain(|node| !matches!(node, Node::Typing { .. }));
    }

    fn clear_messages(&mut self) {
        self.nodes.clear();
    }

    fn input_value(&self) -> String {
        self.input.clone()
    }

    fn set_input_value(&mut self, value: &str) {
        value.clone_into(&mut self.input);
    }

    fn focus_input(&mut self) {
        self.input_focused = true;
    }

    fn set_examples_visible(&mut self, visible: bool) {
        self.examples_visible = visible;
    }
}
