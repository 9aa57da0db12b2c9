//! The chat widget controller.
//!
//! [`ChatWidget`] turns user intent (form submits, key presses, button clicks)
//! into view updates and one outbound request per submission. It owns its
//! view and transport; nothing is looked up ambiently.
//!
//! # Overlapping submissions
//!
//! Submissions are queued. Each one holds a FIFO gate from the moment its user
//! message is appended until its reply is appended, so the transcript always
//! reads user/bot pairs in submission order. The view stays usable while a
//! request is pending: clearing or picking an example does not wait for the
//! gate, and clearing never cancels the request.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::config::WidgetSettings;
use crate::message::Message;
use crate::transport::{ChatReply, ChatTransport, TransportError};
use crate::view::ChatView;

/// Shown when a successful reply carries neither text nor an error.
pub const NO_RESPONSE_TEXT: &str = "No response from server.";

/// Map the outcome of a request to the bot message text.
#[must_use]
pub fn reply_text(outcome: &Result<ChatReply, TransportError>) -> String {
    match outcome {
        Ok(ChatReply {
            response: Some(text),
            ..
        }) => text.clone(),
        Ok(ChatReply {
            error: Some(error), ..
        }) => format!("Error: {error}"),
        Ok(_) => NO_RESPONSE_TEXT.to_string(),
        Err(err) => format!("Network or server error: {err}"),
    }
}

#[derive(Debug)]
struct ViewState<V> {
    view: V,
    examples_visible: bool,
}

/// Chat widget controller.
#[derive(Debug)]
pub struct ChatWidget<V, T> {
    state: Mutex<ViewState<V>>,
    transport: T,
    examples: Vec<String>,
    /// Held for the duration of one submission.
    turn: tokio::sync::Mutex<()>,
}

impl<V: ChatView, T: ChatTransport> ChatWidget<V, T> {
    /// Build the widget and append the welcome message.
    pub fn new(mut view: V, transport: T, settings: &WidgetSettings) -> Self {
        view.set_examples_visible(settings.examples_visible);
        view.append_message(&Message::bot(settings.welcome.as_str()));

        Self {
            state: Mutex::new(ViewState {
                view,
                examples_visible: settings.examples_visible,
            }),
            transport,
            examples: settings.examples.clone(),
            turn: tokio::sync::Mutex::new(()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ViewState<V>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` against the current view.
    pub fn with_view<R>(&self, f: impl FnOnce(&V) -> R) -> R {
        f(&self.lock().view)
    }

    /// Example prompts offered by the widget.
    pub fn examples(&self) -> &[String] {
        &self.examples
    }

    /// Whether the examples panel is currently shown.
    pub fn examples_visible(&self) -> bool {
        self.lock().examples_visible
    }

    /// Send `text` as one submission.
    ///
    /// Whitespace-only input is ignored and returns `None`. Otherwise the bot
    /// message appended for this submission is returned.
    pub async fn submit(&self, text: &str) -> Option<Message> {
        let text = text.trim();
        if text.is_empty() {
            debug!(name: "chat.submit.ignored", "Ignoring empty submission");
            return None;
        }

        // The input has been consumed even if an earlier submission is pending.
        self.lock().view.set_input_value("");

        let _turn = self.turn.lock().await;
        {
            let mut state = self.lock();
            state.view.append_message(&Message::user(text));
            state.view.show_typing();
        }

        info!(name: "chat.submit", chars = text.len(), "Submitting chat message");
        let outcome = self.transport.send(text).await;
        match &outcome {
            Ok(reply) => debug!(
                name: "chat.reply",
                has_response = reply.response.is_some(),
                has_error = reply.error.is_some(),
                "Chat reply received"
            ),
            Err(err) => warn!(name: "chat.failed", error = %err, "Chat request failed"),
        }

        let reply = Message::bot(reply_text(&outcome));
        {
            let mut state = self.lock();
            state.view.hide_typing();
            state.view.append_message(&reply);
        }
        Some(reply)
    }

    /// Input handler: the user edited the input field.
    pub fn on_input(&self, value: &str) {
        self.lock().view.set_input_value(value);
    }

    /// Form submit handler: send whatever is in the input field.
    pub async fn on_form_submit(&self) -> Option<Message> {
        let text = self.lock().view.input_value();
        self.submit(&text).await
    }

    /// Key handler for the input field.
    ///
    /// Enter submits the form; Shift+Enter is left to insert a newline.
    /// Returns `true` when the key's default action should be suppressed.
    pub async fn on_input_key(&self, key: &str, shift: bool) -> bool {
        if key == "Enter" && !shift {
            self.on_form_submit().await;
            true
        } else {
            false
        }
    }

    /// Remove every rendered message.
    pub fn clear(&self) {
        self.lock().view.clear_messages();
        info!(name: "chat.cleared", "Chat cleared");
    }

    /// Show or hide the examples panel, returning the new visibility.
    pub fn toggle_examples(&self) -> bool {
        let mut state = self.lock();
        state.examples_visible = !state.examples_visible;
        let visible = state.examples_visible;
        state.view.set_examples_visible(visible);
        visible
    }

    /// Put example `index` into the input field and focus it.
    ///
    /// Returns `false` when there is no such example.
    pub fn choose_example(&self, index: usize) -> bool {
        let Some(example) = self.examples.get(index) else {
            return false;
        };
        let mut state = self.lock();
        state.view.set_input_value(example.trim());
        state.view.focus_input();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::HtmlView;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::time::Duration;
    use tokio::sync::oneshot;

    /// Replays canned outcomes and records what was sent.
    #[derive(Default)]
    struct ScriptedTransport {
        outcomes: Mutex<VecDeque<Result<ChatReply, TransportError>>>,
        sent: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        fn with(outcome: Result<ChatReply, TransportError>) -> Self {
            let transport = Self::default();
            transport.outcomes.lock().unwrap().push_back(outcome);
            transport
        }
    }

    #[async_trait]
    impl ChatTransport for ScriptedTransport {
        async fn send(&self, message: &str) -> Result<ChatReply, TransportError> {
            self.sent.lock().unwrap().push(message.to_string());
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(ChatReply::default()))
        }
    }

    /// Waits for the test to hand over the reply.
    struct PendingTransport {
        reply: tokio::sync::Mutex<Option<oneshot::Receiver<ChatReply>>>,
    }

    #[async_trait]
    impl ChatTransport for PendingTransport {
        async fn send(&self, _message: &str) -> Result<ChatReply, TransportError> {
            let rx = self.reply.lock().await.take().expect("sent twice");
            rx.await
                .map_err(|_closed| TransportError::Status { status: 503 })
        }
    }

    /// Replies to "slow" after 100ms and to anything else after 10ms.
    struct DelayedTransport;

    #[async_trait]
    impl ChatTransport for DelayedTransport {
        async fn send(&self, message: &str) -> Result<ChatReply, TransportError> {
            let delay = if message == "slow" { 100 } else { 10 };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(ChatReply::response(format!("re: {message}")))
        }
    }

    fn widget<T: ChatTransport>(transport: T) -> ChatWidget<HtmlView, T> {
        ChatWidget::new(HtmlView::new(), transport, &WidgetSettings::default())
    }

    fn texts<T: ChatTransport>(widget: &ChatWidget<HtmlView, T>) -> Vec<String> {
        widget.with_view(|v| v.messages().iter().map(|m| m.text.clone()).collect())
    }

    #[test]
    fn test_reply_text_branches() {
        assert_eq!(reply_text(&Ok(ChatReply::response("$150"))), "$150");
        assert_eq!(
            reply_text(&Ok(ChatReply::error("invalid input"))),
            "Error: invalid input"
        );
        assert_eq!(reply_text(&Ok(ChatReply::default())), NO_RESPONSE_TEXT);
        assert_eq!(
            reply_text(&Err(TransportError::Status { status: 500 })),
            "Network or server error: Server error 500"
        );
    }

    #[test]
    fn test_response_wins_over_error() {
        let reply = ChatReply {
            response: Some("ok".into()),
            error: Some("ignored".into()),
        };
        assert_eq!(reply_text(&Ok(reply)), "ok");
    }

    #[test]
    fn test_welcome_message_on_construction() {
        let widget = widget(ScriptedTransport::default());
        let messages = widget.with_view(|v| v.messages().into_iter().cloned().collect::<Vec<_>>());
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0], Message::bot(WidgetSettings::default().welcome));
    }

    #[tokio::test]
    async fn test_submit_appends_user_then_bot() {
        let widget = widget(ScriptedTransport::with(Ok(ChatReply::response("$150"))));
        widget.clear();

        let reply = widget.submit("  AAPL price?  ").await;

        assert_eq!(reply, Some(Message::bot("$150")));
        let messages = widget.with_view(|v| v.messages().into_iter().cloned().collect::<Vec<_>>());
        assert_eq!(messages, vec![Message::user("AAPL price?"), Message::bot("$150")]);
        assert_eq!(*widget.transport.sent.lock().unwrap(), vec!["AAPL price?"]);
        assert!(!widget.with_view(HtmlView::has_typing_indicator));
    }

    #[tokio::test]
    async fn test_blank_submit_is_a_no_op() {
        let widget = widget(ScriptedTransport::default());
        for input in ["", "  ", "\n\t "] {
            assert!(widget.submit(input).await.is_none());
        }
        assert_eq!(widget.with_view(HtmlView::message_count), 1);
        assert!(widget.transport.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failure_is_reported_as_bot_message() {
        let widget = widget(ScriptedTransport::with(Err(TransportError::Status {
            status: 500,
        })));
        widget.submit("hello").await;
        assert_eq!(
            texts(&widget).last().unwrap(),
            "Network or server error: Server error 500"
        );
        assert!(!widget.with_view(HtmlView::has_typing_indicator));
    }

    #[tokio::test]
    async fn test_indicator_shown_while_pending() {
        let (tx, rx) = oneshot::channel();
        let widget = widget(PendingTransport {
            reply: tokio::sync::Mutex::new(Some(rx)),
        });

        let ((), reply) = tokio::join!(
            async {
                tokio::task::yield_now().await;
                widget.with_view(|v| {
                    assert!(v.has_typing_indicator());
                    assert_eq!(v.to_html().matches("typing-indicator").count(), 1);
                    assert_eq!(v.last_message().unwrap(), &Message::user("hi"));
                });
                tx.send(ChatReply::response("hello")).unwrap();
            },
            widget.submit("hi"),
        );

        assert_eq!(reply, Some(Message::bot("hello")));
        assert!(!widget.with_view(HtmlView::has_typing_indicator));
    }

    #[tokio::test]
    async fn test_clear_does_not_cancel_pending_request() {
        let (tx, rx) = oneshot::channel();
        let widget = widget(PendingTransport {
            reply: tokio::sync::Mutex::new(Some(rx)),
        });

        tokio::join!(widget.submit("hi"), async {
            tokio::task::yield_now().await;
            widget.clear();
            assert_eq!(widget.with_view(HtmlView::message_count), 0);
            tx.send(ChatReply::response("still here")).unwrap();
        });

        assert_eq!(texts(&widget), vec!["still here"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_submissions_are_queued() {
        let widget = widget(DelayedTransport);
        widget.clear();

        tokio::join!(widget.submit("slow"), widget.submit("fast"));

        assert_eq!(
            texts(&widget),
            vec!["slow", "re: slow", "fast", "re: fast"]
        );
    }

    #[tokio::test]
    async fn test_clear_after_three_messages() {
        let widget = widget(ScriptedTransport::with(Ok(ChatReply::response("hi"))));
        widget.submit("hello").await;
        assert_eq!(widget.with_view(HtmlView::message_count), 3);

        widget.clear();
        assert_eq!(widget.with_view(HtmlView::message_count), 0);
    }

    #[tokio::test]
    async fn test_form_submit_reads_and_clears_input() {
        let widget = widget(ScriptedTransport::with(Ok(ChatReply::response("ok"))));
        assert!(widget.choose_example(0));
        assert!(widget.with_view(HtmlView::input_focused));
        assert_eq!(widget.transport.sent.lock().unwrap().len(), 0);

        widget.on_form_submit().await;

        assert_eq!(
            *widget.transport.sent.lock().unwrap(),
            vec!["What is the price of AAPL?"]
        );
        assert!(widget.with_view(ChatView::input_value).is_empty());
    }

    #[tokio::test]
    async fn test_enter_submits_but_shift_enter_does_not() {
        let widget = widget(ScriptedTransport::with(Ok(ChatReply::response("ok"))));
        widget.on_input("line one");

        assert!(!widget.on_input_key("Enter", true).await);
        assert!(!widget.on_input_key("a", false).await);
        assert!(widget.transport.sent.lock().unwrap().is_empty());

        assert!(widget.on_input_key("Enter", false).await);
        assert_eq!(*widget.transport.sent.lock().unwrap(), vec!["line one"]);
    }

    #[test]
    fn test_toggle_examples() {
        let widget = widget(ScriptedTransport::default());
        assert!(!widget.examples_visible());
        assert!(widget.toggle_examples());
        assert!(widget.with_view(HtmlView::examples_visible));
        assert!(!widget.toggle_examples());
        assert!(!widget.with_view(HtmlView::examples_visible));
    }

    #[test]
    fn test_choose_missing_example() {
        let widget = widget(ScriptedTransport::default());
        assert!(!widget.choose_example(99));
        assert!(widget.with_view(ChatView::input_value).is_empty());
        assert!(!widget.with_view(HtmlView::input_focused));
    }
}
