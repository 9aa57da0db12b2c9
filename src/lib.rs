//! FinBot chat widget
//!
//! Controller for the FinBot chat widget: renders messages, posts user input to
//! the chat endpoint and displays the returned text.
//!
//! # Architecture
//!
//! - **Controller**: [`ChatWidget`] owns a view and a transport and exposes one
//!   named method per user action
//! - **View**: [`ChatView`] abstracts the message list, input field and examples
//!   panel; [`HtmlView`] keeps them in memory as rendered markup
//! - **Transport**: [`ChatTransport`] sends one message; [`HttpTransport`] posts
//!   JSON to the FinBot server
//!
//! # Modules
//!
//! - [`config`]: Layered configuration (defaults, file, env, CLI)
//! - [`controller`]: The chat widget controller
//! - [`message`]: Message data model
//! - [`render`]: HTML escaping and message markup
//! - [`transport`]: Chat endpoint client
//! - [`view`]: View trait and in-memory HTML view
//!
//! # Example
//!
//! ```rust,no_run
//! use finbot_chat::{ChatWidget, HtmlView, HttpTransport, WidgetSettings};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = HttpTransport::new("http://127.0.0.1:5001", "/api/chat")?;
//! let widget = ChatWidget::new(HtmlView::new(), transport, &WidgetSettings::default());
//!
//! widget.submit("What is the price of AAPL?").await;
//! println!("{}", widget.with_view(HtmlView::to_html));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod controller;
pub mod message;
pub mod render;
pub mod transport;
pub mod view;

pub use config::{AppConfig, WidgetSettings};
pub use controller::ChatWidget;
pub use message::{Message, Role};
pub use transport::{ChatReply, ChatTransport, HttpTransport, TransportError};
pub use view::{ChatView, HtmlView};
