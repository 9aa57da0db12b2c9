//! FinBot chat terminal front end
//!
//! Drives the chat widget from standard input against a running FinBot server.

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::time::Duration;

use dotenvy::dotenv;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use finbot_chat::{AppConfig, ChatView, ChatWidget, HttpTransport, Message, Role};

/// Prints the chat as it changes.
#[derive(Debug)]
struct TerminalView {
    examples: Vec<String>,
    input: String,
}

impl TerminalView {
    fn new(examples: Vec<String>) -> Self {
        Self {
            examples,
            input: String::new(),
        }
    }
}

impl ChatView for TerminalView {
    fn append_message(&mut self, message: &Message) {
        let label = match message.role {
            Role::User => "You",
            Role::Bot => "FinBot",
        };
        println!("{label}: {}", message.text);
        if let Some(meta) = &message.meta {
            println!("  ({meta})");
        }
    }

    fn show_typing(&mut self) {
        println!("FinBot is typing...");
    }

    // Printed lines cannot be taken back.
    fn hide_typing(&mut self) {}

    fn clear_messages(&mut self) {
        println!("--- chat cleared ---");
    }

    fn input_value(&self) -> String {
        self.input.clone()
    }

    fn set_input_value(&mut self, value: &str) {
        value.clone_into(&mut self.input);
    }

    fn focus_input(&mut self) {
        println!("> {}  (press Enter to send)", self.input);
    }

    fn set_examples_visible(&mut self, visible: bool) {
        if visible {
            println!("Examples (use /example N):");
            for (n, example) in self.examples.iter().enumerate() {
                println!("  {}. {example}", n + 1);
            }
        }
    }
}

/// One line of terminal input.
#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Quit,
    Clear,
    Examples,
    Example(Option<usize>),
    Send(&'a str),
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Self {
        let trimmed = line.trim();
        match trimmed {
            "/quit" | "/exit" => Self::Quit,
            "/clear" => Self::Clear,
            "/examples" => Self::Examples,
            "/example" => Self::Example(None),
            _ => match trimmed.strip_prefix("/example ") {
                Some(n) => Self::Example(
                    n.trim()
                        .parse::<usize>()
                        .ok()
                        .and_then(|n| n.checked_sub(1)),
                ),
                None => Self::Send(line),
            },
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present) before reading RUST_LOG
    let _ = dotenv();

    // Initialize tracing (M-LOG-STRUCTURED); stdout is reserved for the chat
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load()?;

    info!(
        name: "config.loaded",
        base_url = %config.endpoint.base_url,
        path = %config.endpoint.path,
        timeout_secs = ?config.endpoint.timeout_secs,
        "Configuration loaded"
    );

    let transport = match config.endpoint.timeout_secs {
        Some(secs) => HttpTransport::with_timeout(
            &config.endpoint.base_url,
            &config.endpoint.path,
            Duration::from_secs(secs),
        )?,
        None => HttpTransport::new(&config.endpoint.base_url, &config.endpoint.path)?,
    };

    let view = TerminalView::new(config.widget.examples.clone());
    let widget = ChatWidget::new(view, transport, &config.widget);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match Command::parse(&line) {
            Command::Quit => break,
            Command::Clear => widget.clear(),
            Command::Examples => {
                widget.toggle_examples();
            }
            Command::Example(index) => {
                if !index.is_some_and(|i| widget.choose_example(i)) {
                    eprintln!("No such example; /examples lists them.");
                }
            }
            Command::Send(text) => {
                // A blank line sends whatever is already in the input field.
                if !text.trim().is_empty() {
                    widget.on_input(text);
                }
                widget.on_form_submit().await;
            }
        }
    }

    Ok(())
}
