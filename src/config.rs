use clap::Parser;
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::Path;

use crate::transport::DEFAULT_CHAT_PATH;

/// Config file picked up from the working directory when none is given.
const DEFAULT_CONFIG_FILE: &str = "finbot.yaml";

const DEFAULT_WELCOME: &str = "Hello! I can fetch stock prices, calculate EMI/SIP, or provide general financial advice. Try an example below.";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Base URL of the FinBot server
    #[arg(long, env = "FINBOT_BASE_URL")]
    pub base_url: Option<String>,

    /// Path of the chat endpoint
    #[arg(long, env = "FINBOT_ENDPOINT_PATH")]
    pub endpoint: Option<String>,

    /// Give up on a request after this many seconds
    #[arg(long, env = "FINBOT_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub endpoint: EndpointConfig,
    pub widget: WidgetSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EndpointConfig {
    pub base_url: String,
    pub path: String,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Static content and initial state of the widget.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct WidgetSettings {
    /// Bot message shown before any interaction.
    #[serde(default = "default_welcome")]
    pub welcome: String,
    /// Prompts offered in the examples panel.
    #[serde(default = "default_examples")]
    pub examples: Vec<String>,
    /// Whether the examples panel starts open.
    #[serde(default)]
    pub examples_visible: bool,
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self {
            welcome: default_welcome(),
            examples: default_examples(),
            examples_visible: false,
        }
    }
}

fn default_welcome() -> String {
    DEFAULT_WELCOME.to_string()
}

fn default_examples() -> Vec<String> {
    [
        "What is the price of AAPL?",
        "Calculate EMI for 500000 at 8.5 for 20 years",
        "SIP of 5000 at 12 for 10 years",
        "How should I start investing with a small salary?",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let mut builder = Config::builder()
            .set_default("endpoint.base_url", "http://127.0.0.1:5001")?
            .set_default("endpoint.path", DEFAULT_CHAT_PATH)?
            .set_default("widget.welcome", DEFAULT_WELCOME)?
            .set_default("widget.examples_visible", false)?;

        // Explicit file must exist; the working-directory fallback is optional.
        if let Some(path) = &cli.config {
            builder = builder.add_source(File::with_name(path));
        } else if Path::new(DEFAULT_CONFIG_FILE).exists() {
            builder = builder.add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml));
        }

        // E.g. FINBOT_ENDPOINT__BASE_URL=http://finbot.internal
        builder = builder.add_source(
            Environment::with_prefix("FINBOT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        // Priority: CLI flag > CLI env var > FINBOT_ env > config file > defaults.
        if let Some(base_url) = cli.base_url {
            builder = builder.set_override("endpoint.base_url", base_url)?;
        }
        if let Some(path) = cli.endpoint {
            builder = builder.set_override("endpoint.path", path)?;
        }
        if let Some(secs) = cli.timeout_secs {
            builder = builder.set_override("endpoint.timeout_secs", secs)?;
        }

        let cfg = builder.build()?;
        cfg.try_deserialize()
    }
}
