//! Shared cited Q&A client library (config, HTTP query client, conversation state).
//! Used by the `cite-qa` one-shot binary and the terminal chat interface.

pub mod client;
pub mod config;
pub mod conversation;
pub mod logging;
pub mod messages;

pub use client::{Client, ClientError, UNKNOWN_ERROR};
pub use config::{default_config_path, ApiSection, Config, ConfigError, ConfigSource, LogSection};
pub use conversation::{Conversation, Focus, Message, PendingQuery, Transcript, ViewState};
pub use messages::{QueryCitation, QueryOutput};
