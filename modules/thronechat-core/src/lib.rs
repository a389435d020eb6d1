pub mod config;
pub mod events;
pub mod status;

pub use config::AppConfig;
pub use events::{ChatEvent, Command};
pub use status::{BotPhase, BotStatusSnapshot, SharedStatus};

/// Zero-width space prepended to every outbound chunk. Lines starting with
/// this marker are the bot's own prior output and must never be re-processed.
pub const ECHO_MARKER: char = '\u{200B}';
