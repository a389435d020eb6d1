//! Raw chat line → typed event.
//!
//! The bridge's poll drains its buffer atomically, so each physical line
//! passes through here exactly once; the normalizer itself is pure and keeps
//! no per-line state.

use std::str::FromStr;

use regex::Regex;

use drednot_client::ChatLine;
use thronechat_core::{ChatEvent, Command, ECHO_MARKER};

const JOIN_NOTICE: &str = "Joined ship '";

pub struct Normalizer {
    ship_code: Regex,
}

impl Normalizer {
    pub fn new() -> Self {
        Self {
            // Ship codes render as {ABC123} inside the join notice.
            ship_code: Regex::new(r"\{[A-Z0-9]+\}").expect("static pattern compiles"),
        }
    }

    /// Produce zero or one event for a line. Drops, in order: our own echoes
    /// (marker-tagged), non-chat lines, plain chat, and unknown commands.
    pub fn normalize(&self, line: &ChatLine) -> Option<ChatEvent> {
        let text = line.text.as_str();

        // Our own output always re-enters the DOM; the marker makes
        // rejecting it idempotent.
        if text.starts_with(ECHO_MARKER) {
            return None;
        }

        if text.contains(JOIN_NOTICE) {
            let ship_id = self.ship_code.find(text)?.as_str().to_string();
            return Some(ChatEvent::SystemJoin { ship_id });
        }

        let colon = text.find(':')?;
        let username = match &line.username {
            Some(name) => name.trim().to_string(),
            None => text[..colon].trim().to_string(),
        };
        if username.is_empty() {
            return None;
        }

        let message = text[colon + 1..].trim();
        let body = message.strip_prefix('!')?;

        let mut tokens = body.split_whitespace();
        let name = Command::from_str(&tokens.next()?.to_lowercase()).ok()?;
        let args = tokens.map(str::to_string).collect();

        Some(ChatEvent::Command {
            username,
            name,
            args,
        })
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}
