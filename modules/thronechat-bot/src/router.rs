//! Command → engine handler dispatch.
//!
//! One exhaustive match over the closed command vocabulary; a new command
//! variant fails compilation here until it gets a handler.

use thronechat_core::Command;
use thronechat_engine::{Choice, EngineReply, GameEngine};

/// Synchronous dispatch; the caller owns worker-pool admission and reply
/// delivery. Args are accepted but unused; no current command takes any.
pub fn dispatch(engine: &GameEngine, name: Command, username: &str) -> EngineReply {
    let mut rng = rand::rng();
    match name {
        Command::StartGame => engine.start_game(username, &mut rng),
        Command::EndGame => engine.end_game("You have abdicated the throne.", username),
        Command::Yes => engine.decide(Choice::Yes, username, &mut rng),
        Command::No => engine.decide(Choice::No, username, &mut rng),
        Command::Status => engine.status(),
        Command::Help => engine.help(),
    }
}
