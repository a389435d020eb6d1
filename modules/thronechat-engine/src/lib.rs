//! The turn-based kingdom game: petitions drawn from a shuffled deck,
//! yes/no decisions with weighted outcomes, timed resource modifiers, and
//! three ways for a reign to end.
//!
//! Everything here is synchronous and lock-internal; the async shell calls
//! in, gets reply lines back, and owns all scheduling and I/O.

pub mod card;
pub mod catalog;
pub mod deck;
pub mod engine;
pub mod state;

pub use card::{Branch, EventCard, ModifierTemplate, Outcome};
pub use deck::EventDeck;
pub use engine::{Choice, EngineReply, GameEngine};
pub use state::{Effects, GameState, Modifier};
