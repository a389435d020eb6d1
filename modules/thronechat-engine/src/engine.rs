//! The game state machine. Idle → Active/AwaitingDecision → Active/Resolved
//! → next turn, or → Idle on termination.
//!
//! Every mutating entry point runs under one mutex acquisition; the
//! `awaiting_decision` flag, read and cleared inside that span, is the sole
//! guard against two concurrent `decide` calls resolving the same petition.

use std::sync::{Mutex, MutexGuard};

use rand::Rng;
use tracing::{info, warn};

use crate::card::{Branch, EventCard};
use crate::deck::EventDeck;
use crate::state::{GameState, Modifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Yes,
    No,
}

/// What a handler produced: reply lines for chat, and whether the caller
/// should schedule the next delayed turn advance. The engine never sleeps.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct EngineReply {
    pub lines: Vec<String>,
    pub schedule_next_turn: bool,
}

impl EngineReply {
    /// Game-logic no-op: nothing to say, nothing to schedule.
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn say(lines: Vec<String>) -> Self {
        Self {
            lines,
            schedule_next_turn: false,
        }
    }

    pub fn say_and_schedule(lines: Vec<String>) -> Self {
        Self {
            lines,
            schedule_next_turn: true,
        }
    }

    pub fn is_silent(&self) -> bool {
        self.lines.is_empty()
    }
}

struct Locked {
    state: GameState,
    deck: EventDeck,
}

/// The engine service: owns the single game state and the deck behind one
/// lock, plus the immutable card catalog.
pub struct GameEngine {
    cards: &'static [EventCard],
    inner: Mutex<Locked>,
}

impl GameEngine {
    pub fn new(cards: &'static [EventCard]) -> Self {
        for card in cards {
            if !card.is_well_formed() {
                // A malformed weighted table degrades to first-outcome
                // fallback at draw time; complain loudly but keep running.
                warn!(petitioner = card.petitioner, "card has a malformed outcome table");
                debug_assert!(false, "malformed card: {}", card.petitioner);
            }
        }
        Self {
            cards,
            inner: Mutex::new(Locked {
                state: GameState::idle(),
                deck: EventDeck::new(cards.len()),
            }),
        }
    }

    /// Drop any in-progress game, as on a supervised session restart.
    pub fn reset(&self) {
        let mut g = self.lock();
        g.state = GameState::idle();
        g.deck = EventDeck::new(self.cards.len());
    }

    pub fn start_game(&self, user: &str, rng: &mut impl Rng) -> EngineReply {
        let mut g = self.lock();
        if g.state.active {
            return EngineReply::say(vec![
                "A game is already in progress. Use !endgame to stop it.".to_string(),
            ]);
        }
        g.state = GameState::new_reign();
        g.deck.reshuffle(rng);
        info!(user, "New game started");
        EngineReply::say_and_schedule(vec![
            "A new reign begins! Rule your kingdom with wisdom.".to_string(),
            "Commands: !yes, !no, !status, !help, !endgame".to_string(),
        ])
    }

    /// One turn: modifier upkeep, termination check, then a fresh petition.
    /// Invoked by the scheduler after the post-decision delay.
    pub fn advance_turn(&self, rng: &mut impl Rng) -> EngineReply {
        let mut g = self.lock();
        if !g.state.active || g.state.awaiting_decision {
            return EngineReply::silent();
        }

        let mut lines = Vec::new();
        let upkeep = g.state.tick_modifiers();
        if !upkeep.is_empty() {
            lines.push(format!("Daily upkeep: {upkeep}"));
        }

        if let Some(reason) = g.state.termination_reason() {
            lines.extend(finish(&mut g.state, reason));
            return EngineReply::say(lines);
        }

        g.state.day += 1;
        let idx = g.deck.draw(rng);
        g.state.current_card = Some(idx);
        g.state.awaiting_decision = true;

        let card = &self.cards[idx];
        lines.push(format!("--- Day {} ---", g.state.day));
        lines.push(format!("{} wants to talk.", card.petitioner));
        lines.push(format!("\"{}\"", card.prompt));
        lines.push("What do you say? (!yes / !no)".to_string());
        EngineReply::say(lines)
    }

    pub fn decide(&self, choice: Choice, user: &str, rng: &mut impl Rng) -> EngineReply {
        let mut g = self.lock();
        if !g.state.active || !g.state.awaiting_decision {
            return EngineReply::silent();
        }
        g.state.awaiting_decision = false;
        // awaiting_decision implies a drawn card; treat a desync as idle.
        let Some(idx) = g.state.current_card.take() else {
            return EngineReply::silent();
        };
        let card = &self.cards[idx];

        let branch = match choice {
            Choice::Yes => &card.on_yes,
            Choice::No => &card.on_no,
        };
        let outcome = branch.pick(rng);
        g.state.apply(&outcome.effects);

        let mut lines = vec![format!("{}, {}", user, outcome.text)];
        if !outcome.effects.is_empty() {
            lines.push(outcome.effects.to_string());
        }
        if let Some(template) = outcome.modifier {
            g.state.modifiers.push(Modifier {
                source: template.source,
                remaining_days: template.days,
                effects: template.effects,
            });
            lines.push(format!(
                "A lasting effect takes hold: {} ({} each day, {} days).",
                template.source, template.effects, template.days
            ));
        }

        if let Some(reason) = g.state.termination_reason() {
            lines.extend(finish(&mut g.state, reason));
            return EngineReply::say(lines);
        }
        EngineReply::say_and_schedule(lines)
    }

    pub fn end_game(&self, reason: &str, user: &str) -> EngineReply {
        let mut g = self.lock();
        if !g.state.active {
            return EngineReply::silent();
        }
        info!(user, reason, "Game ended");
        EngineReply::say(finish(&mut g.state, reason))
    }

    pub fn status(&self) -> EngineReply {
        let g = self.lock();
        if !g.state.active {
            return EngineReply::say(vec![
                "No game is running. Type !startgame to begin.".to_string(),
            ]);
        }
        let mut lines = vec![
            format!("--- Kingdom Status (Day {}) ---", g.state.day),
            format!("\u{1F4B0} Treasury: {}", g.state.treasury),
            format!("\u{1F60A} Happiness: {}", g.state.happiness),
            format!(
                "\u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F467}\u{200D}\u{1F466} Population: {}",
                g.state.population
            ),
        ];
        if g.state.modifiers.is_empty() {
            lines.push("Active effects: none".to_string());
        } else {
            for m in &g.state.modifiers {
                lines.push(format!(
                    "Active effect: {} ({} each day, {} day(s) left)",
                    m.source, m.effects, m.remaining_days
                ));
            }
        }
        EngineReply::say(lines)
    }

    pub fn help(&self) -> EngineReply {
        EngineReply::say(vec![
            "--- Sort the Chat Help ---".to_string(),
            "!startgame: Begin a new reign.".to_string(),
            "!yes / !no: Answer the current petitioner.".to_string(),
            "!status: Show your kingdom's resources.".to_string(),
            "!endgame: Abdicate the throne.".to_string(),
        ])
    }

    /// Test/inspection hook: read a field under the lock.
    pub fn with_state<T>(&self, f: impl FnOnce(&GameState) -> T) -> T {
        f(&self.lock().state)
    }

    fn lock(&self) -> MutexGuard<'_, Locked> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Announce termination and drop to Idle. Shared by abdication, upkeep
/// collapse, and decision fallout.
fn finish(state: &mut GameState, reason: &str) -> Vec<String> {
    state.active = false;
    state.awaiting_decision = false;
    state.current_card = None;
    vec![
        format!("--- Your reign has ended after {} days. ---", state.day),
        format!("Reason: {reason}"),
        format!(
            "Final Stats: {} gold, {} happiness, {} people.",
            state.treasury, state.happiness, state.population
        ),
        "Type !startgame to play again.".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Outcome;
    use crate::state::Effects;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const fn fx(treasury: i64, happiness: i64, population: i64) -> Effects {
        Effects {
            treasury,
            happiness,
            population,
        }
    }

    static COSTLY_CARD: &[EventCard] = &[EventCard {
        petitioner: "A Farmer",
        prompt: "50 gold for seeds?",
        on_yes: Branch::Single(Outcome::flat("The farmers rejoice.", fx(-50, 0, 0))),
        on_no: Branch::Single(Outcome::flat("The farmers despair.", fx(0, -15, 0))),
    }];

    static RUINOUS_CARD: &[EventCard] = &[EventCard {
        petitioner: "The Smug Prince",
        prompt: "Pay me everything you owe?",
        on_yes: Branch::Single(Outcome::flat("The debt is settled.", fx(-101, 0, 0))),
        on_no: Branch::Single(Outcome::flat("You refuse.", Effects::NONE)),
    }];

    fn rng() -> StdRng {
        StdRng::seed_from_u64(0)
    }

    #[test]
    fn start_game_resets_resources() {
        let engine = GameEngine::new(COSTLY_CARD);
        let reply = engine.start_game("alice", &mut rng());
        assert!(reply.schedule_next_turn);
        engine.with_state(|s| {
            assert_eq!((s.treasury, s.happiness, s.population, s.day), (100, 50, 100, 0));
            assert!(s.active);
            assert!(!s.awaiting_decision);
        });
    }

    #[test]
    fn start_while_active_is_a_notice_without_reset() {
        let engine = GameEngine::new(COSTLY_CARD);
        engine.start_game("alice", &mut rng());
        engine.advance_turn(&mut rng());
        let reply = engine.start_game("bob", &mut rng());
        assert!(!reply.schedule_next_turn);
        assert!(reply.lines[0].contains("already in progress"));
        engine.with_state(|s| assert_eq!(s.day, 1));
    }

    #[test]
    fn advance_draws_a_card_and_awaits() {
        let engine = GameEngine::new(COSTLY_CARD);
        engine.start_game("alice", &mut rng());
        let reply = engine.advance_turn(&mut rng());
        assert!(reply.lines.iter().any(|l| l.contains("A Farmer")));
        engine.with_state(|s| {
            assert_eq!(s.day, 1);
            assert!(s.awaiting_decision);
            assert!(s.current_card.is_some());
        });
    }

    #[test]
    fn decide_applies_effects_and_schedules() {
        let engine = GameEngine::new(COSTLY_CARD);
        engine.start_game("alice", &mut rng());
        engine.advance_turn(&mut rng());
        let reply = engine.decide(Choice::Yes, "alice", &mut rng());
        assert!(reply.schedule_next_turn);
        assert!(reply.lines[0].starts_with("alice, "));
        engine.with_state(|s| {
            assert_eq!(s.treasury, 50);
            assert!(!s.awaiting_decision);
            assert!(s.current_card.is_none());
        });
    }

    #[test]
    fn decide_without_pending_decision_is_silent() {
        let engine = GameEngine::new(COSTLY_CARD);
        engine.start_game("alice", &mut rng());
        let reply = engine.decide(Choice::Yes, "alice", &mut rng());
        assert!(reply.is_silent());
        assert!(!reply.schedule_next_turn);
    }

    #[test]
    fn ruinous_outcome_ends_the_game_immediately() {
        let engine = GameEngine::new(RUINOUS_CARD);
        engine.start_game("alice", &mut rng());
        engine.advance_turn(&mut rng());
        let reply = engine.decide(Choice::Yes, "alice", &mut rng());
        assert!(!reply.schedule_next_turn);
        assert!(reply.lines.iter().any(|l| l.contains("bankrupt")));
        engine.with_state(|s| {
            assert_eq!(s.treasury, -1);
            assert!(!s.active);
        });

        // Repeated !yes after the end is a no-op.
        let again = engine.decide(Choice::Yes, "alice", &mut rng());
        assert!(again.is_silent());
    }

    #[test]
    fn upkeep_collapse_terminates_without_drawing() {
        let engine = GameEngine::new(COSTLY_CARD);
        engine.start_game("alice", &mut rng());
        {
            // Arrange a modifier that bankrupts on the next upkeep.
            let mut g = engine.lock();
            g.state.treasury = 5;
            g.state.modifiers.push(Modifier {
                source: "War reparations",
                remaining_days: 2,
                effects: fx(-10, 0, 0),
            });
        }
        let reply = engine.advance_turn(&mut rng());
        assert!(reply.lines.iter().any(|l| l.contains("Daily upkeep")));
        assert!(reply.lines.iter().any(|l| l.contains("bankrupt")));
        engine.with_state(|s| {
            assert!(!s.active);
            assert_eq!(s.day, 0, "no card drawn, no day elapsed");
        });
    }

    #[test]
    fn endgame_reports_final_stats_then_goes_idle() {
        let engine = GameEngine::new(COSTLY_CARD);
        engine.start_game("alice", &mut rng());
        let reply = engine.end_game("You have abdicated the throne.", "alice");
        assert!(reply.lines.iter().any(|l| l.contains("abdicated")));
        assert!(engine.end_game("again", "alice").is_silent());
        assert!(engine.status().lines[0].contains("No game is running"));
    }

    #[test]
    fn status_before_any_decision_reports_day_zero() {
        let engine = GameEngine::new(COSTLY_CARD);
        engine.start_game("alice", &mut rng());
        let reply = engine.status();
        assert!(reply.lines[0].contains("Day 0"));
    }

    #[test]
    fn concurrent_decides_resolve_exactly_once() {
        use std::sync::Arc;

        let engine = Arc::new(GameEngine::new(COSTLY_CARD));
        engine.start_game("alice", &mut rng());
        engine.advance_turn(&mut rng());

        let mut handles = Vec::new();
        for _ in 0..2 {
            let engine = engine.clone();
            handles.push(std::thread::spawn(move || {
                let mut rng = StdRng::seed_from_u64(5);
                engine.decide(Choice::Yes, "alice", &mut rng)
            }));
        }
        let replies: Vec<EngineReply> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();

        let spoken = replies.iter().filter(|r| !r.is_silent()).count();
        assert_eq!(spoken, 1, "exactly one decide may resolve the petition");
        engine.with_state(|s| {
            assert_eq!(s.treasury, 50, "effects applied exactly once");
            assert!(!s.awaiting_decision);
        });
    }

    #[test]
    fn reset_drops_an_active_game() {
        let engine = GameEngine::new(COSTLY_CARD);
        engine.start_game("alice", &mut rng());
        engine.advance_turn(&mut rng());
        engine.reset();
        engine.with_state(|s| {
            assert!(!s.active);
            assert!(!s.awaiting_decision);
        });
        assert!(engine.decide(Choice::Yes, "alice", &mut rng()).is_silent());
    }
}
