//! Mutable game state and resource accounting.

use std::fmt;

/// A bundle of stat deltas. Applied atomically; individual stats may swing
/// transiently negative. Only the turn-advance termination check decides
/// whether a reign is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Effects {
    pub treasury: i64,
    pub happiness: i64,
    pub population: i64,
}

impl Effects {
    pub const NONE: Effects = Effects {
        treasury: 0,
        happiness: 0,
        population: 0,
    };

    pub fn is_empty(&self) -> bool {
        *self == Effects::NONE
    }

    fn accumulate(&mut self, other: &Effects) {
        self.treasury += other.treasury;
        self.happiness += other.happiness;
        self.population += other.population;
    }
}

/// Chat rendering: "-50 💰, +15 😊". Signed deltas, zeros omitted.
impl fmt::Display for Effects {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = [
            (self.treasury, "\u{1F4B0}"),
            (self.happiness, "\u{1F60A}"),
            (self.population, "\u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F467}\u{200D}\u{1F466}"),
        ]
        .iter()
        .filter(|(v, _)| *v != 0)
        .map(|(v, sym)| format!("{}{} {}", if *v > 0 { "+" } else { "" }, v, sym))
        .collect();
        write!(f, "{}", parts.join(", "))
    }
}

/// A timed recurring effect attached to the kingdom; applied once per turn
/// advance, then its duration is decremented.
#[derive(Debug, Clone)]
pub struct Modifier {
    pub source: &'static str,
    pub remaining_days: u32,
    pub effects: Effects,
}

/// The single game state, guarded by one mutex inside [`crate::GameEngine`].
///
/// Invariant: `awaiting_decision` implies `active` and `current_card` set.
#[derive(Debug)]
pub struct GameState {
    pub day: u64,
    pub treasury: i64,
    pub happiness: i64,
    pub population: i64,
    pub active: bool,
    pub awaiting_decision: bool,
    /// Index into the card catalog of the petition being decided.
    pub current_card: Option<usize>,
    pub modifiers: Vec<Modifier>,
}

impl GameState {
    /// Fresh-reign starting resources.
    pub fn new_reign() -> Self {
        Self {
            day: 0,
            treasury: 100,
            happiness: 50,
            population: 100,
            active: true,
            awaiting_decision: false,
            current_card: None,
            modifiers: Vec::new(),
        }
    }

    /// Inactive state, as after a supervised restart.
    pub fn idle() -> Self {
        Self {
            active: false,
            ..Self::new_reign()
        }
    }

    pub fn apply(&mut self, effects: &Effects) {
        self.treasury += effects.treasury;
        self.happiness += effects.happiness;
        self.population += effects.population;
    }

    /// Apply every active modifier once, drop the expired, and return the
    /// aggregate delta for the upkeep report.
    pub fn tick_modifiers(&mut self) -> Effects {
        let mut total = Effects::NONE;
        for modifier in &mut self.modifiers {
            total.accumulate(&modifier.effects);
            modifier.remaining_days -= 1;
        }
        let snapshot = total;
        self.apply(&snapshot);
        self.modifiers.retain(|m| m.remaining_days > 0);
        snapshot
    }

    /// Termination predicates in fixed order; the first hit names the reason.
    pub fn termination_reason(&self) -> Option<&'static str> {
        if self.treasury < 0 {
            Some("The kingdom is bankrupt!")
        } else if self.happiness <= 0 {
            Some("The people have revolted!")
        } else if self.population <= 0 {
            Some("The kingdom stands empty. There is no one left to rule.")
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effects_display_skips_zeros_and_signs_gains() {
        let e = Effects {
            treasury: -50,
            happiness: 15,
            population: 0,
        };
        let rendered = e.to_string();
        assert!(rendered.starts_with("-50 "));
        assert!(rendered.contains("+15 "));
        assert!(!rendered.contains("population"));
    }

    #[test]
    fn tick_applies_and_expires_modifiers() {
        let mut state = GameState::new_reign();
        state.modifiers.push(Modifier {
            source: "Guild investment",
            remaining_days: 2,
            effects: Effects {
                treasury: 10,
                ..Effects::NONE
            },
        });

        let delta = state.tick_modifiers();
        assert_eq!(delta.treasury, 10);
        assert_eq!(state.treasury, 110);
        assert_eq!(state.modifiers.len(), 1);

        state.tick_modifiers();
        assert_eq!(state.treasury, 120);
        assert!(state.modifiers.is_empty(), "expired modifier must drop");
    }

    #[test]
    fn termination_order_is_treasury_then_happiness_then_population() {
        let mut state = GameState::new_reign();
        state.treasury = -1;
        state.happiness = 0;
        assert_eq!(state.termination_reason(), Some("The kingdom is bankrupt!"));

        state.treasury = 0;
        assert_eq!(
            state.termination_reason(),
            Some("The people have revolted!")
        );

        state.happiness = 10;
        state.population = 0;
        assert!(state
            .termination_reason()
            .map(|r| r.contains("no one left"))
            .unwrap_or(false));
    }

    #[test]
    fn zero_treasury_is_not_bankrupt() {
        let mut state = GameState::new_reign();
        state.treasury = 0;
        assert_eq!(state.termination_reason(), None);
    }
}
