//! Immutable petition templates and weighted outcome selection.

use rand::Rng;

use crate::state::Effects;

/// A timed effect appended to the game when an outcome lands.
#[derive(Debug, Clone, Copy)]
pub struct ModifierTemplate {
    pub source: &'static str,
    pub days: u32,
    pub effects: Effects,
}

/// One possible result of a decision.
#[derive(Debug, Clone, Copy)]
pub struct Outcome {
    /// Relative weight inside a weighted branch; need not sum to 100.
    /// Zero-weight outcomes are never selected. Ignored in a single branch.
    pub weight: u32,
    pub text: &'static str,
    pub effects: Effects,
    pub modifier: Option<ModifierTemplate>,
}

impl Outcome {
    pub const fn flat(text: &'static str, effects: Effects) -> Self {
        Self {
            weight: 0,
            text,
            effects,
            modifier: None,
        }
    }

    pub const fn weighted(weight: u32, text: &'static str, effects: Effects) -> Self {
        Self {
            weight,
            text,
            effects,
            modifier: None,
        }
    }

    pub const fn with_modifier(mut self, modifier: ModifierTemplate) -> Self {
        self.modifier = Some(modifier);
        self
    }
}

/// The result(s) of saying yes or no: either fixed, or rolled from a
/// weighted table.
#[derive(Debug, Clone, Copy)]
pub enum Branch {
    Single(Outcome),
    Weighted(&'static [Outcome]),
}

impl Branch {
    /// Cumulative-weight sampling over relative weights. Zero weights are
    /// skipped; a malformed all-zero table falls back to the first entry.
    pub fn pick(&self, rng: &mut impl Rng) -> &Outcome {
        match self {
            Branch::Single(outcome) => outcome,
            Branch::Weighted(outcomes) => {
                let total: u32 = outcomes.iter().map(|o| o.weight).sum();
                if total == 0 {
                    return &outcomes[0];
                }
                let mut roll = rng.random_range(0..total);
                for outcome in *outcomes {
                    if roll < outcome.weight {
                        return outcome;
                    }
                    roll -= outcome.weight;
                }
                // Unreachable while total covers the roll range.
                &outcomes[outcomes.len() - 1]
            }
        }
    }

    fn is_well_formed(&self) -> bool {
        // A zero-day modifier would underflow its countdown on the tick
        // after the one that applied it.
        fn outcome_ok(outcome: &Outcome) -> bool {
            outcome.modifier.is_none_or(|m| m.days > 0)
        }

        match self {
            Branch::Single(outcome) => outcome_ok(outcome),
            Branch::Weighted(outcomes) => {
                !outcomes.is_empty()
                    && outcomes.iter().map(|o| o.weight).sum::<u32>() > 0
                    && outcomes.iter().all(outcome_ok)
            }
        }
    }
}

/// An immutable petition: who asks, what they ask, and what each answer does.
#[derive(Debug, Clone, Copy)]
pub struct EventCard {
    pub petitioner: &'static str,
    pub prompt: &'static str,
    pub on_yes: Branch,
    pub on_no: Branch,
}

impl EventCard {
    /// Catalog sanity check, run once at engine construction.
    pub fn is_well_formed(&self) -> bool {
        self.on_yes.is_well_formed() && self.on_no.is_well_formed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    static WEIGHTED: &[Outcome] = &[
        Outcome::weighted(60, "common", Effects::NONE),
        Outcome::weighted(30, "uncommon", Effects::NONE),
        Outcome::weighted(10, "rare", Effects::NONE),
    ];

    #[test]
    fn single_branch_always_returns_its_outcome() {
        let branch = Branch::Single(Outcome::flat("fixed", Effects::NONE));
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            assert_eq!(branch.pick(&mut rng).text, "fixed");
        }
    }

    #[test]
    fn weighted_frequencies_match_weights_over_many_trials() {
        let branch = Branch::Weighted(WEIGHTED);
        let mut rng = StdRng::seed_from_u64(42);
        let trials = 100_000u32;

        let mut counts = [0u32; 3];
        for _ in 0..trials {
            match branch.pick(&mut rng).text {
                "common" => counts[0] += 1,
                "uncommon" => counts[1] += 1,
                "rare" => counts[2] += 1,
                other => panic!("unexpected outcome {other}"),
            }
        }

        // 1% absolute tolerance is generous at n=100k (sigma < 0.2%).
        let pct = |c: u32| c as f64 / trials as f64 * 100.0;
        assert!((pct(counts[0]) - 60.0).abs() < 1.0, "common: {}", pct(counts[0]));
        assert!((pct(counts[1]) - 30.0).abs() < 1.0, "uncommon: {}", pct(counts[1]));
        assert!((pct(counts[2]) - 10.0).abs() < 1.0, "rare: {}", pct(counts[2]));
    }

    #[test]
    fn zero_weight_outcome_is_never_selected() {
        static WITH_DEAD: &[Outcome] = &[
            Outcome::weighted(0, "dead", Effects::NONE),
            Outcome::weighted(5, "live", Effects::NONE),
        ];
        let branch = Branch::Weighted(WITH_DEAD);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..1000 {
            assert_eq!(branch.pick(&mut rng).text, "live");
        }
    }

    #[test]
    fn all_zero_table_falls_back_to_first() {
        static ALL_ZERO: &[Outcome] = &[
            Outcome::weighted(0, "first", Effects::NONE),
            Outcome::weighted(0, "second", Effects::NONE),
        ];
        let branch = Branch::Weighted(ALL_ZERO);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(branch.pick(&mut rng).text, "first");
        assert!(!branch.is_well_formed());
    }

    #[test]
    fn zero_day_modifier_is_malformed() {
        let card = EventCard {
            petitioner: "A Hasty Enchanter",
            prompt: "A charm that expires before it starts?",
            on_yes: Branch::Single(
                Outcome::flat("The charm fizzles instantly.", Effects::NONE).with_modifier(
                    ModifierTemplate {
                        source: "Fizzled charm",
                        days: 0,
                        effects: Effects::NONE,
                    },
                ),
            ),
            on_no: Branch::Single(Outcome::flat("Wisely declined.", Effects::NONE)),
        };
        assert!(!card.is_well_formed());
    }

    #[test]
    fn weights_need_not_sum_to_100() {
        static ODD_TOTAL: &[Outcome] = &[
            Outcome::weighted(3, "a", Effects::NONE),
            Outcome::weighted(1, "b", Effects::NONE),
        ];
        let branch = Branch::Weighted(ODD_TOTAL);
        let mut rng = StdRng::seed_from_u64(99);
        let hits_b = (0..10_000)
            .filter(|_| branch.pick(&mut rng).text == "b")
            .count();
        // Expect ~25%.
        assert!((2000..3000).contains(&hits_b), "b hits: {hits_b}");
    }
}
