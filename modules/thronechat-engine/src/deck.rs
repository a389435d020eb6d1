//! Shuffled draw-without-replacement deck over the card catalog.

use rand::seq::SliceRandom;
use rand::Rng;

/// Holds card indices; cards themselves live in the catalog slice.
#[derive(Debug)]
pub struct EventDeck {
    remaining: Vec<usize>,
    catalog_len: usize,
}

impl EventDeck {
    /// Starts empty; the first draw (or an explicit [`reshuffle`]) fills it.
    ///
    /// [`reshuffle`]: EventDeck::reshuffle
    pub fn new(catalog_len: usize) -> Self {
        Self {
            remaining: Vec::new(),
            catalog_len,
        }
    }

    /// Refill with every catalog index in random order.
    pub fn reshuffle(&mut self, rng: &mut impl Rng) {
        tracing::info!("Shuffling the event deck");
        self.remaining = (0..self.catalog_len).collect();
        self.remaining.shuffle(rng);
    }

    /// Draw the next card index, reshuffling when the deck runs dry.
    pub fn draw(&mut self, rng: &mut impl Rng) -> usize {
        if self.remaining.is_empty() {
            self.reshuffle(rng);
        }
        self.remaining
            .pop()
            .expect("deck refilled from a non-empty catalog")
    }

    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn each_cycle_draws_every_card_exactly_once() {
        let mut deck = EventDeck::new(8);
        let mut rng = StdRng::seed_from_u64(3);

        for _cycle in 0..3 {
            let drawn: HashSet<usize> = (0..8).map(|_| deck.draw(&mut rng)).collect();
            assert_eq!(drawn.len(), 8, "a cycle must cover the whole catalog");
        }
    }

    #[test]
    fn draw_refills_an_empty_deck() {
        let mut deck = EventDeck::new(3);
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..3 {
            deck.draw(&mut rng);
        }
        assert_eq!(deck.remaining(), 0);
        let idx = deck.draw(&mut rng);
        assert!(idx < 3);
        assert_eq!(deck.remaining(), 2);
    }
}
