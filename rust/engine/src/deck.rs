use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::cards::{full_deck, Card};
use crate::errors::EngineError;

/// A 52-card deck with a deterministic, seedable shuffle.
///
/// One `Deck` serves a whole tournament: `shuffle()` restores and
/// re-permutes the full pack at the start of every hand, drawing from the
/// same ChaCha20 stream so a fixed seed replays the exact card sequence.
#[derive(Debug)]
pub struct Deck {
    cards: Vec<Card>,
    position: usize,
    rng: ChaCha20Rng,
}

impl Deck {
    pub fn new_with_seed(seed: u64) -> Self {
        Self {
            cards: full_deck(),
            position: 0,
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    pub fn shuffle(&mut self) {
        self.cards = full_deck();
        self.cards.shuffle(&mut self.rng);
        self.position = 0;
    }

    pub fn deal_card(&mut self) -> Result<Card, EngineError> {
        let c = self
            .cards
            .get(self.position)
            .copied()
            .ok_or(EngineError::DeckExhausted)?;
        self.position += 1;
        Ok(c)
    }

    /// Burns never reach the wire, so the discarded card is dropped.
    pub fn burn_card(&mut self) -> Result<(), EngineError> {
        self.deal_card().map(|_| ())
    }

    pub fn remaining(&self) -> usize {
        self.cards.len().saturating_sub(self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_order() {
        let mut a = Deck::new_with_seed(7);
        let mut b = Deck::new_with_seed(7);
        a.shuffle();
        b.shuffle();
        for _ in 0..52 {
            assert_eq!(a.deal_card().unwrap(), b.deal_card().unwrap());
        }
    }

    #[test]
    fn dealing_past_the_end_errors() {
        let mut d = Deck::new_with_seed(0);
        d.shuffle();
        for _ in 0..52 {
            d.deal_card().unwrap();
        }
        assert_eq!(d.deal_card(), Err(EngineError::DeckExhausted));
    }

    #[test]
    fn shuffle_restores_the_full_pack() {
        let mut d = Deck::new_with_seed(3);
        d.shuffle();
        for _ in 0..10 {
            d.deal_card().unwrap();
        }
        d.shuffle();
        assert_eq!(d.remaining(), 52);
    }
}
