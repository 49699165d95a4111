//! Remaining-card estimate kept by an observer of the game.

use std::fmt;

use crate::game::entities::{ACE, BLACKJACK, KING, Value, hand_value};

/// Copies of each rank in a full deck.
const COPIES_PER_RANK: u8 = 4;

/// Counts of unseen cards per rank, starting from a full 52-card deck.
///
/// Counts only ever go down, and only for cards the observer has actually
/// seen. The server reshuffles its deck when it runs out but the counter
/// doesn't, so the estimate drifts over long sessions.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CardCounter {
    counts: [u8; KING as usize],
}

impl CardCounter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            counts: [COPIES_PER_RANK; KING as usize],
        }
    }

    /// Removes one card of `rank` from the unseen population. Counts floor
    /// at zero and ranks outside 1..=13 are ignored.
    pub fn mark_seen(&mut self, rank: Value) {
        if let Some(count) = self.slot_mut(rank) {
            *count = count.saturating_sub(1);
        }
    }

    /// Unseen cards of `rank`.
    #[must_use]
    pub fn remaining(&self, rank: Value) -> u8 {
        match rank {
            ACE..=KING => self.counts[usize::from(rank - 1)],
            _ => 0,
        }
    }

    #[must_use]
    pub fn total_remaining(&self) -> u32 {
        self.counts.iter().map(|&c| u32::from(c)).sum()
    }

    /// Probability that drawing one more card busts a hand of `ranks`,
    /// weighted by the unseen population. An empty population is treated
    /// as zero risk.
    #[must_use]
    pub fn bust_probability_if_hit(&self, ranks: &[Value]) -> f64 {
        let total = self.total_remaining();
        if total == 0 {
            return 0.0;
        }
        let bust: u32 = (ACE..=KING)
            .filter(|&rank| self.remaining(rank) > 0)
            .filter(|&rank| {
                let (next, _) = hand_value(ranks.iter().copied().chain([rank]));
                next > BLACKJACK
            })
            .map(|rank| u32::from(self.remaining(rank)))
            .sum();
        f64::from(bust) / f64::from(total)
    }

    fn slot_mut(&mut self, rank: Value) -> Option<&mut u8> {
        match rank {
            ACE..=KING => self.counts.get_mut(usize::from(rank - 1)),
            _ => None,
        }
    }
}

impl Default for CardCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CardCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} unseen", self.total_remaining())
    }
}
