//! Player-side agents.
//!
//! This module implements:
//! - CardCounter: remaining-card estimate built from the cards a player
//!   has seen on the wire
//! - StatisticalStrategy: hit/stand heuristic that blends fixed total
//!   thresholds with the counter's bust probability
//!
//! ## Decision rules
//!
//! - 11 or less: always hit
//! - Hard 17+ or soft 18+: always stand
//! - Anything else: hit iff p(bust) is at or below 0.55 against a 7-A
//!   upcard, 0.40 against 2-6, or 0.45 with no upcard known
//!
//! ## Example
//!
//! ```
//! use twentyone::bot::{CardCounter, StatisticalStrategy, Strategy};
//! use twentyone::entities::{Card, Decision, Hand, Suit};
//!
//! let mut strategy = StatisticalStrategy::default();
//! let hand = Hand::from(vec![Card(10, Suit::Heart), Card(7, Suit::Club)]);
//! let up = Some(Card(9, Suit::Spade));
//! assert_eq!(strategy.decide(&hand, up, &CardCounter::new()), Decision::Stand);
//! ```

pub mod counter;
pub mod decision;

pub use counter::CardCounter;
pub use decision::{StatisticalStrategy, StrategyConfig, choose_decision};

use crate::game::entities::{Card, Decision, Hand};

/// Something that can play the player's side of a round.
pub trait Strategy {
    /// Chooses the next action given the player's hand, the dealer's
    /// upcard if one is known, and the cards seen so far.
    fn decide(&mut self, player: &Hand, dealer_up: Option<Card>, counter: &CardCounter) -> Decision;
}
