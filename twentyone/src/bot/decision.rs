//! Hit/stand heuristic driven by bust probability and the dealer's upcard.

use log::debug;

use super::{Strategy, counter::CardCounter};
use crate::game::entities::{ACE, Card, Decision, Hand, KING, Value, hand_value};

/// Totals at or below this can't bust on one more card.
const ALWAYS_HIT_TOTAL: u16 = 11;

/// Hard totals at or above this always stand.
const HARD_STAND_TOTAL: u16 = 17;

/// Soft totals at or above this always stand.
const SOFT_STAND_TOTAL: u16 = 18;

/// Configuration for the bust-probability thresholds used in the
/// 12-17 decision zone.
///
/// The player hits iff the estimated bust probability is at or below the
/// threshold picked from the dealer's upcard. Higher threshold = more
/// willing to hit.
///
/// # Examples
///
/// ```
/// use twentyone::bot::decision::StrategyConfig;
///
/// let config = StrategyConfig::default();
/// assert_eq!(config.strong_dealer_threshold, 0.55);
/// assert_eq!(config.weak_dealer_threshold, 0.40);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct StrategyConfig {
    /// Threshold when the dealer shows 7 through king or an ace.
    ///
    /// **Effect**: 0.55 = hits into a bust risk of up to 55%
    pub strong_dealer_threshold: f64,

    /// Threshold when the dealer shows 2 through 6.
    ///
    /// **Effect**: 0.40 = stands once the bust risk passes 40%
    pub weak_dealer_threshold: f64,

    /// Threshold when no dealer card is known.
    pub unknown_dealer_threshold: f64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            strong_dealer_threshold: 0.55,
            weak_dealer_threshold: 0.40,
            unknown_dealer_threshold: 0.45,
        }
    }
}

impl StrategyConfig {
    /// Threshold to compare the bust probability against.
    #[must_use]
    pub fn threshold(&self, dealer_up: Option<Value>) -> f64 {
        match dealer_up {
            None => self.unknown_dealer_threshold,
            Some(rank) if is_strong_upcard(rank) => self.strong_dealer_threshold,
            Some(_) => self.weak_dealer_threshold,
        }
    }
}

/// Sevens and up, plus aces.
#[must_use]
pub fn is_strong_upcard(rank: Value) -> bool {
    matches!(rank, ACE | 7..=KING)
}

/// Picks a decision for a hand of `ranks` against the dealer's upcard.
#[must_use]
pub fn choose_decision(
    ranks: &[Value],
    dealer_up: Option<Value>,
    counter: &CardCounter,
    config: &StrategyConfig,
) -> Decision {
    let (total, soft) = hand_value(ranks.iter().copied());

    if total <= ALWAYS_HIT_TOTAL {
        return Decision::Hit;
    }
    if (!soft && total >= HARD_STAND_TOTAL) || (soft && total >= SOFT_STAND_TOTAL) {
        return Decision::Stand;
    }

    let p_bust = counter.bust_probability_if_hit(ranks);
    let threshold = config.threshold(dealer_up);
    debug!("total {total} soft {soft}: p(bust) = {p_bust:.3}, threshold {threshold:.2}");
    if p_bust <= threshold {
        Decision::Hit
    } else {
        Decision::Stand
    }
}

/// Plays by [`choose_decision`].
#[derive(Clone, Debug, Default)]
pub struct StatisticalStrategy {
    pub config: StrategyConfig,
}

impl StatisticalStrategy {
    #[must_use]
    pub fn new(config: StrategyConfig) -> Self {
        Self { config }
    }
}

impl Strategy for StatisticalStrategy {
    fn decide(&mut self, player: &Hand, dealer_up: Option<Card>, counter: &CardCounter) -> Decision {
        let ranks: Vec<Value> = player.ranks().collect();
        choose_decision(&ranks, dealer_up.map(|c| c.rank()), counter, &self.config)
    }
}
