//! Blackjack round state machine.
//!
//! A round moves `Init -> PlayerTurn -> DealerTurn -> Over`, or straight
//! from `PlayerTurn` to `Over` when the player busts. Every call advances
//! the round by at most one action and returns the card events the caller
//! must transmit, in order.

use enum_dispatch::enum_dispatch;
use log::debug;
use thiserror::Error;

use super::entities::{BLACKJACK, Card, DEALER_STAND_TOTAL, Deck, Decision, Hand, RoundResult};
use super::states::{DealerTurn, Init, Over, PlayerTurn};

/// Errors from driving a round out of order.
#[derive(Debug, Eq, Error, PartialEq)]
pub enum RoundError {
    #[error("round already started")]
    AlreadyStarted,
    #[error("round not started")]
    NotStarted,
}

/// A result code paired with the card it's reported on.
pub type CardEvent = (RoundResult, Card);

/// The two hands in play for one round.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Hands {
    pub player: Hand,
    pub dealer: Hand,
}

impl Hands {
    /// Final result from the player's point of view. Busts are checked
    /// before totals are compared.
    #[must_use]
    pub fn outcome(&self) -> RoundResult {
        let player = self.player.total();
        let dealer = self.dealer.total();
        if player > BLACKJACK {
            RoundResult::Loss
        } else if dealer > BLACKJACK || player > dealer {
            RoundResult::Win
        } else if player < dealer {
            RoundResult::Loss
        } else {
            RoundResult::Tie
        }
    }
}

/// Events produced by one step and the phase the round lands in.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Transition {
    pub events: Vec<CardEvent>,
    pub next: Phase,
}

impl Transition {
    fn emit(event: CardEvent, next: impl Into<Phase>) -> Self {
        Self {
            events: vec![event],
            next: next.into(),
        }
    }
}

/// One action's worth of progress for a phase.
#[enum_dispatch]
pub trait RoundStep {
    fn step(&self, hands: &mut Hands, deck: &mut Deck, decision: Decision) -> Transition;
}

/// Where a round currently is.
#[enum_dispatch(RoundStep)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase {
    Init(Init),
    PlayerTurn(PlayerTurn),
    DealerTurn(DealerTurn),
    Over(Over),
}

impl Default for Phase {
    fn default() -> Self {
        Init.into()
    }
}

impl RoundStep for Init {
    fn step(&self, hands: &mut Hands, deck: &mut Deck, _: Decision) -> Transition {
        for _ in 0..2 {
            hands.player.push(deck.deal_card());
        }
        for _ in 0..2 {
            hands.dealer.push(deck.deal_card());
        }
        // The hole card stays hidden until the player stands.
        let events = hands
            .player
            .cards()
            .iter()
            .copied()
            .chain(hands.dealer.first())
            .map(|card| (RoundResult::NotOver, card))
            .collect();
        Transition {
            events,
            next: PlayerTurn.into(),
        }
    }
}

impl RoundStep for PlayerTurn {
    fn step(&self, hands: &mut Hands, deck: &mut Deck, decision: Decision) -> Transition {
        match decision {
            Decision::Hit => {
                let card = deck.deal_card();
                hands.player.push(card);
                if hands.player.is_bust() {
                    let result = RoundResult::Loss;
                    Transition::emit((result, card), Over { result })
                } else {
                    Transition::emit((RoundResult::NotOver, card), PlayerTurn)
                }
            }
            Decision::Stand => Transition {
                events: hands
                    .dealer
                    .cards()
                    .get(1)
                    .map(|&hole| (RoundResult::NotOver, hole))
                    .into_iter()
                    .collect(),
                next: DealerTurn.into(),
            },
        }
    }
}

impl RoundStep for DealerTurn {
    fn step(&self, hands: &mut Hands, deck: &mut Deck, _: Decision) -> Transition {
        if hands.dealer.total() >= DEALER_STAND_TOTAL {
            let result = hands.outcome();
            Transition {
                events: hands.dealer.last().map(|card| (result, card)).into_iter().collect(),
                next: Over { result }.into(),
            }
        } else {
            let card = deck.deal_card();
            hands.dealer.push(card);
            Transition::emit((RoundResult::NotOver, card), DealerTurn)
        }
    }
}

impl RoundStep for Over {
    fn step(&self, hands: &mut Hands, _: &mut Deck, _: Decision) -> Transition {
        let last = hands.dealer.last().or_else(|| hands.player.last());
        Transition {
            events: last.map(|card| (self.result, card)).into_iter().collect(),
            next: (*self).into(),
        }
    }
}

/// One round of blackjack. The round borrows the session's deck for each
/// call and owns nothing but its hands and phase.
#[derive(Debug, Default)]
pub struct Round {
    hands: Hands,
    phase: Phase,
}

impl Round {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deals two cards each and reports the player's cards and the
    /// dealer's upcard.
    ///
    /// # Errors
    ///
    /// Returns [`RoundError::AlreadyStarted`] if cards were already dealt.
    pub fn start(&mut self, deck: &mut Deck) -> Result<Vec<CardEvent>, RoundError> {
        match self.phase {
            Phase::Init(init) => Ok(self.apply(init.into(), deck, Decision::Stand).events),
            _ => Err(RoundError::AlreadyStarted),
        }
    }

    /// Advances the round by one action. Outside the player's turn the
    /// decision is ignored and treated as a stand.
    ///
    /// # Errors
    ///
    /// Returns [`RoundError::NotStarted`] if [`Round::start`] hasn't been
    /// called.
    pub fn step(&mut self, deck: &mut Deck, decision: Decision) -> Result<Transition, RoundError> {
        match self.phase {
            Phase::Init(_) => Err(RoundError::NotStarted),
            Phase::PlayerTurn(_) => Ok(self.apply(self.phase, deck, decision)),
            phase => Ok(self.apply(phase, deck, Decision::Stand)),
        }
    }

    fn apply(&mut self, phase: Phase, deck: &mut Deck, decision: Decision) -> Transition {
        let transition = phase.step(&mut self.hands, deck, decision);
        for (result, card) in &transition.events {
            debug!("{card} ({result})");
        }
        self.phase = transition.next;
        transition
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn hands(&self) -> &Hands {
        &self.hands
    }

    #[must_use]
    pub fn is_player_turn(&self) -> bool {
        matches!(self.phase, Phase::PlayerTurn(_))
    }

    /// The final result once the round is over.
    #[must_use]
    pub fn result(&self) -> Option<RoundResult> {
        match self.phase {
            Phase::Over(Over { result }) => Some(result),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::{ACE, KING, QUEEN, Suit};

    fn c(rank: u8, suit: Suit) -> Card {
        Card(rank, suit)
    }

    /// Player 5♣ 6♦, dealer 10♠ up and 9♥ in the hole.
    fn scenario_deck(extra: &[Card]) -> Deck {
        let mut top = vec![
            c(5, Suit::Club),
            c(6, Suit::Diamond),
            c(10, Suit::Spade),
            c(9, Suit::Heart),
        ];
        top.extend_from_slice(extra);
        Deck::stacked(&top, 0)
    }

    #[test]
    fn start_reveals_player_cards_then_upcard() {
        let mut deck = scenario_deck(&[]);
        let mut round = Round::new();
        let events = round.start(&mut deck).unwrap();
        assert_eq!(
            events,
            vec![
                (RoundResult::NotOver, c(5, Suit::Club)),
                (RoundResult::NotOver, c(6, Suit::Diamond)),
                (RoundResult::NotOver, c(10, Suit::Spade)),
            ]
        );
        assert!(round.is_player_turn());
        assert_eq!(round.hands().dealer.len(), 2);
        assert_eq!(deck.drawn(), 4);
    }

    #[test]
    fn stand_reveals_hole_card_and_defers_outcome() {
        let mut deck = scenario_deck(&[]);
        let mut round = Round::new();
        round.start(&mut deck).unwrap();

        let reveal = round.step(&mut deck, Decision::Stand).unwrap();
        assert_eq!(reveal.events, vec![(RoundResult::NotOver, c(9, Suit::Heart))]);
        assert_eq!(reveal.next, Phase::DealerTurn(DealerTurn));

        // Dealer is on 19, so the next call settles the round.
        let last = round.step(&mut deck, Decision::Stand).unwrap();
        assert_eq!(last.events, vec![(RoundResult::Loss, c(9, Suit::Heart))]);
        assert_eq!(round.result(), Some(RoundResult::Loss));
        assert_eq!(deck.drawn(), 4);
    }

    #[test]
    fn hit_without_bust_stays_in_player_turn() {
        let mut deck = scenario_deck(&[c(2, Suit::Heart)]);
        let mut round = Round::new();
        round.start(&mut deck).unwrap();

        let hit = round.step(&mut deck, Decision::Hit).unwrap();
        assert_eq!(hit.events, vec![(RoundResult::NotOver, c(2, Suit::Heart))]);
        assert!(round.is_player_turn());
        assert_eq!(round.hands().player.total(), 13);
    }

    #[test]
    fn bust_ends_round_with_loss_on_busting_card() {
        let mut deck = scenario_deck(&[c(KING, Suit::Heart), c(QUEEN, Suit::Club)]);
        let mut round = Round::new();
        round.start(&mut deck).unwrap();

        round.step(&mut deck, Decision::Hit).unwrap();
        let bust = round.step(&mut deck, Decision::Hit).unwrap();
        assert_eq!(bust.events, vec![(RoundResult::Loss, c(QUEEN, Suit::Club))]);
        assert_eq!(bust.next, Phase::Over(Over { result: RoundResult::Loss }));
        // Dealer never draws once the player has busted.
        assert_eq!(round.hands().dealer.len(), 2);
    }

    #[test]
    fn dealer_draws_one_card_per_step() {
        // Player 10 + 9, dealer 10 + 2 then 3 then 4.
        let mut deck = Deck::stacked(
            &[
                c(10, Suit::Heart),
                c(9, Suit::Heart),
                c(10, Suit::Club),
                c(2, Suit::Club),
                c(3, Suit::Club),
                c(4, Suit::Club),
            ],
            1,
        );
        let mut round = Round::new();
        round.start(&mut deck).unwrap();
        round.step(&mut deck, Decision::Stand).unwrap();

        let first = round.step(&mut deck, Decision::Stand).unwrap();
        assert_eq!(first.events, vec![(RoundResult::NotOver, c(3, Suit::Club))]);
        let second = round.step(&mut deck, Decision::Stand).unwrap();
        assert_eq!(second.events, vec![(RoundResult::NotOver, c(4, Suit::Club))]);
        // Dealer on 19 stands and ties the player.
        let last = round.step(&mut deck, Decision::Stand).unwrap();
        assert_eq!(last.events, vec![(RoundResult::Tie, c(4, Suit::Club))]);
    }

    #[test]
    fn dealer_stands_on_soft_seventeen() {
        // Player 10 + 8, dealer A + 6.
        let mut deck = Deck::stacked(
            &[
                c(10, Suit::Heart),
                c(8, Suit::Heart),
                c(ACE, Suit::Club),
                c(6, Suit::Club),
            ],
            2,
        );
        let mut round = Round::new();
        round.start(&mut deck).unwrap();
        round.step(&mut deck, Decision::Stand).unwrap();
        let last = round.step(&mut deck, Decision::Stand).unwrap();
        assert_eq!(last.events, vec![(RoundResult::Win, c(6, Suit::Club))]);
        assert_eq!(round.hands().dealer.len(), 2);
    }

    #[test]
    fn dealer_bust_is_a_win() {
        // Player 10 + 2, dealer 10 + 6 then K.
        let mut deck = Deck::stacked(
            &[
                c(10, Suit::Heart),
                c(2, Suit::Heart),
                c(10, Suit::Club),
                c(6, Suit::Club),
                c(KING, Suit::Diamond),
            ],
            3,
        );
        let mut round = Round::new();
        round.start(&mut deck).unwrap();
        round.step(&mut deck, Decision::Stand).unwrap();
        round.step(&mut deck, Decision::Stand).unwrap();
        let last = round.step(&mut deck, Decision::Stand).unwrap();
        assert_eq!(last.events, vec![(RoundResult::Win, c(KING, Suit::Diamond))]);
    }

    #[test]
    fn over_reemits_final_outcome() {
        let mut deck = scenario_deck(&[]);
        let mut round = Round::new();
        round.start(&mut deck).unwrap();
        round.step(&mut deck, Decision::Stand).unwrap();
        let last = round.step(&mut deck, Decision::Stand).unwrap();

        for decision in [Decision::Hit, Decision::Stand] {
            let again = round.step(&mut deck, decision).unwrap();
            assert_eq!(again.events, last.events);
            assert_eq!(again.next, last.next);
        }
        assert_eq!(round.hands().player.len(), 2);
        assert_eq!(deck.drawn(), 4);
    }

    #[test]
    fn start_and_step_are_ordered() {
        let mut deck = Deck::seeded(5);
        let mut round = Round::new();
        assert_eq!(round.step(&mut deck, Decision::Hit), Err(RoundError::NotStarted));
        round.start(&mut deck).unwrap();
        assert_eq!(round.start(&mut deck), Err(RoundError::AlreadyStarted));
    }

    #[test]
    fn same_deck_and_decisions_replay_identically() {
        fn play(seed: u64) -> Vec<CardEvent> {
            let mut deck = Deck::seeded(seed);
            let mut events = Vec::new();
            for _ in 0..20 {
                let mut round = Round::new();
                events.extend(round.start(&mut deck).unwrap());
                let mut decisions = [Decision::Hit, Decision::Hit, Decision::Stand].into_iter();
                while round.result().is_none() {
                    let decision = decisions.next().unwrap_or(Decision::Stand);
                    events.extend(round.step(&mut deck, decision).unwrap().events);
                }
            }
            events
        }

        assert_eq!(play(99), play(99));
    }

    #[test]
    fn outcome_rules() {
        let hands = |player: Vec<Card>, dealer: Vec<Card>| Hands {
            player: player.into(),
            dealer: dealer.into(),
        };
        let ten = c(10, Suit::Heart);
        let nine = c(9, Suit::Heart);
        let five = c(5, Suit::Heart);

        assert_eq!(hands(vec![ten, nine], vec![ten, five]).outcome(), RoundResult::Win);
        assert_eq!(hands(vec![ten, five], vec![ten, nine]).outcome(), RoundResult::Loss);
        assert_eq!(hands(vec![ten, nine], vec![ten, nine]).outcome(), RoundResult::Tie);
        assert_eq!(
            hands(vec![ten, five, nine], vec![ten, five, nine]).outcome(),
            RoundResult::Loss
        );
        assert_eq!(hands(vec![ten, five], vec![ten, five, nine]).outcome(), RoundResult::Win);
    }
}
