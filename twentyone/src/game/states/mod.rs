//! Phase definitions for the round FSM.
//!
//! Each phase is a marker for where a round is in its lifecycle. The
//! transition logic lives with the [`RoundStep`](super::state_machine::RoundStep)
//! implementations.

use crate::game::entities::RoundResult;

/// Nothing has been dealt yet.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Init;

/// Waiting for the player to hit or stand.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PlayerTurn;

/// The dealer's hole card is revealed and the dealer acts one card at a
/// time.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DealerTurn;

/// Both hands are settled.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Over {
    pub result: RoundResult,
}
