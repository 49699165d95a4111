//! Blackjack round engine.
//!
//! This module provides the server-authoritative game implementation:
//! - Cards, hands, and a self-reshuffling deck
//! - A resumable finite state machine for one round
//! - Outcome evaluation with a fixed dealer policy

pub mod entities;
pub mod state_machine;
pub mod states;

pub use state_machine::{CardEvent, Hands, Phase, Round, RoundError, RoundStep, Transition};
