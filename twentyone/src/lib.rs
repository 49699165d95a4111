//! # Twentyone
//!
//! A blackjack discovery and session protocol with a server-authoritative
//! round engine and a card-counting player.
//!
//! A server broadcasts UDP offers while idle. A client picks up the first
//! valid offer, connects over TCP, requests a number of rounds, and then
//! the two exchange fixed-length binary messages until every round is
//! settled.
//!
//! ## Round phases
//!
//! - **Init**: two cards each; the player's cards and the dealer's upcard
//!   are sent
//! - **PlayerTurn**: one card per `Hit`, until a bust or a `Stand`
//! - **DealerTurn**: the hole card is revealed, then the dealer draws one
//!   card per step until reaching 17
//! - **Over**: the result is sent on the last card
//!
//! ## Core Modules
//!
//! - [`game`]: Cards, deck, hands, and the round state machine
//! - [`bot`]: Remaining-card model and hit/stand strategies
//! - [`net`]: Wire codec, framing, client, and server
//!
//! ## Example
//!
//! ```
//! use twentyone::{Round, entities::Deck};
//!
//! let mut deck = Deck::seeded(42);
//! let mut round = Round::new();
//! let events = round.start(&mut deck).unwrap();
//! assert_eq!(events.len(), 3);
//! assert!(round.is_player_turn());
//! ```

/// Networking components for discovery and sessions.
pub mod net;
pub use net::{client::Client, errors, messages, server, utils};

/// Core game logic, entities, and state machine.
pub mod game;
pub use game::{Phase, Round, RoundError, entities};

/// Player-side card counting and decision making.
pub mod bot;
