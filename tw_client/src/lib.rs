//! Input handling for the blackjack client.
//!
//! This library provides round-count and decision parsing plus the
//! interactive strategy used by the tw_client binary.

pub mod commands;
