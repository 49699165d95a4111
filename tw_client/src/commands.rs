use log::warn;
use std::{
    fmt,
    io::{self, BufRead, Write},
};
use twentyone::{
    bot::{CardCounter, Strategy},
    entities::{Card, Decision, Hand},
};

/// Errors that can occur while parsing user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Round count that isn't a number.
    InvalidRounds(String),
    /// Round count outside 1-255.
    RoundsOutOfRange(u64),
    /// Anything other than hit or stand.
    UnrecognizedDecision(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRounds(value) => write!(
                f,
                "Invalid round count '{value}'. Must be a whole number (e.g., '10')"
            ),
            Self::RoundsOutOfRange(value) => {
                write!(f, "Round count {value} is out of range. Must be 1 to 255")
            }
            Self::UnrecognizedDecision(value) => write!(
                f,
                "Unrecognized decision '{value}'. Type 'hit' (h) or 'stand' (s)"
            ),
        }
    }
}

impl std::error::Error for ParseError {}

/// Parse a round count.
///
/// # Examples
///
/// ```
/// use tw_client::commands::parse_rounds;
///
/// assert_eq!(parse_rounds(" 3 "), Ok(3));
/// assert!(parse_rounds("0").is_err());
/// assert!(parse_rounds("256").is_err());
/// ```
pub fn parse_rounds(input: &str) -> Result<u8, ParseError> {
    let trimmed = input.trim();
    let value = trimmed
        .parse::<u64>()
        .map_err(|_| ParseError::InvalidRounds(trimmed.to_string()))?;
    match u8::try_from(value) {
        Ok(rounds) if rounds > 0 => Ok(rounds),
        _ => Err(ParseError::RoundsOutOfRange(value)),
    }
}

/// Parse a hit or stand, case-insensitively.
pub fn parse_decision(input: &str) -> Result<Decision, ParseError> {
    let trimmed = input.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "h" | "hit" => Ok(Decision::Hit),
        "s" | "stand" => Ok(Decision::Stand),
        _ => Err(ParseError::UnrecognizedDecision(trimmed.to_string())),
    }
}

fn read_line<R: BufRead>(input: &mut R) -> io::Result<String> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(io::ErrorKind::UnexpectedEof.into());
    }
    Ok(line)
}

/// Ask for a round count until a valid one is entered.
///
/// # Errors
///
/// Returns an error if input ends or can't be read.
pub fn prompt_rounds<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> io::Result<u8> {
    loop {
        write!(output, "How many rounds? ")?;
        output.flush()?;
        match parse_rounds(&read_line(input)?) {
            Ok(rounds) => return Ok(rounds),
            Err(error) => writeln!(output, "{error}")?,
        }
    }
}

/// Use `rounds` when given, otherwise ask for it once.
///
/// # Errors
///
/// Returns an error if input ends or can't be read.
pub fn rounds_or_prompt<R: BufRead, W: Write>(
    rounds: Option<u8>,
    input: &mut R,
    output: &mut W,
) -> io::Result<u8> {
    match rounds {
        Some(rounds) => Ok(rounds),
        None => prompt_rounds(input, output),
    }
}

/// Asks a human for every decision.
pub struct PromptStrategy<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptStrategy<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// [`rounds_or_prompt`] on the same input and output.
    ///
    /// # Errors
    ///
    /// Returns an error if input ends or can't be read.
    pub fn ask_rounds(&mut self, rounds: Option<u8>) -> io::Result<u8> {
        rounds_or_prompt(rounds, &mut self.input, &mut self.output)
    }

    fn prompt(
        &mut self,
        player: &Hand,
        dealer_up: Option<Card>,
        counter: &CardCounter,
    ) -> io::Result<Decision> {
        let ranks: Vec<_> = player.ranks().collect();
        writeln!(self.output, "Your hand:{player}")?;
        if let Some(card) = dealer_up {
            writeln!(self.output, "Dealer shows:{card}")?;
        }
        writeln!(
            self.output,
            "Bust chance if you hit: {:.0}%",
            counter.bust_probability_if_hit(&ranks) * 100.0
        )?;
        loop {
            write!(self.output, "Hit or stand? ")?;
            self.output.flush()?;
            match parse_decision(&read_line(&mut self.input)?) {
                Ok(decision) => return Ok(decision),
                Err(error) => writeln!(self.output, "{error}")?,
            }
        }
    }
}

impl<R: BufRead, W: Write> Strategy for PromptStrategy<R, W> {
    fn decide(&mut self, player: &Hand, dealer_up: Option<Card>, counter: &CardCounter) -> Decision {
        match self.prompt(player, dealer_up, counter) {
            Ok(decision) => decision,
            Err(error) => {
                warn!("no decision from input ({error}), standing");
                Decision::Stand
            }
        }
    }
}
