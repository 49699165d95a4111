use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use std::fmt;

/// Number of cards in a full deck.
pub const DECK_SIZE: usize = 52;

/// Highest hand total that isn't a bust.
pub const BLACKJACK: u16 = 21;

/// Dealer stands on any total at or above this, soft totals included.
pub const DEALER_STAND_TOTAL: u16 = 17;

/// Suits in wire order.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(u8)]
pub enum Suit {
    Heart = 0,
    Diamond = 1,
    Club = 2,
    Spade = 3,
}

impl Suit {
    pub const ALL: [Self; 4] = [Self::Heart, Self::Diamond, Self::Club, Self::Spade];
}

impl TryFrom<u8> for Suit {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Heart),
            1 => Ok(Self::Diamond),
            2 => Ok(Self::Club),
            3 => Ok(Self::Spade),
            other => Err(other),
        }
    }
}

impl From<Suit> for u8 {
    fn from(value: Suit) -> Self {
        value as u8
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Heart => "♥",
            Self::Diamond => "♦",
            Self::Club => "♣",
            Self::Spade => "♠",
        };
        write!(f, "{repr}")
    }
}

/// Placeholder for card ranks (ace=1u8 ... king=13u8).
pub type Value = u8;

pub const ACE: Value = 1;
pub const JACK: Value = 11;
pub const QUEEN: Value = 12;
pub const KING: Value = 13;

/// A card is a tuple of a rank and a suit. Cards have no identity beyond
/// those two fields, so a deck holds each combination exactly once.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Card(pub Value, pub Suit);

impl Card {
    #[must_use]
    pub const fn rank(&self) -> Value {
        self.0
    }

    #[must_use]
    pub const fn suit(&self) -> Suit {
        self.1
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let value = match self.0 {
            ACE => "A",
            JACK => "J",
            QUEEN => "Q",
            KING => "K",
            v => &v.to_string(),
        };
        let repr = format!("{value}/{}", self.1);
        write!(f, "{repr:>4}")
    }
}

/// Blackjack points for a single rank with aces counted low.
#[must_use]
pub const fn card_points(rank: Value) -> u16 {
    match rank {
        2..=10 => rank as u16,
        ACE => 1,
        _ => 10,
    }
}

/// Total and softness of a sequence of ranks.
///
/// Every ace counts as 1, then exactly one ace is promoted to 11 when
/// that keeps the total at or below 21. The hand is soft iff the
/// promotion happened.
pub fn hand_value<I>(ranks: I) -> (u16, bool)
where
    I: IntoIterator<Item = Value>,
{
    let mut total = 0;
    let mut has_ace = false;
    for rank in ranks {
        total += card_points(rank);
        has_ace |= rank == ACE;
    }
    if has_ace && total + 10 <= BLACKJACK {
        (total + 10, true)
    } else {
        (total, false)
    }
}

/// Cards held by one party for one round.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    #[must_use]
    pub fn first(&self) -> Option<Card> {
        self.cards.first().copied()
    }

    #[must_use]
    pub fn last(&self) -> Option<Card> {
        self.cards.last().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn ranks(&self) -> impl Iterator<Item = Value> + '_ {
        self.cards.iter().map(Card::rank)
    }

    #[must_use]
    pub fn value(&self) -> (u16, bool) {
        hand_value(self.ranks())
    }

    #[must_use]
    pub fn total(&self) -> u16 {
        self.value().0
    }

    #[must_use]
    pub fn is_soft(&self) -> bool {
        self.value().1
    }

    #[must_use]
    pub fn is_bust(&self) -> bool {
        self.total() > BLACKJACK
    }
}

impl From<Vec<Card>> for Hand {
    fn from(cards: Vec<Card>) -> Self {
        Self { cards }
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for card in &self.cards {
            write!(f, "{card}")?;
        }
        let (total, soft) = self.value();
        let soft = if soft { " soft" } else { "" };
        write!(f, " ({total}{soft})")
    }
}

/// A player's choice during their turn.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Decision {
    Hit,
    Stand,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Hit => "hits",
            Self::Stand => "stands",
        };
        write!(f, "{repr}")
    }
}

/// Result code attached to every card event. These are wire constants.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[repr(u8)]
pub enum RoundResult {
    NotOver = 0,
    Tie = 1,
    Loss = 2,
    Win = 3,
}

impl RoundResult {
    #[must_use]
    pub const fn is_over(&self) -> bool {
        !matches!(self, Self::NotOver)
    }
}

impl TryFrom<u8> for RoundResult {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::NotOver),
            1 => Ok(Self::Tie),
            2 => Ok(Self::Loss),
            3 => Ok(Self::Win),
            other => Err(other),
        }
    }
}

impl From<RoundResult> for u8 {
    fn from(value: RoundResult) -> Self {
        value as u8
    }
}

impl fmt::Display for RoundResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::NotOver => "not over",
            Self::Tie => "tie",
            Self::Loss => "loss",
            Self::Win => "win",
        };
        write!(f, "{repr}")
    }
}

/// A single 52-card deck that reshuffles itself in place once every card
/// has been dealt, so dealing never fails.
#[derive(Debug)]
pub struct Deck {
    cards: [Card; DECK_SIZE],
    deck_idx: usize,
    rng: StdRng,
}

impl Deck {
    #[must_use]
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_os_rng())
    }

    /// A deck whose shuffles are reproducible.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    /// A seeded deck that deals `top` first, in order, followed by the
    /// rest of the deck shuffled. Duplicate cards in `top` are ignored.
    #[must_use]
    pub fn stacked(top: &[Card], seed: u64) -> Self {
        let mut deck = Self {
            cards: ordered_cards(),
            deck_idx: 0,
            rng: StdRng::seed_from_u64(seed),
        };
        let mut placed = 0;
        for card in top {
            if let Some(pos) = deck.cards[placed..].iter().position(|c| c == card) {
                deck.cards.swap(placed, placed + pos);
                placed += 1;
            }
        }
        deck.cards[placed..].shuffle(&mut deck.rng);
        deck
    }

    fn from_rng(rng: StdRng) -> Self {
        let mut deck = Self {
            cards: ordered_cards(),
            deck_idx: 0,
            rng,
        };
        deck.shuffle();
        deck
    }

    pub fn deal_card(&mut self) -> Card {
        if self.deck_idx == DECK_SIZE {
            self.shuffle();
        }
        let card = self.cards[self.deck_idx];
        self.deck_idx += 1;
        card
    }

    /// Restores the full population and permutes it.
    pub fn shuffle(&mut self) {
        self.cards.shuffle(&mut self.rng);
        self.deck_idx = 0;
    }

    #[must_use]
    pub fn drawn(&self) -> usize {
        self.deck_idx
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        DECK_SIZE - self.deck_idx
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}

fn ordered_cards() -> [Card; DECK_SIZE] {
    let mut cards = [Card(ACE, Suit::Heart); DECK_SIZE];
    for (i, value) in (ACE..=KING).enumerate() {
        for (j, suit) in Suit::ALL.into_iter().enumerate() {
            cards[4 * i + j] = Card(value, suit);
        }
    }
    cards
}
