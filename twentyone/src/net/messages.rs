use std::fmt;

use super::errors::InvalidMessage;
use crate::game::entities::{ACE, Card, Decision, KING, RoundResult, Suit};

/// Leading four bytes of every message.
pub const MAGIC_COOKIE: u32 = 0xabcd_dcba;

/// UDP port clients listen on for offers.
pub const DISCOVERY_PORT: u16 = 13122;

pub const OFFER_TAG: u8 = 0x2;
pub const REQUEST_TAG: u8 = 0x3;
pub const PAYLOAD_TAG: u8 = 0x4;

/// Width of the fixed server and team name fields.
pub const NAME_LEN: usize = 32;

/// Cookie plus tag.
const HEADER_LEN: usize = 5;

const HIT: &[u8; 5] = b"Hittt";
const STAND: &[u8; 5] = b"Stand";

/// A fixed-length protocol message.
///
/// Every message is the magic cookie, a one-byte tag, and a body. Decoding
/// accepts a buffer only if its length, cookie, tag, and every field check
/// out, and otherwise reports a uniform [`InvalidMessage`].
pub trait Message: Sized {
    /// Total encoded length in bytes.
    const LEN: usize;
    const TAG: u8;

    fn encode_body(&self, buf: &mut Vec<u8>);

    /// Decodes a body of exactly `LEN - 5` bytes.
    fn decode_body(body: &[u8]) -> Result<Self, InvalidMessage>;

    fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::LEN);
        buf.extend_from_slice(&MAGIC_COOKIE.to_be_bytes());
        buf.push(Self::TAG);
        self.encode_body(&mut buf);
        buf
    }

    fn decode(buf: &[u8]) -> Result<Self, InvalidMessage> {
        if buf.len() != Self::LEN {
            return Err(InvalidMessage);
        }
        let cookie: [u8; 4] = field(buf, 0)?;
        if u32::from_be_bytes(cookie) != MAGIC_COOKIE || buf[4] != Self::TAG {
            return Err(InvalidMessage);
        }
        Self::decode_body(&buf[HEADER_LEN..])
    }
}

fn field<const N: usize>(buf: &[u8], at: usize) -> Result<[u8; N], InvalidMessage> {
    buf.get(at..at + N)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or(InvalidMessage)
}

/// Truncates `name` to 32 bytes and zero-pads the rest.
#[must_use]
pub fn encode_name(name: &str) -> [u8; NAME_LEN] {
    let mut field = [0; NAME_LEN];
    let bytes = name.as_bytes();
    let len = bytes.len().min(NAME_LEN);
    field[..len].copy_from_slice(&bytes[..len]);
    field
}

/// Reads a name up to the first zero byte.
#[must_use]
pub fn decode_name(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}

/// Server advertisement, broadcast over UDP while the server is idle.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Offer {
    pub tcp_port: u16,
    pub name: String,
}

impl Message for Offer {
    const LEN: usize = HEADER_LEN + 2 + NAME_LEN;
    const TAG: u8 = OFFER_TAG;

    fn encode_body(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.tcp_port.to_be_bytes());
        buf.extend_from_slice(&encode_name(&self.name));
    }

    fn decode_body(body: &[u8]) -> Result<Self, InvalidMessage> {
        let port: [u8; 2] = field(body, 0)?;
        let name: [u8; NAME_LEN] = field(body, 2)?;
        Ok(Self {
            tcp_port: u16::from_be_bytes(port),
            name: decode_name(&name),
        })
    }
}

impl fmt::Display for Offer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "offer from '{}' on port {}", self.name, self.tcp_port)
    }
}

/// Opens a session: how many rounds to play and who's playing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Request {
    pub rounds: u8,
    pub team_name: String,
}

impl Message for Request {
    const LEN: usize = HEADER_LEN + 1 + NAME_LEN;
    const TAG: u8 = REQUEST_TAG;

    fn encode_body(&self, buf: &mut Vec<u8>) {
        buf.push(self.rounds);
        buf.extend_from_slice(&encode_name(&self.team_name));
    }

    fn decode_body(body: &[u8]) -> Result<Self, InvalidMessage> {
        let [rounds]: [u8; 1] = field(body, 0)?;
        let name: [u8; NAME_LEN] = field(body, 1)?;
        Ok(Self {
            rounds,
            team_name: decode_name(&name),
        })
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "'{}' requested {} round(s)", self.team_name, self.rounds)
    }
}

/// The player's hit or stand.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ClientDecision(pub Decision);

impl Message for ClientDecision {
    const LEN: usize = HEADER_LEN + 5;
    const TAG: u8 = PAYLOAD_TAG;

    fn encode_body(&self, buf: &mut Vec<u8>) {
        let literal = match self.0 {
            Decision::Hit => HIT,
            Decision::Stand => STAND,
        };
        buf.extend_from_slice(literal);
    }

    fn decode_body(body: &[u8]) -> Result<Self, InvalidMessage> {
        match &field::<5>(body, 0)? {
            HIT => Ok(Self(Decision::Hit)),
            STAND => Ok(Self(Decision::Stand)),
            _ => Err(InvalidMessage),
        }
    }
}

/// A card event: the card and whether it ended the round.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ServerPayload {
    pub result: RoundResult,
    pub card: Card,
}

impl Message for ServerPayload {
    const LEN: usize = HEADER_LEN + 1 + 2 + 1;
    const TAG: u8 = PAYLOAD_TAG;

    fn encode_body(&self, buf: &mut Vec<u8>) {
        buf.push(self.result.into());
        buf.extend_from_slice(&u16::from(self.card.rank()).to_be_bytes());
        buf.push(self.card.suit().into());
    }

    fn decode_body(body: &[u8]) -> Result<Self, InvalidMessage> {
        let [result, rank_hi, rank_lo, suit]: [u8; 4] = field(body, 0)?;
        let result = RoundResult::try_from(result).map_err(|_| InvalidMessage)?;
        let suit = Suit::try_from(suit).map_err(|_| InvalidMessage)?;
        let rank = u16::from_be_bytes([rank_hi, rank_lo]);
        if !(u16::from(ACE)..=u16::from(KING)).contains(&rank) {
            return Err(InvalidMessage);
        }
        Ok(Self {
            result,
            card: Card(rank as u8, suit),
        })
    }
}

impl From<(RoundResult, Card)> for ServerPayload {
    fn from((result, card): (RoundResult, Card)) -> Self {
        Self { result, card }
    }
}

impl fmt::Display for ServerPayload {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.card, self.result)
    }
}
