//! Broadcast/accept loop and per-connection session handling.
//!
//! While idle the server re-broadcasts its offer every
//! [`TableConfig::offer_interval`] and waits on `mio` readiness for
//! incoming connections. A connection is served to completion on the same
//! thread before the loop resumes, so sessions never overlap.

use anyhow::Error;
use log::{debug, info, warn};
use mio::{Events, Interest, Poll, Token};
use std::{
    fmt,
    io::{self, Read, Write},
    net::{Ipv4Addr, Shutdown, SocketAddr, SocketAddrV4, TcpListener, TcpStream, UdpSocket},
    time::{Duration, Instant},
};

use super::{
    super::game::{
        Round,
        entities::{Deck, Decision, RoundResult},
    },
    errors::ProtocolError,
    messages::{ClientDecision, DISCOVERY_PORT, Message, Offer, Request, ServerPayload},
    utils,
};

pub const DEFAULT_SERVER_NAME: &str = "Dealer";
pub const DEFAULT_OFFER_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

const LISTENER: Token = Token(0);
const EVENTS_CAPACITY: usize = 16;

/// Runtime settings for one server.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TableConfig {
    /// Advertised in every offer.
    pub name: String,
    /// Where offers are sent.
    pub broadcast: SocketAddr,
    pub offer_interval: Duration,
    /// Applied to both directions of every accepted stream. `None` blocks
    /// forever on a stalled client.
    pub read_timeout: Option<Duration>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_SERVER_NAME.to_string(),
            broadcast: SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::BROADCAST, DISCOVERY_PORT)),
            offer_interval: DEFAULT_OFFER_INTERVAL,
            read_timeout: Some(DEFAULT_READ_TIMEOUT),
        }
    }
}

/// A finished session.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Session {
    pub team_name: String,
    pub rounds: u8,
    /// One entry per round, from the player's point of view.
    pub results: Vec<RoundResult>,
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = |result: RoundResult| self.results.iter().filter(|&&r| r == result).count();
        write!(
            f,
            "{}: {} rounds, {} player wins, {} ties, {} dealer wins",
            self.team_name,
            self.results.len(),
            count(RoundResult::Win),
            count(RoundResult::Tie),
            count(RoundResult::Loss)
        )
    }
}

/// Plays one round over `stream`, returning its result.
///
/// Events are sent in the order the round produces them and the round stops
/// at the first one that isn't [`RoundResult::NotOver`]. A decision is read
/// only while it's the player's turn.
///
/// # Errors
///
/// Returns an error if the stream fails or the client sends an invalid
/// decision.
pub fn play_round<S: Read + Write>(
    stream: &mut S,
    deck: &mut Deck,
) -> Result<RoundResult, ProtocolError> {
    let mut round = Round::new();
    let mut events = round.start(deck)?;
    loop {
        for (result, card) in events {
            utils::write_message(stream, &ServerPayload { result, card })?;
            if result.is_over() {
                return Ok(result);
            }
        }
        let decision = if round.is_player_turn() {
            let ClientDecision(decision) = utils::read_message(stream)?;
            debug!("player chose {decision}");
            decision
        } else {
            Decision::Stand
        };
        events = round.step(deck, decision)?.events;
    }
}

/// Reads the session request and plays every requested round with `deck`.
///
/// # Errors
///
/// Returns the first protocol error. Results of rounds played before it
/// are dropped.
pub fn serve<S: Read + Write>(stream: &mut S, deck: &mut Deck) -> Result<Session, ProtocolError> {
    let Request { rounds, team_name } = utils::read_message(stream)?;
    info!("{team_name} requested {rounds} rounds");
    let mut results = Vec::with_capacity(usize::from(rounds));
    for round in 1..=rounds {
        let result = play_round(stream, deck)?;
        debug!("{team_name} round {round}/{rounds}: {result}");
        results.push(result);
    }
    Ok(Session {
        team_name,
        rounds,
        results,
    })
}

/// A bound server that hasn't started its loop yet.
pub struct Server {
    listener: TcpListener,
    offers: UdpSocket,
    offer: Vec<u8>,
    config: TableConfig,
}

impl Server {
    /// Binds the TCP listener and the socket offers are sent from. The
    /// offer advertises whatever port the listener ended up on.
    ///
    /// # Errors
    ///
    /// Returns an error if either socket can't be set up.
    pub fn bind(addr: SocketAddr, config: TableConfig) -> Result<Self, Error> {
        let listener = TcpListener::bind(addr)?;
        listener.set_nonblocking(true)?;
        let offers = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
        offers.set_broadcast(true)?;
        let offer = Offer {
            tcp_port: listener.local_addr()?.port(),
            name: config.name.clone(),
        };
        Ok(Self {
            listener,
            offers,
            offer: offer.encode(),
            config,
        })
    }

    /// # Errors
    ///
    /// Returns an error if the listener has no local address.
    pub fn local_addr(&self) -> Result<SocketAddr, Error> {
        Ok(self.listener.local_addr()?)
    }

    /// Broadcasts and serves sessions until polling fails.
    ///
    /// # Errors
    ///
    /// Returns an error if the poll registry can't be set up or polling
    /// itself fails. Session failures are logged and never returned.
    pub fn run(self) -> Result<(), Error> {
        let mut poll = Poll::new()?;
        let mut events = Events::with_capacity(EVENTS_CAPACITY);
        let mut registered = mio::net::TcpListener::from_std(self.listener.try_clone()?);
        poll.registry()
            .register(&mut registered, LISTENER, Interest::READABLE)?;

        info!(
            "{} listening on {}, offering to {}",
            self.config.name,
            self.local_addr()?,
            self.config.broadcast
        );

        let mut next_offer = Instant::now();
        loop {
            if Instant::now() >= next_offer {
                self.broadcast_offer();
                next_offer = Instant::now() + self.config.offer_interval;
            }

            let timeout = next_offer.saturating_duration_since(Instant::now());
            if let Err(error) = poll.poll(&mut events, Some(timeout)) {
                if error.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(error.into());
            }

            for event in &events {
                if event.token() == LISTENER {
                    self.accept_all();
                }
            }
        }
    }

    fn broadcast_offer(&self) {
        if let Err(error) = self.offers.send_to(&self.offer, self.config.broadcast) {
            warn!("failed to send offer to {}: {error}", self.config.broadcast);
        }
    }

    /// Accepts until the backlog is empty; readiness is edge-triggered.
    fn accept_all(&self) {
        loop {
            match self.listener.accept() {
                Ok((stream, peer)) => self.handle_connection(stream, peer),
                Err(error) if error.kind() == io::ErrorKind::WouldBlock => return,
                Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
                Err(error) => {
                    warn!("accept failed: {error}");
                    return;
                }
            }
        }
    }

    fn handle_connection(&self, mut stream: TcpStream, peer: SocketAddr) {
        info!("accepted connection from {peer}");
        if let Err(error) = self.configure(&stream) {
            warn!("{peer}: couldn't configure stream: {error}");
            return;
        }
        let mut deck = Deck::new();
        match serve(&mut stream, &mut deck) {
            Ok(session) => info!("{peer}: session over, {session}"),
            Err(ProtocolError::Invalid(error)) => warn!("{peer}: {error}, closing"),
            Err(error) => warn!("{peer}: session aborted: {error}"),
        }
        if let Err(error) = stream.shutdown(Shutdown::Both) {
            debug!("{peer}: shutdown: {error}");
        }
    }

    fn configure(&self, stream: &TcpStream) -> io::Result<()> {
        stream.set_nonblocking(false)?;
        stream.set_read_timeout(self.config.read_timeout)?;
        stream.set_write_timeout(self.config.read_timeout)?;
        stream.set_nodelay(true)
    }
}

/// Binds `addr` and runs the server loop.
///
/// # Errors
///
/// See [`Server::bind`] and [`Server::run`].
pub fn run(addr: SocketAddr, config: TableConfig) -> Result<(), Error> {
    Server::bind(addr, config)?.run()
}
