//! A blocking blackjack client.
//!
//! Discovery listens for UDP offers and hands back the first valid one;
//! [`Client`] then plays a whole session over TCP, keeping one
//! [`CardCounter`] for every round it plays.

use anyhow::{Error, bail};
use log::{debug, info};
use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use std::{
    fmt,
    net::{Ipv4Addr, SocketAddr, TcpStream, UdpSocket},
    thread,
    time::Duration,
};

use super::{
    super::{
        bot::{CardCounter, Strategy},
        game::entities::{Card, Decision, Hand, RoundResult},
    },
    errors::ProtocolError,
    messages::{ClientDecision, Message, Offer, Request, ServerPayload},
    utils,
};

/// Default timeout for reading from the server.
pub const READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for writing to the server.
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(1);

/// Large enough for any datagram we care about. Longer ones are truncated
/// and fail the length check.
const DATAGRAM_BUF_LEN: usize = 64;

/// A server found through discovery.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ServerOffer {
    pub name: String,
    /// Sender IP with the advertised TCP port.
    pub addr: SocketAddr,
}

impl fmt::Display for ServerOffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.name, self.addr)
    }
}

/// Listens for server offers on the discovery port.
pub struct Discovery {
    socket: UdpSocket,
}

impl Discovery {
    /// Binds the wildcard address on `port`. The port is shared, so
    /// several clients on one host can listen at once.
    ///
    /// # Errors
    ///
    /// Returns an error if the port can't be bound.
    pub fn bind(port: u16) -> Result<Self, Error> {
        let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
        socket.set_reuse_address(true)?;
        #[cfg(unix)]
        socket.set_reuse_port(true)?;
        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
        socket.bind(&SockAddr::from(addr))?;
        Ok(Self {
            socket: socket.into(),
        })
    }

    /// # Errors
    ///
    /// Returns an error if the socket has no local address.
    pub fn local_addr(&self) -> Result<SocketAddr, Error> {
        Ok(self.socket.local_addr()?)
    }

    /// Waits for the next valid offer. Anything else arriving on the port
    /// is skipped.
    ///
    /// # Errors
    ///
    /// Returns an error when `timeout` elapses without a valid offer or the
    /// socket fails.
    pub fn next_offer(&self, timeout: Option<Duration>) -> Result<ServerOffer, Error> {
        self.socket.set_read_timeout(timeout)?;
        let mut buf = [0; DATAGRAM_BUF_LEN];
        loop {
            let (len, src) = self.socket.recv_from(&mut buf)?;
            match Offer::decode(&buf[..len]) {
                Ok(offer) => {
                    return Ok(ServerOffer {
                        name: offer.name,
                        addr: SocketAddr::new(src.ip(), offer.tcp_port),
                    });
                }
                Err(error) => debug!("ignoring {len}-byte datagram from {src}: {error}"),
            }
        }
    }
}

/// Both hands as the client saw them, plus the final result.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoundReport {
    pub player: Hand,
    pub dealer: Hand,
    pub result: RoundResult,
}

impl fmt::Display for RoundReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - player{} ({}) vs dealer{} ({})",
            self.result,
            self.player,
            self.player.total(),
            self.dealer,
            self.dealer.total()
        )
    }
}

/// Results of every round played in one session.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SessionReport {
    pub results: Vec<RoundResult>,
}

impl SessionReport {
    fn count(&self, result: RoundResult) -> usize {
        self.results.iter().filter(|&&r| r == result).count()
    }

    #[must_use]
    pub fn wins(&self) -> usize {
        self.count(RoundResult::Win)
    }

    #[must_use]
    pub fn ties(&self) -> usize {
        self.count(RoundResult::Tie)
    }

    #[must_use]
    pub fn losses(&self) -> usize {
        self.count(RoundResult::Loss)
    }

    /// Wins over rounds played, or 0 if nothing was played.
    #[must_use]
    pub fn win_rate(&self) -> f64 {
        if self.results.is_empty() {
            return 0.0;
        }
        self.wins() as f64 / self.results.len() as f64
    }
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rounds: {} wins, {} ties, {} losses, win rate {:.2}",
            self.results.len(),
            self.wins(),
            self.ties(),
            self.losses(),
            self.win_rate()
        )
    }
}

/// A blocking TCP client for one session.
pub struct Client {
    pub team_name: String,
    pub stream: TcpStream,
    pub rounds: u8,
    counter: CardCounter,
}

impl Client {
    /// Connects to a server and sends the session request.
    ///
    /// Tries three times with increasing timeouts (100ms, 500ms, 1s).
    ///
    /// # Errors
    ///
    /// Returns an error if `rounds` is zero, the server can't be reached,
    /// or the request can't be sent.
    pub fn connect(addr: &SocketAddr, rounds: u8, team_name: &str) -> Result<Self, Error> {
        if rounds == 0 {
            bail!("a session needs at least one round");
        }
        let mut connect_timeouts = vec![
            Duration::from_secs(1),
            Duration::from_millis(500),
            Duration::from_millis(100),
        ];
        while let Some(connect_timeout) = connect_timeouts.pop() {
            match TcpStream::connect_timeout(addr, connect_timeout) {
                Ok(mut stream) => {
                    stream.set_read_timeout(Some(READ_TIMEOUT))?;
                    stream.set_write_timeout(Some(WRITE_TIMEOUT))?;
                    let request = Request {
                        rounds,
                        team_name: team_name.to_string(),
                    };
                    utils::write_message(&mut stream, &request)?;
                    info!("connected to {addr}: {request}");
                    return Ok(Self {
                        team_name: team_name.to_string(),
                        stream,
                        rounds,
                        counter: CardCounter::new(),
                    });
                }
                _ => thread::sleep(connect_timeout),
            }
        }
        bail!("couldn't connect to {addr} as {team_name}")
    }

    /// Cards seen so far this session.
    #[must_use]
    pub fn counter(&self) -> &CardCounter {
        &self.counter
    }

    /// # Errors
    ///
    /// Returns an error if the read times out or the bytes don't decode.
    pub fn recv_payload(&mut self) -> Result<ServerPayload, Error> {
        let payload: ServerPayload = utils::read_message(&mut self.stream)?;
        debug!("received {payload}");
        Ok(payload)
    }

    pub fn send_decision(&mut self, decision: Decision) -> Result<(), Error> {
        utils::write_message(&mut self.stream, &ClientDecision(decision))?;
        Ok(())
    }

    fn see(&mut self, hand: &mut Hand, card: Card) {
        self.counter.mark_seen(card.rank());
        hand.push(card);
    }

    /// Plays one round, asking `strategy` for each decision.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails or the server ends the
    /// round during the initial deal.
    pub fn play_round<S: Strategy + ?Sized>(
        &mut self,
        strategy: &mut S,
    ) -> Result<RoundReport, Error> {
        let mut player = Hand::new();
        let mut dealer = Hand::new();

        for dealt in 0..3 {
            let ServerPayload { result, card } = self.recv_payload()?;
            if result.is_over() {
                bail!(ProtocolError::UnexpectedResult(result));
            }
            if dealt < 2 {
                self.see(&mut player, card);
            } else {
                self.see(&mut dealer, card);
            }
        }

        loop {
            let decision = strategy.decide(&player, dealer.first(), &self.counter);
            self.send_decision(decision)?;
            match decision {
                Decision::Hit => {
                    let ServerPayload { result, card } = self.recv_payload()?;
                    self.see(&mut player, card);
                    if result.is_over() {
                        return Ok(RoundReport {
                            player,
                            dealer,
                            result,
                        });
                    }
                }
                Decision::Stand => break,
            }
        }

        loop {
            let ServerPayload { result, card } = self.recv_payload()?;
            if result.is_over() {
                // The final payload repeats the dealer's last card.
                if dealer.last() != Some(card) {
                    self.see(&mut dealer, card);
                }
                return Ok(RoundReport {
                    player,
                    dealer,
                    result,
                });
            }
            self.see(&mut dealer, card);
        }
    }

    /// Plays every requested round. The counter carries across rounds.
    ///
    /// # Errors
    ///
    /// Returns the first round error; earlier results are logged.
    pub fn play_session<S: Strategy + ?Sized>(
        &mut self,
        strategy: &mut S,
    ) -> Result<SessionReport, Error> {
        let mut report = SessionReport::default();
        for round in 1..=self.rounds {
            let played = self.play_round(strategy)?;
            info!("round {round}/{}: {played}", self.rounds);
            report.results.push(played.result);
        }
        Ok(report)
    }
}
