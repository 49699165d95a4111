/// Integration tests for discovery and full sessions
///
/// Each test runs a real server thread on a random loopback port and
/// talks to it with the blocking client or a raw stream.
use mio::net::TcpListener;
use std::{
    io::Write,
    net::{SocketAddr, TcpStream},
    thread,
    time::Duration,
};

use twentyone::{
    Client,
    bot::{CardCounter, StatisticalStrategy, Strategy},
    entities::{Card, Decision, Hand, RoundResult},
    messages::{ClientDecision, Message, Request, ServerPayload},
    net::client::Discovery,
    server::{self, TableConfig},
    utils,
};

fn get_random_open_port() -> u16 {
    let addr = "127.0.0.1:0".parse().unwrap();
    let listener = TcpListener::bind(addr).unwrap();
    listener.local_addr().unwrap().port()
}

fn quiet_config() -> TableConfig {
    TableConfig {
        name: "Integration".to_string(),
        broadcast: "127.0.0.1:9".parse().unwrap(),
        offer_interval: Duration::from_millis(100),
        read_timeout: Some(Duration::from_secs(5)),
    }
}

fn spawn_server(config: TableConfig) -> SocketAddr {
    let port = get_random_open_port();
    let addr: SocketAddr = format!("127.0.0.1:{port}").parse().unwrap();
    thread::spawn(move || server::run(addr, config));
    thread::sleep(Duration::from_millis(50));
    addr
}

fn raw_session(addr: &SocketAddr, rounds: u8) -> TcpStream {
    let mut stream = TcpStream::connect(addr).unwrap();
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    let request = Request {
        rounds,
        team_name: "Raw".to_string(),
    };
    utils::write_message(&mut stream, &request).unwrap();
    stream
}

/// Stands on everything and remembers how often it was asked.
#[derive(Default)]
struct AlwaysStand {
    asked: usize,
}

impl Strategy for AlwaysStand {
    fn decide(&mut self, _: &Hand, _: Option<Card>, _: &CardCounter) -> Decision {
        self.asked += 1;
        Decision::Stand
    }
}

#[test]
fn test_full_session_with_statistical_strategy() {
    let addr = spawn_server(quiet_config());

    let mut client = Client::connect(&addr, 5, "Team Rust").unwrap();
    let report = client
        .play_session(&mut StatisticalStrategy::default())
        .unwrap();

    assert_eq!(report.results.len(), 5);
    assert!(report.results.iter().all(RoundResult::is_over));
    assert_eq!(report.wins() + report.ties() + report.losses(), 5);
    assert!(client.counter().total_remaining() < 52);
}

#[test]
fn test_always_stand_is_asked_once_per_round() {
    let addr = spawn_server(quiet_config());

    let mut strategy = AlwaysStand::default();
    let mut client = Client::connect(&addr, 3, "Stander").unwrap();
    let report = client.play_session(&mut strategy).unwrap();

    assert_eq!(report.results.len(), 3);
    assert_eq!(strategy.asked, 3);
}

#[test]
fn test_discovery_finds_server_and_plays() {
    let discovery = Discovery::bind(0).unwrap();
    let discovery_port = discovery.local_addr().unwrap().port();
    let config = TableConfig {
        broadcast: format!("127.0.0.1:{discovery_port}").parse().unwrap(),
        ..quiet_config()
    };
    let addr = spawn_server(config);

    let offer = discovery.next_offer(Some(Duration::from_secs(5))).unwrap();
    assert_eq!(offer.name, "Integration");
    assert_eq!(offer.addr.port(), addr.port());

    let mut client = Client::connect(&offer.addr, 1, "Finder").unwrap();
    let report = client
        .play_session(&mut StatisticalStrategy::default())
        .unwrap();
    assert_eq!(report.results.len(), 1);
}

#[test]
fn test_offers_repeat_while_idle() {
    let discovery = Discovery::bind(0).unwrap();
    let discovery_port = discovery.local_addr().unwrap().port();
    let config = TableConfig {
        broadcast: format!("127.0.0.1:{discovery_port}").parse().unwrap(),
        ..quiet_config()
    };
    spawn_server(config);

    for _ in 0..3 {
        let offer = discovery.next_offer(Some(Duration::from_secs(5))).unwrap();
        assert_eq!(offer.name, "Integration");
    }
}

#[test]
fn test_initial_deal_is_three_cards() {
    let addr = spawn_server(quiet_config());
    let mut stream = raw_session(&addr, 1);

    for _ in 0..3 {
        let payload: ServerPayload = utils::read_message(&mut stream).unwrap();
        assert_eq!(payload.result, RoundResult::NotOver);
    }
}

#[test]
fn test_invalid_request_closes_connection() {
    let addr = spawn_server(quiet_config());

    let mut stream = TcpStream::connect(addr).unwrap();
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    stream.write_all(&[0; Request::LEN]).unwrap();
    assert!(utils::read_message::<ServerPayload, _>(&mut stream).is_err());

    // The server goes back to serving.
    let mut client = Client::connect(&addr, 1, "Next").unwrap();
    assert!(client.play_session(&mut AlwaysStand::default()).is_ok());
}

#[test]
fn test_invalid_decision_aborts_session() {
    let addr = spawn_server(quiet_config());
    let mut stream = raw_session(&addr, 3);

    for _ in 0..3 {
        utils::read_message::<ServerPayload, _>(&mut stream).unwrap();
    }
    let mut bad = ClientDecision(Decision::Hit).encode();
    bad[5..].copy_from_slice(b"Hitme");
    stream.write_all(&bad).unwrap();
    assert!(utils::read_message::<ServerPayload, _>(&mut stream).is_err());

    let mut client = Client::connect(&addr, 1, "Next").unwrap();
    assert!(client.play_session(&mut AlwaysStand::default()).is_ok());
}

#[test]
fn test_zero_rounds_closes_without_payloads() {
    let addr = spawn_server(quiet_config());
    let mut stream = raw_session(&addr, 0);
    assert!(utils::read_message::<ServerPayload, _>(&mut stream).is_err());
}

#[test]
fn test_sessions_are_served_one_after_another() {
    let addr = spawn_server(quiet_config());

    for team in ["First", "Second", "Third"] {
        let mut client = Client::connect(&addr, 2, team).unwrap();
        let report = client.play_session(&mut AlwaysStand::default()).unwrap();
        assert_eq!(report.results.len(), 2);
    }
}
