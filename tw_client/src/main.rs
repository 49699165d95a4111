//! A blackjack player client.
//!
//! The client listens for server offers, connects to the first one it
//! hears, plays the requested rounds, prints a summary, and goes back to
//! listening. Session failures are reported and never end the process.

use anyhow::{Context, Error};
use ctrlc::set_handler;
use log::{info, warn};
use pico_args::Arguments;
use std::io;
use twentyone::{
    Client,
    bot::{StatisticalStrategy, Strategy},
    messages::DISCOVERY_PORT,
    net::client::Discovery,
};

use tw_client::commands::{PromptStrategy, parse_rounds, rounds_or_prompt};

const HELP: &str = "\
Play blackjack against a discovered dealer

USAGE:
  tw_client [OPTIONS]

OPTIONS:
  --team       NAME        Team name sent to the server  [default: env TW_TEAM_NAME or Team Rust]
  --rounds     N           Rounds per session, 1-255     [default: ask once at startup]
  --port       PORT        Discovery port                [default: 13122]

FLAGS:
  --manual                 Decide hit/stand yourself instead of the bot
  -h, --help               Print help information
";

const DEFAULT_TEAM_NAME: &str = "Team Rust";

struct Args {
    team: String,
    rounds: Option<u8>,
    port: u16,
    manual: bool,
}

fn main() -> Result<(), Error> {
    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let rounds = pargs
        .opt_value_from_str::<_, String>("--rounds")?
        .map(|value| parse_rounds(&value))
        .transpose()?;
    let args = Args {
        team: pargs
            .opt_value_from_str("--team")?
            .or_else(|| std::env::var("TW_TEAM_NAME").ok())
            .unwrap_or_else(|| DEFAULT_TEAM_NAME.to_string()),
        rounds,
        port: pargs
            .opt_value_from_str("--port")?
            .unwrap_or(DISCOVERY_PORT),
        manual: pargs.contains("--manual"),
    };

    // Catching signals for exit.
    set_handler(|| std::process::exit(0))?;

    env_logger::builder().format_target(false).init();

    let discovery = Discovery::bind(args.port)
        .with_context(|| format!("couldn't listen for offers on port {}", args.port))?;

    if args.manual {
        let mut strategy = PromptStrategy::new(io::stdin().lock(), io::stdout());
        let rounds = strategy.ask_rounds(args.rounds)?;
        session_loop(&discovery, &args, rounds, &mut strategy)
    } else {
        let rounds =
            rounds_or_prompt(args.rounds, &mut io::stdin().lock(), &mut io::stdout())?;
        session_loop(
            &discovery,
            &args,
            rounds,
            &mut StatisticalStrategy::default(),
        )
    }
}

/// Plays sessions of `rounds` rounds forever.
fn session_loop<S: Strategy>(
    discovery: &Discovery,
    args: &Args,
    rounds: u8,
    strategy: &mut S,
) -> Result<(), Error> {
    loop {
        info!("{} listening for offers on port {}", args.team, args.port);
        if let Err(error) = play(discovery, &args.team, rounds, strategy) {
            warn!("session failed: {error:#}");
        }
    }
}

/// Waits for an offer and plays one full session against it.
fn play<S: Strategy>(
    discovery: &Discovery,
    team: &str,
    rounds: u8,
    strategy: &mut S,
) -> Result<(), Error> {
    let offer = discovery.next_offer(None)?;
    info!("received offer from {offer}");

    let mut client = Client::connect(&offer.addr, rounds, team)?;
    let report = client.play_session(strategy)?;
    println!("Finished playing against {}: {report}", offer.name);
    Ok(())
}
