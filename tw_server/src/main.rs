//! Blackjack dealer server.
//!
//! Broadcasts offers while idle and plays one client's session at a time.

mod config;
mod logging;

use std::net::SocketAddr;

use anyhow::Error;
use ctrlc::set_handler;
use pico_args::Arguments;
use twentyone::server;

use config::{Overrides, ServerConfig};

const HELP: &str = "\
Run a blackjack dealer server

USAGE:
  tw_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     TCP listen address          [default: env TW_BIND or 0.0.0.0:0]
  --name       NAME        Name advertised in offers   [default: env TW_SERVER_NAME or Dealer]
  --broadcast  IP:PORT     Where offers are sent       [default: env TW_BROADCAST or 255.255.255.255:13122]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  TW_OFFER_INTERVAL_MS     Milliseconds between offers [default: 1000]
  TW_READ_TIMEOUT_SECS     Per-read client timeout, 0 to disable [default: 30]
  RUST_LOG                 Log filter [default: info]
  (A .env file in the working directory is read first)
";

fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let overrides = Overrides {
        bind: pargs.opt_value_from_str::<_, SocketAddr>("--bind")?,
        name: pargs.opt_value_from_str("--name")?,
        broadcast: pargs.opt_value_from_str::<_, SocketAddr>("--broadcast")?,
    };
    let config = ServerConfig::from_env(overrides)?;

    // Catching signals for exit.
    set_handler(|| std::process::exit(0))?;

    logging::init();
    tracing::info!(
        bind = %config.bind,
        name = %config.table.name,
        broadcast = %config.table.broadcast,
        "Starting blackjack server"
    );

    server::run(config.bind, config.table)
}
