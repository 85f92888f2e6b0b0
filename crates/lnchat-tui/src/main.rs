//! lnchat terminal client entry point.
//!
//! # Usage
//!
//! ```bash
//! # Start without a destination; pick one by typing /<pubkey>
//! lnchat
//!
//! # Start talking to a peer right away
//! lnchat 02aa11bb22...
//! ```

use std::{
    fs::OpenOptions,
    path::PathBuf,
    sync::{Arc, Mutex},
    time::Duration,
};

use clap::Parser;
use lnchat_core::{PeerId, peer::DEFAULT_PEER_ID_LEN};
use lnchat_tui::{
    LoopbackNetwork, Runtime, RuntimeError, SessionConfig, SessionController, TerminalFrontend,
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Chat over payments
#[derive(Parser, Debug)]
#[command(name = "lnchat")]
#[command(about = "Terminal chat that carries every message on a payment")]
#[command(version)]
struct Args {
    /// Hex public key of the peer to talk to
    destination: Option<String>,

    /// Minimum amount attached to each message
    #[arg(long, default_value_t = 100)]
    floor_amount: u64,

    /// Maximum routing fee per message
    #[arg(long, default_value_t = 100)]
    fee_limit: u64,

    /// Routing timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Byte length of peer public keys
    #[arg(long, default_value_t = DEFAULT_PEER_ID_LEN)]
    peer_id_len: usize,

    /// Settlement latency of the loopback network in milliseconds
    #[arg(long, default_value_t = 500)]
    latency_ms: u64,

    /// Highest routing fee the loopback network charges
    #[arg(long, default_value_t = 5)]
    max_fee: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Log file; the terminal is taken over by the UI
    #[arg(long, default_value = "lnchat.log")]
    log_file: PathBuf,
}

impl Args {
    fn session_config(&self) -> SessionConfig {
        SessionConfig::default()
            .with_floor_amount(self.floor_amount)
            .with_fee_limit(self.fee_limit)
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_peer_id_len(self.peer_id_len)
    }
}

fn init_logging(args: &Args) -> Result<(), RuntimeError> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&args.log_file)
        .map_err(RuntimeError::LogFile)?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .with(filter)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), RuntimeError> {
    let args = Args::parse();
    init_logging(&args)?;

    let config = args.session_config();
    let destination = args
        .destination
        .as_deref()
        .map(|input| {
            PeerId::parse_hex(input, config.peer_id_len)
                .map_err(|reason| RuntimeError::Destination { input: input.to_owned(), reason })
        })
        .transpose()?;

    tracing::info!("lnchat starting");
    let latency = Duration::from_millis(args.latency_ms);
    let network = Arc::new(LoopbackNetwork::new(latency, args.max_fee));
    let controller = SessionController::new(config, network, destination);
    let inbound = controller.start();

    let frontend = TerminalFrontend::new()?;
    let result = Runtime::new(frontend, controller).run().await;

    if let Err(e) = inbound.await {
        tracing::warn!(error = %e, "inbound task did not finish cleanly");
    }
    tracing::info!("lnchat exiting");

    result.map_err(RuntimeError::from)
}
