//! usb-ping
//!
//! Sends a fixed set of payloads to pong firmware and checks that every one
//! comes back byte-for-byte. Mismatches are printed; the run still exits 0.

use anyhow::{Context, Result};
use clap::Parser;
use common::error::EXIT_SETUP;
use common::setup_logging;
use ping::config::{PingConfig, expand_path};
use ping::report::{aborted_line, exchange_line, mismatch_line, summary_line};
use ping::vectors::needs_zero_length_packet;
use ping::{PingSession, default_vectors};
use std::process::ExitCode;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "usb-ping")]
#[command(
    author,
    version,
    about = "USB ping - verify round-trip byte integrity against echo firmware"
)]
#[command(long_about = "
Writes each test payload to the OUT endpoint of the pong device, reads one
reply of up to the IN endpoint's max packet size, and reports any reply that
differs from what was sent.

EXAMPLES:
    # Run against the default device (1d6b:0104, interface 0)
    usb-ping

    # Run with a custom config
    usb-ping --config ~/ping.toml

    # Show each exchange in the log
    usb-ping --log-level debug

EXIT STATUS:
    0  all vectors exchanged (mismatches are reported, not fatal)
    1  device not found
    2  transport fault, short write or unusable endpoint
    3  configuration or setup failure
")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<String>,

    /// Save default configuration to default location and exit
    #[arg(long)]
    save_config: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let code = e
                .downcast_ref::<common::Error>()
                .map(common::Error::exit_code)
                .unwrap_or(EXIT_SETUP);
            eprintln!("ERROR: {:#}", e);
            ExitCode::from(code)
        }
    }
}

fn run(args: Args) -> Result<()> {
    if args.save_config {
        let path = PingConfig::default_path();
        PingConfig::default()
            .save(&path)
            .context("Failed to save configuration")?;
        println!("Configuration saved to: {}", path.display());
        return Ok(());
    }

    let config = match args.config.as_deref() {
        Some(path) => PingConfig::load(Some(expand_path(path)))
            .context("Failed to load configuration")?,
        None => PingConfig::load_or_default(),
    };

    let log_level = args.log_level.as_deref().unwrap_or(&config.logging.level);
    setup_logging(log_level).context("Failed to setup logging")?;

    info!("usb-ping v{}", env!("CARGO_PKG_VERSION"));

    let context = rusb::Context::new()
        .map_err(common::Error::from)
        .context("Failed to initialize libusb")?;

    let session = PingSession::open(&context, &config.device)?;

    for endpoint in session.endpoints() {
        println!("{}", endpoint);
    }

    let transfer_unit = session.transfer_unit()?;
    info!("Transfer unit: {} bytes", transfer_unit);

    let vectors = default_vectors(transfer_unit);
    for vector in &vectors {
        if needs_zero_length_packet(vector.payload().len(), transfer_unit) {
            warn!(
                "Vector '{}' fills the transfer unit exactly; the peer sends no ZLP, reply may be misread",
                vector.name()
            );
        }
    }

    let mut completed = 0;
    let results = session
        .run(&vectors, |result| {
            completed += 1;
            println!("{}", exchange_line(result));
            if let Some(line) = mismatch_line(result) {
                println!("{}", line);
            }
        })
        .with_context(|| aborted_line(&vectors, completed))?;

    println!("{}", summary_line(&results));
    Ok(())
}
