//! leakcheck: static C++ memory leak detector.
//!
//! # Usage
//!
//! ```bash
//! # Scan all C++ files under ./src
//! leakcheck ./src
//!
//! # Skip vendored code
//! leakcheck --exclude=vendor,third_party ./
//!
//! # Machine-readable output
//! leakcheck --json ./src > report.json
//! ```
//!
//! Exits 0 when no leaks are found, 1 when leaks are reported or a fatal
//! scan error occurs.

use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use leakcheck::cli::{parse_excludes, Cli};
use leakcheck::engine::{Engine, EngineConfig};
use leakcheck::error::exit_code;

fn main() {
    let cli = Cli::parse();

    if cli.version {
        println!("leakcheck version {}", env!("CARGO_PKG_VERSION"));
        std::process::exit(exit_code::CLEAN);
    }

    let log_level = if cli.debug {
        Level::DEBUG
    } else if cli.quiet {
        Level::WARN
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .without_time()
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {e}");
    }

    let config = EngineConfig {
        excludes: parse_excludes(cli.exclude.as_deref()),
        json: cli.json,
    };

    std::process::exit(Engine::new(config).run(&cli.paths));
}
