//! # `ClashGraft`
//!
//! `ClashGraft` builds Clash configurations from many independently maintained
//! YAML fragments: base settings, proxy providers, proxy nodes, rule providers
//! and rule lists.
//!
//! ## Usage
//!
//! **Remote repository:**
//! ```sh
//! GITHUB_TOKEN=... clashgraft --repo-owner me --repo-name clash-fragments
//! ```
//!
//! **Local directories:**
//! ```sh
//! clashgraft --local --output-dir output
//! ```
//!
//! See `clashgraft --help` for every option and its environment variable.

use clap::Parser as _;
use clashgraft::cli::Args;
use clashgraft::error::MergeError;
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt};

fn main() {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt().with_target(false).with_env_filter(filter).init();

    match clashgraft::run(&args) {
        Ok(()) => std::process::exit(0),
        Err(err) => {
            error!("{:#}", err);
            std::process::exit(
                err.downcast_ref::<MergeError>()
                    .map_or(1, MergeError::exit_code),
            );
        }
    }
}
