//! `ClashGraft` - merge proxy subscriptions and rule lists into one Clash configuration
//!
//! Category files are read from a repository contents API or local
//! directories, merged into one document per profile and written together
//! with summary statistics.

pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod merge;
pub mod operations;
pub mod source;
pub mod system;
pub mod utils;

use anyhow::Result;
use cli::Args;
use http::ReqwestClient;
use operations::generate::GenerateOperation;
use system::RealSystem;

/// Main entry point for the clashgraft library
///
/// # Errors
///
/// Returns an error if settings are invalid, a credential is missing, a
/// profile has no full-settings document, or an output cannot be written.
pub fn run(args: &Args) -> Result<()> {
    let system = RealSystem::new();
    let operation = GenerateOperation::new(args, &system)?;
    let http = ReqwestClient::new(operation.timeout())?;
    operation.execute(&http)
}
