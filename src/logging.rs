//! Diagnostic logging for the listing itself.
//!
//! Log records go to stderr so they never mix with the tree on stdout.
//! `CANOPY_LOG` takes precedence over `--log-level` and accepts full
//! `tracing` directives such as `canopy::tree=debug`.

use tracing_subscriber::EnvFilter;

use crate::error::{CanopyError, Result};

pub const LOG_ENV: &str = "CANOPY_LOG";
pub const DEFAULT_LEVEL: &str = "warn";

/// Build the filter from `CANOPY_LOG`, falling back to `level`.
fn build_env_filter(level: &str) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
        return Ok(filter);
    }
    level_filter(level)
}

fn level_filter(level: &str) -> Result<EnvFilter> {
    let level = level.trim();
    if level.is_empty() {
        return Err(CanopyError::Level(level.to_string()));
    }
    EnvFilter::try_new(level).map_err(|_| CanopyError::Level(level.to_string()))
}

/// Install the global subscriber. Call once, before walking.
pub fn init_logging(level: &str) -> Result<()> {
    let filter = build_env_filter(level)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| CanopyError::Logging(e.to_string()))
}
