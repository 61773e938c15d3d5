// Logging module - Logging infrastructure
use crate::domain::error::{BattleKeepError, BattleKeepResult};
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the filter: `RUST_LOG` wins, then `--verbose`, then the configured level
pub fn build_filter(log_level: &str, verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { log_level };
        EnvFilter::new(format!("battlekeep={},warn", level))
    })
}

/// Initialize logging system.
///
/// Output goes to stderr so stdout stays free for command results and the
/// `serve` protocol.
pub fn init_logging(log_level: &str, verbose: bool) -> BattleKeepResult<()> {
    tracing_subscriber::registry()
        .with(build_filter(log_level, verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_level(true)
                .with_file(verbose)
                .with_line_number(verbose),
        )
        .try_init()
        .map_err(|e| BattleKeepError::Config {
            message: format!("Failed to initialize logging: {}", e),
        })?;

    tracing::debug!("BattleKeep logging system initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_init() {
        // The global subscriber can only be set once per process
        let first = init_logging("info", false);
        let second = init_logging("info", false);
        assert!(first.is_ok() || second.is_err());
        assert!(second.is_err());
    }

    #[test]
    fn test_build_filter() {
        let filter = build_filter("warn", true);
        assert!(!filter.to_string().is_empty());
    }
}
