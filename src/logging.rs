//! Tracing setup
//!
//! `RUST_LOG` takes full filter directives (`info,recordbot=debug`) and
//! defaults to `info`. Text output goes to stdout with colors; JSON output
//! goes to stderr.

use anyhow::Result;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const DEFAULT_DIRECTIVES: &str = "info";

/// Build the filter from a `RUST_LOG` value, falling back to `info` when unset or invalid
pub fn env_filter_from(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Install the global subscriber
pub fn init_tracing(json: bool) -> Result<()> {
    let directives = std::env::var("RUST_LOG").ok();
    let env_filter = env_filter_from(directives.as_deref());

    if json {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(env_filter)
            .with_ansi(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_default_is_info() {
        assert_eq!(env_filter_from(None).max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(env_filter_from(Some("  ")).max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn test_per_target_directive_kept() {
        let filter = env_filter_from(Some("warn,recordbot=debug"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
        assert!(filter.to_string().contains("recordbot=debug"));
    }

    #[test]
    fn test_plain_level() {
        let filter = env_filter_from(Some("error"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::ERROR));
    }
}
