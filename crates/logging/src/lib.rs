#![warn(missing_docs)]

//! Shared logging CLI arguments and tracing filter helpers for the pivbar
//! workspace.
//!
//! Level flags apply to our crates only, so third-party crates stay quiet
//! unless an explicit filter asks for them.

use std::env;

use clap::Args;
use tracing_subscriber::EnvFilter;

/// Logging controls for CLI apps.
#[derive(Debug, Clone, Default, Args)]
pub struct LogArgs {
    /// Set global log level to trace (our crates only)
    #[arg(long, conflicts_with_all = ["debug", "log_level", "log_filter"])]
    pub trace: bool,

    /// Set global log level to debug (our crates only)
    #[arg(long, conflicts_with_all = ["trace", "log_level", "log_filter"])]
    pub debug: bool,

    /// Set a single global log level for our crates (error|warn|info|debug|trace)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Set an explicit tracing filter directive (overrides other flags)
    /// e.g. "pivbar_engine=trace,pivbar_dom=debug"
    #[arg(long)]
    pub log_filter: Option<String>,
}

impl LogArgs {
    /// The filter spec these flags select, falling back to `RUST_LOG`.
    pub fn spec(&self) -> String {
        compute_spec(
            self.trace,
            self.debug,
            self.log_level.as_deref(),
            self.log_filter.as_deref(),
        )
    }

    /// The `EnvFilter` these flags select.
    pub fn env_filter(&self) -> EnvFilter {
        env_filter_from_spec(&self.spec())
    }
}

/// List of crate targets that constitute "our" logs.
pub fn our_crates() -> &'static [&'static str] {
    &["pivbar", "pivbar_engine", "pivbar_dom", "config", "logging"]
}

/// Build a filter directive string that sets the same `level` for all of our crates.
pub fn level_spec_for(level: &str) -> String {
    let lvl = level.to_ascii_lowercase();
    our_crates()
        .iter()
        .map(|t| format!("{}={}", t, lvl))
        .collect::<Vec<_>>()
        .join(",")
}

/// Compute the final filter spec string with precedence:
/// - `log_filter`
/// - `trace`/`debug`/`log_level` (crate-scoped)
/// - `RUST_LOG` env
/// - default to crate-scoped `info`
pub fn compute_spec(
    trace: bool,
    debug: bool,
    log_level: Option<&str>,
    log_filter: Option<&str>,
) -> String {
    let rust_log = env::var("RUST_LOG").ok();
    select_spec(trace, debug, log_level, log_filter, rust_log.as_deref())
}

/// [`compute_spec`] with the environment passed in.
fn select_spec(
    trace: bool,
    debug: bool,
    log_level: Option<&str>,
    log_filter: Option<&str>,
    rust_log: Option<&str>,
) -> String {
    if let Some(spec) = log_filter {
        return spec.to_string();
    }
    if trace {
        return level_spec_for("trace");
    }
    if debug {
        return level_spec_for("debug");
    }
    if let Some(lvl) = log_level {
        return level_spec_for(lvl);
    }
    match rust_log {
        Some(spec) if !spec.trim().is_empty() => spec.to_string(),
        _ => level_spec_for("info"),
    }
}

/// Create an `EnvFilter` from a spec string.
pub fn env_filter_from_spec(spec: &str) -> EnvFilter {
    EnvFilter::new(spec)
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        log: LogArgs,
    }

    #[test]
    fn level_spec_covers_every_crate() {
        let spec = level_spec_for("DEBUG");
        for krate in our_crates() {
            assert!(spec.contains(&format!("{krate}=debug")), "{spec}");
        }
        assert_eq!(spec.split(',').count(), our_crates().len());
    }

    #[test]
    fn explicit_filter_wins() {
        assert_eq!(
            select_spec(false, false, Some("warn"), Some("pivbar_dom=trace"), Some("info")),
            "pivbar_dom=trace"
        );
    }

    #[test]
    fn flags_beat_environment() {
        assert_eq!(select_spec(true, false, None, None, Some("warn")), level_spec_for("trace"));
        assert_eq!(select_spec(false, true, None, None, None), level_spec_for("debug"));
        assert_eq!(select_spec(false, false, Some("error"), None, None), level_spec_for("error"));
    }

    #[test]
    fn environment_then_default() {
        assert_eq!(select_spec(false, false, None, None, Some("pivbar=warn")), "pivbar=warn");
        assert_eq!(select_spec(false, false, None, None, Some("  ")), level_spec_for("info"));
        assert_eq!(select_spec(false, false, None, None, None), level_spec_for("info"));
    }

    #[test]
    fn trace_conflicts_with_debug() {
        assert!(Cli::try_parse_from(["x", "--trace", "--debug"]).is_err());
        let cli = Cli::try_parse_from(["x", "--log-level", "warn"]).unwrap();
        assert_eq!(cli.log.log_level.as_deref(), Some("warn"));
        assert!(!cli.log.trace);
    }
}
