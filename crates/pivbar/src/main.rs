//! Binary entrypoint for the pivbar overlay tooling.
use std::{
    io,
    path::{Path, PathBuf},
    process,
    sync::Arc,
    time::Duration,
};

use clap::{Parser, Subcommand};
use config::{Config, load_effective};
use logging as logshared;
use pivbar_engine::{
    FileBackend, Preferences, Resources, render,
    theme::{Background, style_block},
};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*};

/// Embedded stylesheet and logos.
mod assets;
/// In-memory host page rehearsal.
mod simulate;

use crate::simulate::{DEFAULT_HOST, Scenario};

#[derive(Parser, Debug)]
#[command(name = "pivbar", about = "PI Vision navigation overlay tooling", version)]
/// Command-line interface for the `pivbar` binary.
struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    command: Command,

    /// Logging controls
    #[command(flatten)]
    log: logshared::LogArgs,

    /// Optional path to the config file (defaults to ~/.pivbar/config.ron, then the built-in menu)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory whose navbar.css / *.svg files replace the embedded assets
    #[arg(long, global = true, value_name = "DIR")]
    assets: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
/// Top-level CLI subcommands.
enum Command {
    /// Load and validate the configuration then exit.
    Check {
        /// Path to configuration file to check
        path: Option<PathBuf>,

        /// Dump the parsed configuration as JSON to stdout
        #[arg(long)]
        dump: bool,
    },
    /// Print the overlay markup.
    Render,
    /// Print the background style block for a hex color or gradient.
    Theme {
        /// `#rrggbb` or a `linear-gradient(...)` value
        color: String,
    },
    /// Mount on an in-memory host page, replay clicks, and print the document.
    Simulate {
        /// Route fragment of the simulated page
        #[arg(long)]
        fragment: Option<String>,

        /// Hostname of the simulated page (localhost enables developer mode)
        #[arg(long, default_value = DEFAULT_HOST)]
        host: String,

        /// CSS selector to click after mounting; repeatable
        #[arg(long = "click", value_name = "SELECTOR")]
        clicks: Vec<String>,

        /// JSON file backing persisted preferences
        #[arg(long, value_name = "PATH")]
        prefs: Option<PathBuf>,

        /// Give up if the overlay is not mounted within this many milliseconds
        #[arg(long, value_name = "MS", default_value_t = 5_000)]
        timeout_ms: u64,
    },
}

/// Load the effective configuration or exit with a rendered error.
fn load_config_or_exit(path: Option<&Path>) -> Config {
    match load_effective(path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{}", e.pretty());
            process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(cli.log.env_filter())
        .with(fmt::layer().without_time().with_writer(io::stderr))
        .try_init()
        .ok();

    match cli.command {
        Command::Check { path, dump } => {
            let explicit = path.as_deref().or(cli.config.as_deref());
            let cfg = load_config_or_exit(explicit);
            if dump {
                match serde_json::to_string_pretty(&cfg) {
                    Ok(json) => println!("{json}"),
                    Err(e) => {
                        eprintln!("Failed to serialize config: {e}");
                        process::exit(1);
                    }
                }
            } else {
                println!("OK");
            }
        }
        Command::Render => {
            let cfg = load_config_or_exit(cli.config.as_deref());
            let resources = load_assets_or_exit(cli.assets.as_deref());
            println!("{}", render::overlay_html(&cfg, &resources.logo));
        }
        Command::Theme { color } => match Background::parse(&color) {
            Some(bg) => print!("{}", style_block(&bg)),
            None => {
                eprintln!("Invalid color: {color}");
                process::exit(1);
            }
        },
        Command::Simulate {
            fragment,
            host,
            clicks,
            prefs,
            timeout_ms,
        } => {
            let cfg = load_config_or_exit(cli.config.as_deref());
            let resources = load_assets_or_exit(cli.assets.as_deref());
            let fragment = fragment
                .or_else(|| cfg.allowed_views.first().cloned())
                .unwrap_or_default();
            let prefs = match prefs {
                Some(path) => {
                    debug!(path = %path.display(), "using file-backed preferences");
                    Preferences::new(Arc::new(FileBackend::new(path)))
                }
                None => Preferences::in_memory(),
            };
            let scenario = Scenario {
                host,
                fragment,
                clicks,
                timeout: Duration::from_millis(timeout_ms),
            };
            match simulate::run(Arc::new(cfg), resources, prefs, scenario).await {
                Ok(report) => {
                    eprintln!("outcome: {:?}", report.outcome);
                    eprintln!("fragment: {}", report.fragment);
                    if report.reloads > 0 {
                        eprintln!("reloads: {}", report.reloads);
                    }
                    for alert in &report.alerts {
                        eprintln!("alert: {alert}");
                    }
                    println!("{}", report.html);
                }
                Err(e) => {
                    eprintln!("Simulation failed: {e}");
                    process::exit(1);
                }
            }
        }
    }
}

/// Load the overlay assets or exit with the failing path.
fn load_assets_or_exit(dir: Option<&Path>) -> Resources {
    match assets::load(dir) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    }
}
