// SPDX-FileCopyrightText: 2026 Reelgrab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reelgrab - resolve Pinterest, TikTok and Instagram posts to media.
//!
//! This is the binary entry point. It is a thin wrapper around
//! `reelgrab-engine`; chat transports and persistence live elsewhere.

mod resolve;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use reelgrab_config::ReelgrabConfig;
use reelgrab_core::ReelgrabError;

/// Exit code for configuration errors.
const EXIT_CONFIG: u8 = 1;
/// Exit code when a URL resolved to no media.
const EXIT_UNRESOLVED: u8 = 2;
/// Exit code after Ctrl-C.
const EXIT_CANCELLED: u8 = 130;

/// Reelgrab - resolve social media posts to downloadable media.
#[derive(Parser, Debug)]
#[command(name = "reelgrab", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the default locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve a post URL and print the media found.
    Resolve {
        /// Pinterest, TikTok or Instagram post URL.
        url: String,
        /// Print a machine-readable JSON summary.
        #[arg(long)]
        json: bool,
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
    /// Print the platform a URL belongs to.
    Classify {
        url: String,
    },
    /// Print the effective configuration as TOML.
    Config,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => reelgrab_config::load_and_validate_path(path),
        None => reelgrab_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            reelgrab_config::render_errors(&errors);
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    init_tracing(&config.logging.level);

    match cli.command {
        Commands::Resolve { url, json, plain } => run_resolve(&config, &url, json, plain).await,
        Commands::Classify { url } => {
            println!("{}", reelgrab_router::classify(&url));
            ExitCode::SUCCESS
        }
        Commands::Config => print_config(&config),
    }
}

async fn run_resolve(config: &ReelgrabConfig, url: &str, json: bool, plain: bool) -> ExitCode {
    match resolve::run_resolve(config, url, json, plain).await {
        Ok(summary) if summary.resolved => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(EXIT_UNRESOLVED),
        Err(ReelgrabError::Cancelled) => {
            eprintln!("reelgrab: cancelled");
            ExitCode::from(EXIT_CANCELLED)
        }
        Err(e) => {
            eprintln!("reelgrab: {e}");
            ExitCode::from(EXIT_CONFIG)
        }
    }
}

fn print_config(config: &ReelgrabConfig) -> ExitCode {
    match reelgrab_config::to_toml(config) {
        Ok(toml) => {
            print!("{toml}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            reelgrab_config::render_errors(&[e]);
            ExitCode::from(EXIT_CONFIG)
        }
    }
}

/// Initializes the tracing subscriber with the given log level.
///
/// Logs go to stderr so `--json` output on stdout stays parseable.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("reelgrab={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_loads_config_defaults() {
        let config = reelgrab_config::load_and_validate_str("")
            .expect("default config should be valid");
        assert_eq!(config.logging.level, "info");
        assert!(reelgrab_config::to_toml(&config).is_ok());
    }

    #[test]
    fn parses_resolve_flags() {
        let cli = Cli::try_parse_from([
            "reelgrab",
            "resolve",
            "https://pin.it/abc",
            "--json",
            "--config",
            "/tmp/r.toml",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/r.toml")));
        match cli.command {
            Commands::Resolve { url, json, plain } => {
                assert_eq!(url, "https://pin.it/abc");
                assert!(json);
                assert!(!plain);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["reelgrab"]).is_err());
        assert!(Cli::try_parse_from(["reelgrab", "classify"]).is_err());
    }

    #[test]
    fn parses_classify_and_config() {
        let cli = Cli::try_parse_from(["reelgrab", "classify", "https://x.test"]).unwrap();
        assert!(matches!(cli.command, Commands::Classify { .. }));
        let cli = Cli::try_parse_from(["reelgrab", "config"]).unwrap();
        assert!(matches!(cli.command, Commands::Config));
    }
}
