// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chorus - inspection CLI for the part orchestration engine.
//!
//! Loads the layered configuration and reads a Chorus SQLite store to
//! explain persona rankings and ritual detection. No network I/O.

mod rank;
mod rituals;

use std::path::PathBuf;

use chorus_config::ChorusConfig;
use chorus_core::PauseType;
use clap::{Parser, Subcommand};

/// Chorus - inner parts that respond while you write.
#[derive(Parser, Debug)]
#[command(name = "chorus", version, about, long_about = None)]
struct Cli {
    /// Config file to load instead of the standard search path.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the effective configuration as TOML.
    Config,
    /// Score every stored persona against a simulated pause.
    Rank {
        /// SQLite database (defaults to `storage.database_path`).
        #[arg(long)]
        db: Option<String>,
        /// Pause type, e.g. `long_pause` or `trailing_off`.
        #[arg(long, default_value = "sentence_complete")]
        pause: PauseType,
        /// Recent text the writer produced.
        #[arg(long)]
        text: String,
        /// Seed for the jitter term.
        #[arg(long)]
        seed: Option<u64>,
        /// Score as if grounding mode were active.
        #[arg(long)]
        grounding: bool,
        /// Emit the ranking as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Report ritual patterns found in stored session logs.
    Rituals {
        #[arg(long)]
        db: Option<String>,
    },
}

fn load_config(path: Option<&PathBuf>) -> ChorusConfig {
    let loaded = match path {
        Some(path) => chorus_config::load_and_validate_path(path),
        None => chorus_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            chorus_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

/// Install the fmt subscriber. `RUST_LOG` wins over the configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("chorus={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref());
    init_tracing(&config.agent.log_level);

    let result = match cli.command {
        Some(Commands::Config) => match toml::to_string_pretty(&config) {
            Ok(rendered) => {
                print!("{rendered}");
                Ok(())
            }
            Err(e) => Err(chorus_core::ChorusError::Internal(format!(
                "failed to render config: {e}"
            ))),
        },
        Some(Commands::Rank {
            db,
            pause,
            text,
            seed,
            grounding,
            json,
        }) => {
            let args = rank::RankArgs {
                db: db.unwrap_or_else(|| config.storage.database_path.clone()),
                pause,
                text,
                seed,
                grounding,
                json,
            };
            rank::run_rank(&config, &args).await
        }
        Some(Commands::Rituals { db }) => {
            let db = db.unwrap_or_else(|| config.storage.database_path.clone());
            rituals::run_rituals(&config, &db).await
        }
        None => {
            println!("chorus: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("chorus: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn rank_parses_pause_type() {
        let cli = Cli::parse_from([
            "chorus", "rank", "--pause", "trailing_off", "--text", "and then", "--grounding",
        ]);
        match cli.command {
            Some(Commands::Rank {
                pause, grounding, ..
            }) => {
                assert_eq!(pause, PauseType::TrailingOff);
                assert!(grounding);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn default_config_is_valid() {
        let config = chorus_config::load_and_validate_str("").expect("defaults should be valid");
        assert!(!config.features.part_responses);
    }
}
