// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lumen - a console chat client for a local LLM server.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod ask;
mod models;
mod monitor;
mod runtime;
mod shell;
mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use lumen_config::LumenConfig;

/// Lumen - chat with a local LLM, with an offline fallback.
#[derive(Parser, Debug)]
#[command(name = "lumen", version, about, long_about = None)]
struct Cli {
    /// Load this configuration file instead of the standard locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Launch an interactive chat session (default).
    Shell,
    /// Send one message and print the reply.
    Ask {
        /// Model to use instead of the selected one.
        #[arg(long)]
        model: Option<String>,
        /// The message to send.
        #[arg(required = true, num_args = 1..)]
        prompt: Vec<String>,
    },
    /// List models on the server and the one Lumen would pick.
    Models,
    /// Probe the server and sample local resource usage.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
        /// Disable colors.
        #[arg(long)]
        plain: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            lumen_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.agent.log_level);

    let result = match cli.command.unwrap_or(Commands::Shell) {
        Commands::Shell => shell::run_shell(config).await,
        Commands::Ask { model, prompt } => {
            ask::run_ask(config, model.as_deref(), &prompt.join(" ")).await
        }
        Commands::Models => models::run_models(config).await,
        Commands::Status { json, plain } => status::run_status(&config, json, plain).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn load_config(
    path: Option<&std::path::Path>,
) -> Result<LumenConfig, Vec<lumen_config::ConfigError>> {
    match path {
        Some(path) => lumen_config::load_and_validate_path(path),
        None => lumen_config::load_and_validate(),
    }
}

/// Initializes the tracing subscriber on stderr with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("lumen={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn no_subcommand_means_shell() {
        let cli = Cli::parse_from(["lumen"]);
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn ask_joins_words() {
        let cli = Cli::parse_from(["lumen", "ask", "--model", "phi3", "what", "is", "rust"]);
        match cli.command {
            Some(Commands::Ask { model, prompt }) => {
                assert_eq!(model.as_deref(), Some("phi3"));
                assert_eq!(prompt.join(" "), "what is rust");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::parse_from(["lumen", "status", "--json", "--config", "/tmp/lumen.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/lumen.toml")));
        assert!(matches!(
            cli.command,
            Some(Commands::Status {
                json: true,
                plain: false
            })
        ));
    }

    #[test]
    fn missing_config_file_is_reported() {
        let errors = load_config(Some(std::path::Path::new("/nonexistent/lumen.toml")))
            .unwrap_err();
        assert_eq!(errors.len(), 1);
    }
}
