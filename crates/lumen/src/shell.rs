// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `lumen shell` command implementation.
//!
//! Launches an interactive REPL with a colored prompt and readline history.
//! Background tasks probe the server and sample resource usage on fixed
//! intervals so `/status` answers without waiting. Creates a new session per
//! invocation and ends it on exit.

use std::sync::Arc;

use colored::Colorize;
use lumen_config::LumenConfig;
use lumen_core::traits::{AvailabilityProbe, ModelCatalog};
use lumen_core::types::{ChatRole, ReplySource};
use lumen_core::LumenError;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::monitor::{ResourceSample, ResourceSampler};
use crate::runtime::Runtime;

const HELP: &str = "\
commands:
  /help           show this help
  /models         list models on the server
  /use <model>    switch to another model (starts a new session)
  /status         server reachability and resource usage
  /history        show this session's messages
  /clear          forget this session's messages
  /quit, /exit    leave the shell
anything else is sent to the model";

/// One line of shell input.
#[derive(Debug, PartialEq, Eq)]
pub enum ShellCommand<'a> {
    Empty,
    Help,
    Models,
    Use(&'a str),
    Status,
    History,
    Clear,
    Quit,
    Unknown(&'a str),
    Message(&'a str),
}

/// Parses a line. Lines starting with `/` are commands, everything else is a message.
pub fn parse_line(line: &str) -> ShellCommand<'_> {
    let line = line.trim();
    if line.is_empty() {
        return ShellCommand::Empty;
    }
    let Some(command) = line.strip_prefix('/') else {
        return ShellCommand::Message(line);
    };
    let (name, arg) = command
        .split_once(char::is_whitespace)
        .map_or((command, ""), |(name, arg)| (name, arg.trim()));
    match name {
        "help" | "?" => ShellCommand::Help,
        "models" => ShellCommand::Models,
        "use" => ShellCommand::Use(arg),
        "status" => ShellCommand::Status,
        "history" => ShellCommand::History,
        "clear" => ShellCommand::Clear,
        "quit" | "exit" => ShellCommand::Quit,
        _ => ShellCommand::Unknown(line),
    }
}

/// Runs the `lumen shell` interactive REPL.
pub async fn run_shell(config: LumenConfig) -> Result<(), LumenError> {
    let runtime = Runtime::from_config(config)?;
    let cancel = CancellationToken::new();
    let resources = spawn_background(&runtime, cancel.clone());

    println!("{}", "lumen shell".bold().green());
    eprintln!("{}", "connecting to model server...".dimmed());
    runtime.initialize().await;

    let mut session_id = start_session(&runtime, &runtime.session_model()).await?;
    let mut placeholder = runtime.on_placeholder_model();

    let mut rl = DefaultEditor::new()
        .map_err(|e| LumenError::Internal(format!("failed to initialize readline: {e}")))?;
    println!("Type {} for commands, {} to exit.\n", "/help".yellow(), "/quit".yellow());

    let prompt = format!("{}> ", "lumen".green());
    loop {
        let line = match rl.readline(&prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        };
        let command = parse_line(&line);
        if command != ShellCommand::Empty {
            let _ = rl.add_history_entry(line.trim());
        }

        let outcome = match command {
            ShellCommand::Empty => Ok(()),
            ShellCommand::Quit => break,
            ShellCommand::Help => {
                println!("{HELP}");
                Ok(())
            }
            ShellCommand::Unknown(input) => {
                eprintln!("unknown command {input}, try {}", "/help".yellow());
                Ok(())
            }
            ShellCommand::Models => show_models(&runtime, &session_id).await,
            ShellCommand::Use(model) => {
                let switched = switch_model(&runtime, &mut session_id, model).await;
                if switched.is_ok() {
                    placeholder = false;
                }
                switched
            }
            ShellCommand::Status => {
                show_status(&runtime, &resources.borrow());
                Ok(())
            }
            ShellCommand::History => show_history(&runtime, &session_id).await,
            ShellCommand::Clear => runtime.orchestrator.clear_history(&session_id).await,
            ShellCommand::Message(text) => {
                if placeholder {
                    match adopt_served_model(&runtime, &session_id).await {
                        Ok(adopted) => placeholder = !adopted,
                        Err(e) => eprintln!("{}: {e}", "error".red()),
                    }
                }
                send(&runtime, &session_id, text).await
            }
        };
        if let Err(e) = outcome {
            eprintln!("{}: {e}", "error".red());
        }
    }

    cancel.cancel();
    runtime.orchestrator.end_session(&session_id).await?;
    println!("{}", "goodbye".dimmed());
    Ok(())
}

/// Starts the periodic probe and resource sampling tasks.
fn spawn_background(
    runtime: &Runtime,
    cancel: CancellationToken,
) -> watch::Receiver<Option<ResourceSample>> {
    let prober = Arc::clone(&runtime.adapters.prober);
    let probe_cancel = cancel.clone();
    let mut probe_interval = tokio::time::interval(runtime.config.probe.interval());
    probe_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = probe_interval.tick() => {
                    prober.probe_once().await;
                }
                _ = probe_cancel.cancelled() => {
                    debug!("probe ticker shutting down");
                    break;
                }
            }
        }
    });

    let (tx, rx) = watch::channel(None);
    let mut sample_interval = tokio::time::interval(runtime.config.monitor.sample_interval());
    sample_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::spawn(async move {
        let mut sampler = ResourceSampler::new();
        loop {
            tokio::select! {
                _ = sample_interval.tick() => {
                    tx.send_replace(Some(sampler.sample_once()));
                }
                _ = cancel.cancelled() => {
                    debug!("resource sampler shutting down");
                    break;
                }
            }
        }
    });
    rx
}

async fn start_session(runtime: &Runtime, model: &str) -> Result<String, LumenError> {
    let session = runtime.orchestrator.start_session(model).await?;
    println!("{}", format!("chatting with {model}").dimmed());
    Ok(session.id().0.clone())
}

/// Moves a session bound to the configured default onto a model the server
/// actually lists. Returns whether that happened.
async fn adopt_served_model(runtime: &Runtime, session_id: &str) -> Result<bool, LumenError> {
    let Some(model) = runtime.adopt_served_model(session_id).await? else {
        return Ok(false);
    };
    println!("{}", format!("chatting with {model}").dimmed());
    Ok(true)
}

async fn send(runtime: &Runtime, session_id: &str, text: &str) -> Result<(), LumenError> {
    let reply = runtime
        .orchestrator
        .send_message_detailed(session_id, text)
        .await?;
    println!("{}", reply.text);
    if let ReplySource::Fallback(reason) = reply.source {
        println!("{}", format!("(offline reply: {reason})").dimmed());
    }
    println!();
    Ok(())
}

async fn switch_model(
    runtime: &Runtime,
    session_id: &mut String,
    model: &str,
) -> Result<(), LumenError> {
    runtime.gateway.set_selected(model)?;
    let next = start_session(runtime, model.trim()).await?;
    let previous = std::mem::replace(session_id, next);
    runtime.orchestrator.end_session(&previous).await?;
    info!(model = %model.trim(), "switched model");
    Ok(())
}

async fn show_models(runtime: &Runtime, session_id: &str) -> Result<(), LumenError> {
    let current = runtime.orchestrator.get_session(session_id).await?;
    let models = runtime.adapters.catalog.list_models().await;
    if models.is_empty() {
        println!("{}", "no models listed".yellow());
        return Ok(());
    }
    for name in models {
        if name == current.model_id() {
            println!("  * {}", name.green());
        } else {
            println!("    {name}");
        }
    }
    Ok(())
}

fn show_status(runtime: &Runtime, sample: &Option<ResourceSample>) {
    match runtime.adapters.prober.last_report() {
        Some(report) if report.is_reachable() => println!(
            "  server:  {} {}",
            "reachable".green(),
            report.endpoint.as_deref().unwrap_or_default()
        ),
        Some(report) => println!("  server:  {}", report.reachability.to_string().red()),
        None => println!("  server:  {}", "unknown".yellow()),
    }
    match runtime.gateway.selected_model() {
        Some(model) => println!("  model:   {model}"),
        None => println!("  model:   {}", "none selected".yellow()),
    }
    if let Some(sample) = sample {
        println!(
            "  process: {:.1}% CPU, {:.1} MB ({:.2}% of host)",
            sample.cpu_percent, sample.memory_mb, sample.memory_percent
        );
        println!(
            "  disk:    {:.1} KB/s read, {:.1} KB/s written",
            sample.disk_read_bytes_per_sec / 1024.0,
            sample.disk_write_bytes_per_sec / 1024.0
        );
        println!("  host:    {:.1} GB available", sample.available_memory_gb);
    }
}

async fn show_history(runtime: &Runtime, session_id: &str) -> Result<(), LumenError> {
    let history = runtime.orchestrator.get_history(session_id).await?;
    if history.is_empty() {
        println!("{}", "(no messages)".dimmed());
    }
    for message in history {
        let who = match message.role() {
            ChatRole::User => "you".cyan(),
            ChatRole::Assistant => "lumen".green(),
            ChatRole::System => "system".yellow(),
        };
        println!(
            "{} {who}: {}",
            message.timestamp().format("%H:%M:%S").to_string().dimmed(),
            message.content()
        );
    }
    Ok(())
}
