// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `lumen ask` command implementation.

use colored::Colorize;
use lumen_config::LumenConfig;
use lumen_core::LumenError;
use tracing::debug;

use crate::runtime::Runtime;

/// Sends one message in a fresh session and prints the reply and its source.
pub async fn run_ask(
    config: LumenConfig,
    model: Option<&str>,
    prompt: &str,
) -> Result<(), LumenError> {
    let runtime = Runtime::from_config(config)?;
    runtime.initialize().await;

    let placeholder = model.is_none() && runtime.on_placeholder_model();
    let model = match model {
        Some(model) => model.to_string(),
        None => runtime.session_model(),
    };
    let session = runtime.orchestrator.start_session(&model).await?;
    let session_id = session.id().0.clone();
    if placeholder {
        runtime.adopt_served_model(&session_id).await?;
    }

    let result = runtime
        .orchestrator
        .send_message_detailed(&session_id, prompt)
        .await;
    runtime.orchestrator.end_session(&session_id).await?;
    let reply = result?;

    debug!(session_id = %session_id, source = %reply.source, "ask complete");
    println!("{}", reply.text);
    eprintln!("{}", format!("[{}]", reply.source).dimmed());
    Ok(())
}
