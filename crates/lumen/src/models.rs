// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `lumen models` command implementation.

use colored::Colorize;
use lumen_config::LumenConfig;
use lumen_core::traits::ModelCatalog;
use lumen_core::types::LoadedModel;
use lumen_core::LumenError;

use crate::runtime::Runtime;

/// Lists the catalog, the registry, and the model the selector would pick.
pub async fn run_models(config: LumenConfig) -> Result<(), LumenError> {
    let runtime = Runtime::from_config(config)?;
    let catalog = runtime.adapters.catalog.list_models().await;
    let memory_gb = lumen_router::available_memory_gb();
    let pick = runtime.gateway.rank(&catalog);

    if catalog.is_empty() {
        println!(
            "{}",
            "no models listed (server down or nothing pulled)".yellow()
        );
    } else {
        println!("{}", "models on server:".bold());
        for name in &catalog {
            let marker = if *name == pick { "*" } else { " " };
            println!("  {marker} {name}");
        }
    }

    let loaded = runtime.adapters.catalog.registry().loaded_models();
    if !loaded.is_empty() {
        println!();
        println!("{}", "registry:".bold());
        for model in &loaded {
            println!("  {}", describe(model));
        }
    }

    println!();
    println!("selected for {memory_gb:.1} GB available: {}", pick.green());
    Ok(())
}

fn describe(model: &LoadedModel) -> String {
    let state = if model.running { "running" } else { "stopped" };
    format!(
        "{} [{state}] id={} since {}",
        model.name,
        model.id,
        model.created_at.format("%Y-%m-%d %H:%M:%S")
    )
}
