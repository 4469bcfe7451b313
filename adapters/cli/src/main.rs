#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a headless Spellstorm session.

mod config;
mod session;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use spellstorm_content::Content;
use tracing_subscriber::EnvFilter;

use crate::{config::SessionConfig, session::Session};

/// Plays a seeded session with an autopilot and reports how it went.
#[derive(Debug, Parser)]
#[command(name = "spellstorm", version, about)]
struct Cli {
    /// Session configuration file; omitted fields use defaults.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory holding abilities.toml, items.toml and waves.toml.
    #[arg(long)]
    content: Option<PathBuf>,
    /// Overrides the configured session seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Overrides the configured session length.
    #[arg(long)]
    duration_secs: Option<u64>,
    /// Prints the summary as JSON.
    #[arg(long)]
    json: bool,
}

/// Entry point for the Spellstorm command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(duration_secs) = cli.duration_secs {
        config.duration_secs = duration_secs;
    }

    let content = match &cli.content {
        Some(dir) => Content::from_dir(dir)
            .with_context(|| format!("failed to load content from {}", dir.display()))?,
        None => Content::builtin().context("builtin content is invalid")?,
    };

    tracing::info!(seed = config.seed, duration_secs = config.duration_secs, "session starting");
    let summary = Session::new(&content, config).run();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let outcome = if summary.survived { "survived" } else { "fell" };
    println!(
        "seed {:#x}: {outcome} after {:.1}s at level {}",
        summary.seed, summary.elapsed_secs, summary.level
    );
    println!(
        "kills {} | waves {} | bosses {} | damage taken {:.1}",
        summary.kills, summary.waves_triggered, summary.bosses_defeated, summary.damage_taken
    );
    println!(
        "difficulty {:.2} | harassment {:.2} | resistance {:.2}",
        summary.difficulty.difficulty, summary.difficulty.harassment, summary.difficulty.resistance
    );
    for (id, level) in &summary.abilities {
        println!("  ability {id} lv{level}");
    }
    for (id, level) in &summary.items {
        println!("  item {id} lv{level}");
    }
    Ok(())
}
