//! Operator CLI for the two-tier session memory core. Thin wrapper over
//! [`memory_core::Memory`] for manual inspection and scripting — not the
//! path agents talk to at runtime.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use memory_core::config::MemoryConfig;
use memory_core::Memory;
use tracing_subscriber::EnvFilter;

/// Memory core operator CLI.
#[derive(Debug, Parser)]
#[command(name = "memory-cli", version, about = "Inspect and drive a session's two-tier memory store")]
struct Cli {
    /// Directory holding per-session triple stores.
    #[arg(long, global = true, default_value = "./memory-data")]
    base_path: String,

    /// Optional TOML config file; overrides `--base-path` if it sets `store.base_path`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Persist an explicit long-term memory.
    Remember(commands::RememberArgs),
    /// Fetch and render the assembled context for a session.
    Recall(commands::RecallArgs),
    /// Soft-delete a long-term memory.
    Forget(commands::ForgetArgs),
    /// Print triple-store statistics for a session.
    Stats(commands::StatsArgs),
    /// Run one promotion pass over a session's pending memories.
    Promote(commands::PromoteArgs),
}

fn load_config(cli: &Cli) -> anyhow::Result<MemoryConfig> {
    let mut config = match &cli.config {
        Some(path) => MemoryConfig::from_path(path)?,
        None => MemoryConfig::default(),
    };
    if cli.config.is_none() {
        config.store.base_path = cli.base_path.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let memory = Memory::new(config);

    match cli.command {
        Command::Remember(args) => commands::remember(&memory, args).await,
        Command::Recall(args) => commands::recall(&memory, args).await,
        Command::Forget(args) => commands::forget(&memory, args).await,
        Command::Stats(args) => commands::stats(&memory, args).await,
        Command::Promote(args) => commands::promote(&memory, args).await,
    }
}
