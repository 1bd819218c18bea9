use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::display::{print_error, print_report};
use crate::error::{CoachError, CoachResult};
use crate::hand::HandRecord;
use crate::narrator::{HttpNarrator, Narrator, NarratorConfig, StaticNarrator};
use crate::pipeline::analyze;

#[derive(Parser)]
#[command(
    name = "coach",
    version = "1.0.0",
    about = "Heads-up hand analyzer — ranges, equity, SPR, and leak detection."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a recorded hand and grade every hero decision
    Analyze {
        /// Path to a hand record JSON file
        hand: PathBuf,
        /// Emit the full report as JSON instead of tables
        #[arg(long)]
        json: bool,
        /// Skip the external narrative service even when configured
        #[arg(long)]
        offline: bool,
    },
}

pub fn run() {
    let cli = Cli::parse();
    if let Err(err) = dispatch(cli) {
        print_error(&err.to_string());
        std::process::exit(1);
    }
}

fn dispatch(cli: Cli) -> CoachResult<()> {
    match cli.command {
        Commands::Analyze {
            hand,
            json,
            offline,
        } => cmd_analyze(&hand, json, offline),
    }
}

fn cmd_analyze(path: &PathBuf, json: bool, offline: bool) -> CoachResult<()> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| CoachError::Input(format!("cannot read {}: {e}", path.display())))?;
    let record: HandRecord = serde_json::from_str(&raw)
        .map_err(|e| CoachError::Input(format!("malformed hand record: {e}")))?;

    let narrator = build_narrator(offline)?;
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| CoachError::Computation(e.to_string()))?;
    let report = runtime.block_on(analyze(&record, narrator.as_ref()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let board = record.board_cards()?;
        print_report(&report, &board);
    }
    Ok(())
}

/// Uses the configured HTTP narrator when the environment provides one;
/// otherwise every narrative stage runs on its local fallback.
fn build_narrator(offline: bool) -> CoachResult<Arc<dyn Narrator>> {
    if !offline {
        if let Some(config) = NarratorConfig::from_env() {
            log::info!("using narrative service at {}", config.base_url);
            return Ok(Arc::new(HttpNarrator::new(config)?));
        }
    }
    log::info!("no narrative service configured, using local fallbacks");
    Ok(Arc::new(StaticNarrator::failing()))
}
