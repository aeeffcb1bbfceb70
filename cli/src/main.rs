//! banksim CLI - run the banking network model from the command line

use banksim_core::{ModelConfig, Orchestrator, ScenarioPreset};
use clap::Parser;
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "banksim")]
#[command(about = "Simulate insolvency and contagion in a banking network")]
struct Cli {
    /// Scenario preset applied before any overrides
    #[arg(short, long, default_value_t = ScenarioPreset::HighSpread)]
    scenario: ScenarioPreset,

    /// Number of cycles to run
    #[arg(short, long, default_value_t = 100)]
    cycles: usize,

    /// Seed for the random source (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// JSON file of configuration overrides (camelCase keys)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Include the full event log in the output
    #[arg(long)]
    events: bool,

    /// Print the effective configuration and exit
    #[arg(long)]
    show_config: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut overrides = match &cli.config {
        Some(path) => serde_json::from_str::<Value>(&std::fs::read_to_string(path)?)?,
        None => json!({}),
    };
    if let (Some(seed), Value::Object(map)) = (cli.seed, &mut overrides) {
        map.insert("rngSeed".to_string(), json!(seed));
    }

    let config = ModelConfig::with_overrides(cli.scenario, &overrides)?;
    if cli.show_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    info!(scenario = %cli.scenario, cycles = cli.cycles, "starting run");
    let mut orchestrator = Orchestrator::new(config)?;
    let summary = orchestrator.run(cli.cycles)?;

    let output = if cli.events {
        json!({ "summary": summary, "events": orchestrator.event_log() })
    } else {
        json!({ "summary": summary })
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
