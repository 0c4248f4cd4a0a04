//! Run a baseline and a carbon-reward scenario and summarise the difference.
//!
//! # Usage
//!
//! ```bash
//! gcr --config scenario.toml
//! gcr --dashboard --json > results.json
//! ```

use clap::Parser;
use gcr::gcr_core::standard_variables::{
    VAR_ATMOSPHERIC_CO2, VAR_INDUSTRIAL_OUTPUT, VAR_NET_EMISSIONS, VAR_POPULATION,
};
use gcr::gcr_components::components::RewardHistory;
use gcr::{ResultRecord, ResultsCache, ScenarioComparison, ScenarioConfig};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Global Carbon Reward scenario runner
#[derive(Parser, Debug)]
#[command(name = "gcr")]
#[command(about = "Compare a carbon-reward policy scenario against its baseline")]
struct Args {
    /// TOML scenario file
    #[arg(short, long, conflicts_with = "dashboard")]
    config: Option<PathBuf>,

    /// Use the dashboard scenario (2025-2125, policy from 2025, 8000 million people)
    #[arg(long)]
    dashboard: bool,

    /// Print both runs as per-timestep records in JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    baseline: Vec<ResultRecord>,
    policy: Vec<ResultRecord>,
    reward_history: &'a RewardHistory,
}

fn load_config(args: &Args) -> gcr::gcr_core::errors::GcrResult<ScenarioConfig> {
    match &args.config {
        Some(path) => ScenarioConfig::from_path(path),
        None if args.dashboard => Ok(ScenarioConfig::dashboard()),
        None => Ok(ScenarioConfig::default()),
    }
}

fn summarise(comparison: &ScenarioComparison) {
    let policy = comparison.policy();
    let baseline = comparison.baseline();

    for name in [
        VAR_POPULATION,
        VAR_INDUSTRIAL_OUTPUT,
        VAR_NET_EMISSIONS,
        VAR_ATMOSPHERIC_CO2,
    ] {
        info!(
            variable = name,
            baseline = ?baseline.final_value(name),
            policy = ?policy.final_value(name),
            "Final value"
        );
    }
    if let Some(last) = policy.reward_history().last() {
        info!(
            year = last.year,
            reward_value = last.reward_value,
            evaluations = policy.reward_history().len(),
            "Last carbon reward"
        );
    }
    for diagnostic in baseline.diagnostics().iter().chain(policy.diagnostics()) {
        warn!(
            time = ?diagnostic.time,
            field = %diagnostic.field,
            "{}",
            diagnostic.message
        );
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load scenario");
            return ExitCode::FAILURE;
        }
    };

    let cache = ResultsCache::new();
    let comparison = match cache.get_or_refresh(&config) {
        Ok(comparison) => comparison,
        Err(e) => {
            error!(error = %e, "Scenario run failed");
            return ExitCode::FAILURE;
        }
    };
    summarise(&comparison);

    if args.json {
        let output = JsonOutput {
            baseline: comparison.baseline().to_records(),
            policy: comparison.policy().to_records(),
            reward_history: comparison.policy().reward_history(),
        };
        match serde_json::to_string_pretty(&output) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                error!(error = %e, "Failed to serialise results");
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}
