use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use dialect_drift::{person::PopulationKind, scenario::ScenarioLoader};

#[derive(Debug, Parser)]
#[command(author, version, about = "Dialect drift simulation runner")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/baseline.yaml")]
    scenario: PathBuf,

    /// Override simulated years (uses scenario default when omitted)
    #[arg(long)]
    years: Option<u64>,

    /// Override the scenario seed
    #[arg(long)]
    seed: Option<u64>,

    /// Write the monthly results table to this JSON file
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let loader = ScenarioLoader::new(".");
    let scenario = loader.load(&cli.scenario)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("dialect_drift={}", scenario.logging.level)));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let months = scenario.months(cli.years);
    let mut model = scenario.build_model(cli.seed)?;
    model.setup()?;
    model.run(months)?;

    if let Some(path) = &cli.output {
        let json = serde_json::to_string_pretty(model.results())?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write results to {}", path.display()))?;
    }

    let world = model.world();
    println!(
        "Scenario '{}' completed for {} months. Final population: {} natives, {} immigrants",
        scenario.name,
        model.tick(),
        world.live_count(PopulationKind::Native),
        world.live_count(PopulationKind::Immigrant),
    );
    Ok(())
}
