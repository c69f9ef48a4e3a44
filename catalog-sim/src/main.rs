use anyhow::{Context, Result};
use catalog_sim::{args::Cli, Scenario};
use clap::Parser;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    info!("=== Catalog Simulator: replaying {:?} ===", cli.scenario);

    let scenario = Scenario::load(&cli.scenario)
        .with_context(|| format!("Failed to load scenario {:?}", cli.scenario))?;
    let report = catalog_sim::run(scenario).await?;

    info!(
        "Replay finished: {} allocation(s), {} catalog call(s)",
        report.allocations.len(),
        report.ops.len()
    );

    let json = if cli.pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    }
    .context("Failed to serialize report")?;
    println!("{}", json);

    Ok(())
}
