//! Exit cap rate by hold period sensitivity grid for one deal
//!
//! Supports JSON output for API integration via --json flag

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use underwriting_engine::{
    scenario::SensitivityPoint,
    t12::{load_t12, T12Totals},
    DealFile, EngineConfig, ScenarioRunner,
};

#[derive(Debug, Parser)]
#[command(name = "sensitivity", about = "Equity multiple and IRR across exit cap rates and hold periods")]
struct Args {
    #[arg(long, default_value = underwriting_engine::deal::DEFAULT_DEAL_PATH)]
    deal: PathBuf,

    #[arg(long)]
    t12: Option<PathBuf>,

    /// Comma separated exit cap rates as decimals
    #[arg(long, value_delimiter = ',', default_values_t = [0.075, 0.08, 0.085, 0.09, 0.095, 0.10])]
    exit_caps: Vec<f64>,

    /// Comma separated hold periods in years
    #[arg(long, value_delimiter = ',', default_values_t = [3, 5, 7, 10])]
    holds: Vec<u32>,

    #[arg(long)]
    legacy: bool,

    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SensitivityResponse {
    deal_id: u32,
    base_equity_multiple: f64,
    base_irr: f64,
    grid: Vec<SensitivityPoint>,
    execution_time_ms: u64,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let start = Instant::now();

    let deal = DealFile::load(&args.deal).with_context(|| format!("loading deal {}", args.deal.display()))?;
    let totals = match &args.t12 {
        Some(path) => T12Totals::from_months(&load_t12(path).with_context(|| format!("loading T12 {}", path.display()))?),
        None => T12Totals::default(),
    };

    let config = if args.legacy { EngineConfig::legacy() } else { EngineConfig::default() };
    let runner = ScenarioRunner::with_config(deal.assumptions(&totals), config);

    let base = runner.run_base();
    let grid = runner.sensitivity_grid(&args.exit_caps, &args.holds);

    if args.json {
        let response = SensitivityResponse {
            deal_id: deal.deal_id,
            base_equity_multiple: base.metrics.equity_multiple,
            base_irr: base.metrics.irr,
            grid,
            execution_time_ms: start.elapsed().as_millis() as u64,
        };
        println!("{}", serde_json::to_string(&response)?);
        return Ok(());
    }

    println!("{} base case: {:.2}x, IRR {:.2}%", deal.name, base.metrics.equity_multiple, base.metrics.irr * 100.0);

    print!("\n{:>9}", "Exit cap");
    for years in &args.holds {
        print!(" {:>16}", format!("{}yr", years));
    }
    println!();
    println!("{}", "-".repeat(9 + 17 * args.holds.len()));

    for row in grid.chunks(args.holds.len().max(1)) {
        let Some(first) = row.first() else { continue };
        print!("{:>8.2}%", first.exit_cap_rate * 100.0);
        for point in row {
            let cell = format!("{:.2}x / {:.1}%", point.metrics.equity_multiple, point.metrics.irr * 100.0);
            print!(" {:>16}", cell);
        }
        println!();
    }

    println!("\n{} cells in {:?}", args.exit_caps.len() * args.holds.len(), start.elapsed());
    Ok(())
}
