//! Underwriting CLI
//!
//! Runs a proforma for one deal from a deal file and optional T12 CSV

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;

use underwriting_engine::{
    napkin::{self, NapkinInput},
    proforma::{export, BalanceMethod, BaselineMethod, EngineConfig, FeePolicy, ProformaEngine, RefiCarry},
    t12::{load_t12, T12Totals},
    DealFile, ProformaResult,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BalanceArg {
    Amortized,
    Approximate,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FeeArg {
    ExitOnly,
    Full,
}

#[derive(Debug, Parser)]
#[command(name = "underwrite", version, about = "Project a deal's proforma and returns")]
struct Args {
    /// Deal file (terms and growth inputs)
    #[arg(long, default_value = underwriting_engine::deal::DEFAULT_DEAL_PATH)]
    deal: PathBuf,

    /// T12 CSV with monthly line items
    #[arg(long)]
    t12: Option<PathBuf>,

    /// Write proforma rows as CSV to this path
    #[arg(long)]
    output: Option<PathBuf>,

    /// Print the full result as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Reproduce earlier proformas (straight-line balances, fixed 73% expense ratio, one-year refinance carry)
    #[arg(long, conflicts_with_all = ["balance", "fees"])]
    legacy: bool,

    #[arg(long, value_enum, default_value = "amortized")]
    balance: BalanceArg,

    #[arg(long, value_enum, default_value = "exit-only")]
    fees: FeeArg,

    /// Skip range validation of the resolved assumptions
    #[arg(long)]
    no_validate: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report<'a> {
    deal_id: u32,
    name: &'a str,
    t12: Option<&'a T12Totals>,
    napkin: Option<napkin::NapkinResult>,
    proforma: &'a ProformaResult,
    execution_time_ms: u64,
}

fn engine_config(args: &Args) -> EngineConfig {
    if args.legacy {
        return EngineConfig::legacy();
    }
    EngineConfig {
        balance_method: match args.balance {
            BalanceArg::Amortized => BalanceMethod::Amortized,
            BalanceArg::Approximate => BalanceMethod::Approximate,
        },
        baseline: BaselineMethod::Auto,
        fees: match args.fees {
            FeeArg::ExitOnly => FeePolicy::ExitOnly,
            FeeArg::Full => FeePolicy::Full,
        },
        refi_carry: RefiCarry::Persistent,
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let start = Instant::now();

    let deal = DealFile::load(&args.deal).with_context(|| format!("loading deal {}", args.deal.display()))?;

    let t12 = match &args.t12 {
        Some(path) => {
            let months = load_t12(path).with_context(|| format!("loading T12 {}", path.display()))?;
            log::info!("loaded {} T12 months from {}", months.len(), path.display());
            Some(T12Totals::from_months(&months))
        }
        None => None,
    };
    let totals = t12.clone().unwrap_or_default();

    let assumptions = deal.assumptions(&totals);
    if !args.no_validate {
        assumptions.validate().context("resolved assumptions are out of range")?;
    }

    let napkin = t12.as_ref().map(|t| {
        napkin::analyze(&NapkinInput {
            gross_revenue: t.total_gross_revenue,
            total_expenses: t.total_expenses,
            asking_price: deal.terms.asking_price,
            down_payment_pct: assumptions.down_payment_pct,
            interest_rate: assumptions.interest_rate,
            loan_term_years: assumptions.loan_term_years,
        })
    });

    let engine = ProformaEngine::new(engine_config(&args));
    let result = engine.run(&assumptions);

    if let Some(path) = &args.output {
        export::write_proforma_csv_path(path, deal.deal_id, &result.years)
            .with_context(|| format!("writing {}", path.display()))?;
        log::info!("proforma rows written to {}", path.display());
    }

    if args.json {
        let report = Report {
            deal_id: deal.deal_id,
            name: &deal.name,
            t12: t12.as_ref(),
            napkin,
            proforma: &result,
            execution_time_ms: start.elapsed().as_millis() as u64,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{} (deal {})", deal.name, deal.deal_id);
    println!("{}", "=".repeat(40));

    if let Some(n) = &napkin {
        println!("\nNapkin:");
        println!("  NOI:              ${:>14.0}", n.noi);
        println!("  Cap rate:          {:>13.2}%", n.cap_rate * 100.0);
        println!("  Expense ratio:     {:>13.2}%", n.expense_ratio * 100.0);
        println!("  Max offer price:  ${:>14.0}", n.max_offer_price);
    }

    println!("\nProforma ({} years):", result.years.len());
    println!(
        "{:>4} {:>7} {:>14} {:>14} {:>12} {:>12} {:>12} {:>14}",
        "Year", "Occ", "Revenue", "Expenses", "NOI", "DebtSvc", "CashFlow", "Event"
    );
    println!("{}", "-".repeat(96));
    for y in &result.years {
        let event = match (y.refi_distribution, y.exit_proceeds) {
            (Some(r), Some(e)) => format!("refi+exit {:.0}", r + e),
            (Some(r), None) => format!("refi {:.0}", r),
            (None, Some(e)) => format!("exit {:.0}", e),
            (None, None) => String::new(),
        };
        println!(
            "{:>4} {:>6.1}% {:>14.0} {:>14.0} {:>12.0} {:>12.0} {:>12.0} {:>14}",
            y.year,
            y.occupancy * 100.0,
            y.gross_revenue,
            y.total_expenses,
            y.noi,
            y.debt_service,
            y.cash_flow,
            event
        );
    }

    let m = &result.metrics;
    println!("\nReturns:");
    println!("  Equity invested:  ${:>14.0}", m.total_equity_invested);
    println!("  Distributions:    ${:>14.0}", m.total_distributions);
    println!("  Equity multiple:   {:>13.2}x", m.equity_multiple);
    if m.irr_outcome.converged() {
        println!("  IRR:               {:>13.2}%", m.irr * 100.0);
    } else {
        println!("  IRR:               {:>13.2}% (did not converge)", m.irr * 100.0);
    }
    println!("  Avg cash-on-cash:  {:>13.2}%", m.average_cash_on_cash * 100.0);

    println!("\nTotal time: {:?}", start.elapsed());
    Ok(())
}
