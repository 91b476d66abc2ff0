//! Proforma output structures

use serde::{Deserialize, Serialize};

use crate::metrics;
use super::irr::{calculate_irr, IrrOutcome};

/// One projection year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProformaYear {
    pub year: u32,
    pub occupancy: f64,
    pub gross_revenue: f64,
    pub total_expenses: f64,
    pub noi: f64,
    pub debt_service: f64,
    /// Asset management fee charged against cash flow (0 unless fees are applied)
    pub asset_mgmt_fee: f64,
    pub cash_flow: f64,

    // Refinance
    pub is_refi_year: bool,
    pub refi_loan_amount: Option<f64>,
    pub refi_distribution: Option<f64>,

    // Exit
    pub is_exit_year: bool,
    pub exit_sale_price: Option<f64>,
    pub exit_proceeds: Option<f64>,
    pub capital_returned: Option<f64>,

    /// Estimated balance of the loan in force at year end; 0 from the exit
    /// year onward. Years after an early exit are carried as-is, with debt
    /// service still charged.
    pub loan_balance: f64,
}

impl ProformaYear {
    /// Operating cash flow plus any refinance or sale proceeds
    pub fn total_cash_to_equity(&self) -> f64 {
        self.cash_flow
            + self.refi_distribution.unwrap_or(0.0)
            + self.exit_proceeds.unwrap_or(0.0)
    }
}

/// Summary return metrics for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProformaMetrics {
    pub total_equity_invested: f64,
    pub total_distributions: f64,
    pub total_operating_cash_flow: f64,
    pub refi_distribution: f64,
    pub exit_proceeds: f64,
    pub equity_multiple: f64,
    pub irr: f64,
    pub irr_outcome: IrrOutcome,
    pub average_cash_on_cash: f64,
}

impl ProformaMetrics {
    /// Derive metrics from a complete set of years
    pub fn from_years(years: &[ProformaYear], equity_invested: f64, hold_years: u32) -> Self {
        let total_operating_cash_flow: f64 = years.iter().map(|y| y.cash_flow).sum();

        let refi_distribution = years
            .iter()
            .find(|y| y.is_refi_year)
            .and_then(|y| y.refi_distribution)
            .unwrap_or(0.0);
        let exit_proceeds = years
            .iter()
            .find(|y| y.is_exit_year)
            .and_then(|y| y.exit_proceeds)
            .unwrap_or(0.0);

        let total_distributions = total_operating_cash_flow + refi_distribution + exit_proceeds;

        let equity_multiple = if equity_invested > 0.0 {
            metrics::equity_multiple(total_distributions, equity_invested)
        } else {
            0.0
        };

        let average_cash_on_cash = if equity_invested > 0.0 && hold_years > 0 {
            metrics::cash_on_cash(total_operating_cash_flow / hold_years as f64, equity_invested)
        } else {
            0.0
        };

        let irr_outcome = calculate_irr(&equity_cash_flows(years, equity_invested));

        Self {
            total_equity_invested: equity_invested,
            total_distributions,
            total_operating_cash_flow,
            refi_distribution,
            exit_proceeds,
            equity_multiple,
            irr: irr_outcome.rate(),
            irr_outcome,
            average_cash_on_cash,
        }
    }
}

/// `[-equity, cf_1 + events_1, ..., cf_n + events_n]`
pub fn equity_cash_flows(years: &[ProformaYear], equity_invested: f64) -> Vec<f64> {
    std::iter::once(-equity_invested)
        .chain(years.iter().map(ProformaYear::total_cash_to_equity))
        .collect()
}

/// Complete proforma result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProformaResult {
    /// Yearly snapshots, year 1 first
    pub years: Vec<ProformaYear>,
    pub metrics: ProformaMetrics,
}

impl ProformaResult {
    pub fn refi_year(&self) -> Option<&ProformaYear> {
        self.years.iter().find(|y| y.is_refi_year)
    }

    pub fn exit_year(&self) -> Option<&ProformaYear> {
        self.years.iter().find(|y| y.is_exit_year)
    }

    pub fn final_year(&self) -> Option<&ProformaYear> {
        self.years.last()
    }
}
