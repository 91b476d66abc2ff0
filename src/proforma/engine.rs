//! Core proforma engine for yearly operating and capital cash-flow projections

use serde::{Deserialize, Serialize};

use crate::metrics;
use super::assumptions::ProformaAssumptions;
use super::state::{LoanInForce, ProjectionState};
use super::years::{ProformaMetrics, ProformaResult, ProformaYear};

/// Expense ratio assumed when deriving a revenue baseline from NOI alone
pub const ASSUMED_EXPENSE_RATIO: f64 = 0.73;

/// How loan balances are estimated at refinance and exit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceMethod {
    /// Exact remaining balance from the amortization schedule
    #[default]
    Amortized,
    /// Straight line: 15% of principal repaid every five years
    Approximate,
}

/// Where the year-0 revenue and expense figures come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselineMethod {
    /// Explicit trailing revenue and expenses when both are supplied,
    /// otherwise the fixed expense-ratio inversion
    #[default]
    Auto,
    /// Always invert NOI through the fixed 73% expense ratio
    FixedExpenseRatio,
}

/// Which fee percentages reach the cash flows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeePolicy {
    /// Only the disposition fee, deducted from exit proceeds
    #[default]
    ExitOnly,
    /// Acquisition fee added to equity, asset management fee on gross revenue
    /// each year, refinance fee on the new loan, and the disposition fee
    Full,
}

/// How long a refinance loan stays in force
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefiCarry {
    /// The refinance loan replaces the acquisition loan for the rest of the hold
    #[default]
    Persistent,
    /// The refinance principal is serviced only in the year after the refinance;
    /// later years go back to the acquisition principal at the refinance rate
    OneYear,
}

/// Configuration for a projection run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    pub balance_method: BalanceMethod,
    pub baseline: BaselineMethod,
    pub fees: FeePolicy,
    #[serde(default)]
    pub refi_carry: RefiCarry,
}

impl EngineConfig {
    /// Reproduces earlier proformas number for number
    pub fn legacy() -> Self {
        Self {
            balance_method: BalanceMethod::Approximate,
            baseline: BaselineMethod::FixedExpenseRatio,
            fees: FeePolicy::ExitOnly,
            refi_carry: RefiCarry::OneYear,
        }
    }
}

/// Run a proforma with the default engine configuration
pub fn generate_proforma(assumptions: &ProformaAssumptions) -> ProformaResult {
    ProformaEngine::default().run(assumptions)
}

/// Linear occupancy ramp from current to target, flat afterwards
pub fn occupancy_for_year(year: u32, current: f64, target: f64, ramp_years: u32) -> f64 {
    if year > ramp_years {
        return target;
    }

    let yearly_gain = (target - current) / ramp_years as f64;
    (current + yearly_gain * year as f64).min(target)
}

/// Main proforma engine
#[derive(Debug, Clone, Default)]
pub struct ProformaEngine {
    config: EngineConfig,
}

impl ProformaEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Project every year of the hold and derive summary metrics
    pub fn run(&self, assumptions: &ProformaAssumptions) -> ProformaResult {
        let mut state = ProjectionState::at_acquisition(LoanInForce {
            principal: assumptions.loan_amount(),
            annual_rate: assumptions.interest_rate,
            term_years: assumptions.loan_term_years,
            originated_year: 0,
        });

        let mut years = Vec::with_capacity(assumptions.hold_years as usize);
        for _ in 1..=assumptions.hold_years {
            state.advance_year(self.config.refi_carry);
            let row = self.calculate_year(assumptions, &mut state);
            log::debug!(
                "year {}: occupancy {:.4} noi {:.2} debt service {:.2} cash flow {:.2}",
                row.year,
                row.occupancy,
                row.noi,
                row.debt_service,
                row.cash_flow
            );
            years.push(row);
        }

        let metrics = ProformaMetrics::from_years(&years, self.equity_invested(assumptions), assumptions.hold_years);
        if !metrics.irr_outcome.converged() {
            log::warn!(
                "IRR for {}-year hold is approximate ({} iterations)",
                assumptions.hold_years,
                metrics.irr_outcome.iterations()
            );
        }

        ProformaResult { years, metrics }
    }

    /// Equity outlay at acquisition
    pub fn equity_invested(&self, assumptions: &ProformaAssumptions) -> f64 {
        let down_payment = assumptions.equity_invested();
        match self.config.fees {
            FeePolicy::ExitOnly => down_payment,
            FeePolicy::Full => down_payment + assumptions.purchase_price * assumptions.acquisition_fee_pct,
        }
    }

    /// Year-0 gross revenue and total expenses
    fn baseline(&self, a: &ProformaAssumptions) -> (f64, f64) {
        if self.config.baseline == BaselineMethod::Auto {
            if let (Some(revenue), Some(expenses)) = (a.current_gross_revenue, a.current_total_expenses) {
                return (revenue, expenses);
            }
        }

        let revenue = a.current_noi / (1.0 - ASSUMED_EXPENSE_RATIO);
        (revenue, revenue * ASSUMED_EXPENSE_RATIO)
    }

    /// Calculate a single projection year
    fn calculate_year(&self, a: &ProformaAssumptions, state: &mut ProjectionState) -> ProformaYear {
        let year = state.year;
        let balance_method = self.config.balance_method;

        let occupancy = occupancy_for_year(year, a.current_occupancy, a.target_occupancy, a.occupancy_ramp_years);
        let occupancy_multiplier = if a.current_occupancy > 0.0 {
            occupancy / a.current_occupancy
        } else {
            1.0
        };

        let (base_revenue, base_expenses) = self.baseline(a);
        let gross_revenue = base_revenue * (1.0 + a.annual_rent_growth).powi(year as i32) * occupancy_multiplier;
        let total_expenses =
            base_expenses * (1.0 + a.annual_expense_inflation).powi(year as i32) * occupancy_multiplier;
        let noi = metrics::noi(gross_revenue, total_expenses);

        let debt_service = state.loan.annual_debt_service();

        let asset_mgmt_fee = match self.config.fees {
            FeePolicy::ExitOnly => 0.0,
            FeePolicy::Full => gross_revenue * a.asset_mgmt_fee_pct,
        };
        let cash_flow = metrics::cash_flow(noi, debt_service) - asset_mgmt_fee;

        let mut row = ProformaYear {
            year,
            occupancy,
            gross_revenue,
            total_expenses,
            noi,
            debt_service,
            asset_mgmt_fee,
            cash_flow,
            is_refi_year: false,
            refi_loan_amount: None,
            refi_distribution: None,
            is_exit_year: false,
            exit_sale_price: None,
            exit_proceeds: None,
            capital_returned: None,
            loan_balance: 0.0,
        };

        // Loan in force this year, before any refinance closes
        let loan = state.loan;

        if a.refi_year == Some(year) {
            // Mid-hold valuation uses the exit cap rate
            let estimated_value = capitalize(noi, a.exit_cap_rate);
            let new_loan = estimated_value * a.refi_loan_to_value;
            let old_balance = loan.balance_at(year, balance_method);

            let refi_fee = match self.config.fees {
                FeePolicy::ExitOnly => 0.0,
                FeePolicy::Full => new_loan * a.refi_fee_pct,
            };

            row.is_refi_year = true;
            row.refi_loan_amount = Some(new_loan);
            row.refi_distribution = Some(new_loan - old_balance - refi_fee);

            state.pending_refi = Some(LoanInForce {
                principal: new_loan,
                annual_rate: a.refi_interest_rate.unwrap_or(a.interest_rate),
                term_years: a.loan_term_years,
                originated_year: year,
            });
        }

        if a.exit_year == year {
            let sale_price = capitalize(noi, a.exit_cap_rate);
            let remaining_balance = loan.balance_at(year, balance_method);
            let exit_fees = sale_price * a.exit_fee_pct;
            let proceeds = sale_price - remaining_balance - exit_fees;

            row.is_exit_year = true;
            row.exit_sale_price = Some(sale_price);
            row.exit_proceeds = Some(proceeds);
            row.capital_returned = Some(proceeds);
            state.exited = true;
        }

        row.loan_balance = if state.exited {
            0.0
        } else if let Some(refi) = &state.pending_refi {
            refi.principal
        } else {
            loan.balance_at(year, balance_method)
        };

        row
    }
}

/// Value from NOI and a cap rate; 0 for a non-positive cap rate
fn capitalize(noi: f64, cap_rate: f64) -> f64 {
    if cap_rate <= 0.0 {
        return 0.0;
    }
    noi / cap_rate
}
