//! Proforma assumptions and their resolution from deal and T12 data

use serde::{Deserialize, Serialize};

use crate::error::{Result, UnderwritingError};
use crate::metrics;
use crate::t12::T12Totals;

/// Occupancy assumed when no T12 data is on file
pub const DEFAULT_OCCUPANCY: f64 = 0.85;
/// Hard cap on stabilized occupancy
pub const MAX_TARGET_OCCUPANCY: f64 = 0.93;
/// Cap rate assumed when price or NOI is missing
pub const DEFAULT_PURCHASE_CAP_RATE: f64 = 0.08;

fn default_down_payment_pct() -> f64 { 0.30 }
fn default_interest_rate() -> f64 { 0.08 }
fn default_loan_term_years() -> u32 { 25 }
fn default_refi_loan_to_value() -> f64 { 0.75 }
fn default_acquisition_fee_pct() -> f64 { 0.02 }
fn default_asset_mgmt_fee_pct() -> f64 { 0.02 }
fn default_refi_fee_pct() -> f64 { 0.01 }
fn default_exit_fee_pct() -> f64 { 0.02 }

/// Complete input for one proforma run
///
/// Rates and percentages are decimals (0.03 for 3%). Deserializes from the
/// camelCase JSON the deal workbench stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProformaAssumptions {
    // Current state
    #[serde(rename = "currentNOI")]
    pub current_noi: f64,
    pub current_occupancy: f64,
    pub purchase_price: f64,

    /// Trailing gross revenue; with `current_total_expenses` replaces the
    /// fixed expense-ratio baseline
    #[serde(default)]
    pub current_gross_revenue: Option<f64>,
    #[serde(default)]
    pub current_total_expenses: Option<f64>,

    // Loan terms
    #[serde(default = "default_down_payment_pct")]
    pub down_payment_pct: f64,
    #[serde(default = "default_interest_rate")]
    pub interest_rate: f64,
    #[serde(default = "default_loan_term_years")]
    pub loan_term_years: u32,

    // Growth
    pub annual_rent_growth: f64,
    pub annual_expense_inflation: f64,

    // Occupancy ramp
    pub target_occupancy: f64,
    pub occupancy_ramp_years: u32,

    pub hold_years: u32,

    // Refinance
    #[serde(default)]
    pub refi_year: Option<u32>,
    #[serde(default)]
    pub refi_interest_rate: Option<f64>,
    #[serde(default = "default_refi_loan_to_value")]
    pub refi_loan_to_value: f64,

    // Exit
    pub exit_year: u32,
    /// Should sit above the purchase cap rate; not enforced
    pub exit_cap_rate: f64,

    // Fees
    #[serde(default = "default_acquisition_fee_pct")]
    pub acquisition_fee_pct: f64,
    #[serde(default = "default_asset_mgmt_fee_pct")]
    pub asset_mgmt_fee_pct: f64,
    #[serde(default = "default_refi_fee_pct")]
    pub refi_fee_pct: f64,
    #[serde(default = "default_exit_fee_pct")]
    pub exit_fee_pct: f64,
}

impl ProformaAssumptions {
    pub fn loan_amount(&self) -> f64 {
        crate::loan::loan_amount(self.purchase_price, self.down_payment_pct)
    }

    pub fn equity_invested(&self) -> f64 {
        crate::loan::down_payment(self.purchase_price, self.down_payment_pct)
    }

    pub fn purchase_cap_rate(&self) -> f64 {
        metrics::cap_rate(self.current_noi, self.purchase_price)
    }

    /// Check ranges the deal forms enforce before a run.
    ///
    /// The engine accepts anything; this is for callers that take input from users.
    pub fn validate(&self) -> Result<()> {
        check_range("holdYears", self.hold_years as f64, 1.0, 15.0)?;
        check_range("annualRentGrowth", self.annual_rent_growth, 0.0, 0.15)?;
        check_range("annualExpenseInflation", self.annual_expense_inflation, 0.0, 0.10)?;
        check_range("targetOccupancy", self.target_occupancy, 0.0, MAX_TARGET_OCCUPANCY)?;
        check_range("occupancyRampYears", self.occupancy_ramp_years as f64, 0.0, 5.0)?;
        check_range("downPaymentPct", self.down_payment_pct, 0.0, 1.0)?;
        check_range("interestRate", self.interest_rate, 0.0, 1.0)?;

        if self.loan_term_years == 0 {
            return Err(UnderwritingError::invalid_assumption("loanTermYears", "must be positive"));
        }
        if let Some(year) = self.refi_year {
            check_range("refiYear", year as f64, 0.0, 15.0)?;
        }
        if let Some(rate) = self.refi_interest_rate {
            check_range("refiInterestRate", rate, 0.0, 0.20)?;
        }
        if self.exit_cap_rate <= 0.0 || self.exit_cap_rate > 0.20 {
            return Err(UnderwritingError::invalid_assumption(
                "exitCapRate",
                format!("{} must be in (0, 0.2]", self.exit_cap_rate),
            ));
        }

        if let Some(refi_year) = self.refi_year {
            if refi_year >= self.exit_year {
                log::warn!(
                    "refinance in year {} does not precede exit in year {}",
                    refi_year,
                    self.exit_year
                );
            }
        }
        if self.exit_year > self.hold_years {
            log::warn!(
                "exit year {} is beyond the {}-year hold; no sale will be modeled",
                self.exit_year,
                self.hold_years
            );
        }
        if self.exit_cap_rate <= self.purchase_cap_rate() {
            log::warn!(
                "exit cap rate {:.4} is not above purchase cap rate {:.4}",
                self.exit_cap_rate,
                self.purchase_cap_rate()
            );
        }

        Ok(())
    }
}

fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<()> {
    if value < min || value > max || value.is_nan() {
        return Err(UnderwritingError::invalid_assumption(
            field,
            format!("{} must be between {} and {}", value, min, max),
        ));
    }
    Ok(())
}

/// Deal terms as stored on the deal record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealTerms {
    #[serde(default)]
    pub asking_price: Option<f64>,
    #[serde(default)]
    pub noi_current: Option<f64>,
    #[serde(default)]
    pub down_payment_pct: Option<f64>,
    #[serde(default)]
    pub interest_rate: Option<f64>,
    #[serde(default)]
    pub loan_term_years: Option<u32>,
}

/// User-chosen growth, hold, refinance, and exit parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthInputs {
    pub hold_years: u32,
    pub annual_rent_growth: f64,
    pub annual_expense_inflation: f64,
    pub target_occupancy: f64,
    pub occupancy_ramp_years: u32,
    #[serde(default)]
    pub refi_year: Option<u32>,
    #[serde(default)]
    pub refi_interest_rate: Option<f64>,
    pub exit_cap_rate: f64,
}

impl GrowthInputs {
    /// Starting point offered before the user adjusts anything
    pub fn defaults_for(current_occupancy: f64, purchase_cap_rate: f64) -> Self {
        Self {
            hold_years: 5,
            annual_rent_growth: 0.03,
            annual_expense_inflation: 0.025,
            target_occupancy: MAX_TARGET_OCCUPANCY,
            occupancy_ramp_years: if current_occupancy < 0.85 { 2 } else { 1 },
            refi_year: Some(2),
            refi_interest_rate: None,
            // 10% wider than purchase, i.e. more conservative
            exit_cap_rate: purchase_cap_rate * 1.1,
        }
    }
}

/// Build full assumptions from a deal, its T12 totals, and the user's inputs.
///
/// T12 figures win over the deal record; missing values take the workbench
/// defaults. The exit is always modeled at the end of the hold.
pub fn resolve_assumptions(deal: &DealTerms, t12: &T12Totals, growth: &GrowthInputs) -> ProformaAssumptions {
    let current_noi = non_zero(t12.total_noi)
        .or_else(|| deal.noi_current.and_then(non_zero))
        .unwrap_or(0.0);
    let current_occupancy = non_zero(t12.avg_occupancy_rate).unwrap_or(DEFAULT_OCCUPANCY);

    let (current_gross_revenue, current_total_expenses) = if t12.total_gross_revenue > 0.0 {
        (Some(t12.total_gross_revenue), Some(t12.total_expenses))
    } else {
        (None, None)
    };

    ProformaAssumptions {
        current_noi,
        current_occupancy,
        purchase_price: deal.asking_price.unwrap_or(0.0),
        current_gross_revenue,
        current_total_expenses,
        down_payment_pct: deal.down_payment_pct.and_then(non_zero).unwrap_or_else(default_down_payment_pct),
        interest_rate: deal.interest_rate.and_then(non_zero).unwrap_or_else(default_interest_rate),
        loan_term_years: deal.loan_term_years.filter(|&t| t > 0).unwrap_or_else(default_loan_term_years),
        annual_rent_growth: growth.annual_rent_growth,
        annual_expense_inflation: growth.annual_expense_inflation,
        target_occupancy: growth.target_occupancy,
        occupancy_ramp_years: growth.occupancy_ramp_years,
        hold_years: growth.hold_years,
        refi_year: growth.refi_year,
        refi_interest_rate: growth.refi_interest_rate,
        refi_loan_to_value: default_refi_loan_to_value(),
        exit_year: growth.hold_years,
        exit_cap_rate: growth.exit_cap_rate,
        acquisition_fee_pct: default_acquisition_fee_pct(),
        asset_mgmt_fee_pct: default_asset_mgmt_fee_pct(),
        refi_fee_pct: default_refi_fee_pct(),
        exit_fee_pct: default_exit_fee_pct(),
    }
}

/// Purchase cap rate for suggesting defaults, falling back to 8%
pub fn suggested_purchase_cap_rate(current_noi: f64, asking_price: Option<f64>) -> f64 {
    match asking_price {
        Some(price) if price > 0.0 && current_noi != 0.0 => current_noi / price,
        _ => DEFAULT_PURCHASE_CAP_RATE,
    }
}

fn non_zero(value: f64) -> Option<f64> {
    if value == 0.0 { None } else { Some(value) }
}

#[cfg(test)]
pub(crate) fn sample_assumptions() -> ProformaAssumptions {
    ProformaAssumptions {
        current_noi: 500_000.0,
        current_occupancy: 0.85,
        purchase_price: 6_250_000.0,
        current_gross_revenue: None,
        current_total_expenses: None,
        down_payment_pct: 0.30,
        interest_rate: 0.08,
        loan_term_years: 25,
        annual_rent_growth: 0.03,
        annual_expense_inflation: 0.025,
        target_occupancy: 0.93,
        occupancy_ramp_years: 2,
        hold_years: 5,
        refi_year: Some(2),
        refi_interest_rate: Some(0.07),
        refi_loan_to_value: 0.75,
        exit_year: 5,
        exit_cap_rate: 0.088,
        acquisition_fee_pct: 0.02,
        asset_mgmt_fee_pct: 0.02,
        refi_fee_pct: 0.01,
        exit_fee_pct: 0.02,
    }
}
