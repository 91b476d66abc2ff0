//! Napkin analysis: a quick first-pass screen of a deal before full underwriting
//!
//! Deliberately rough. Assumes a five-year hold, 2% NOI growth to exit, and
//! 85% of the loan still outstanding at sale.

use serde::{Deserialize, Serialize};

use crate::{loan, metrics};

const HOLD_YEARS: u32 = 5;
const NOI_GROWTH: f64 = 0.02;
const REMAINING_LOAN_AT_EXIT: f64 = 0.85;
const DEFAULT_EXIT_CAP_RATE: f64 = 0.09;
const EXIT_CAP_SPREAD: f64 = 1.1;
/// Equity multiple the workbench screens against
pub const TARGET_EQUITY_MULTIPLE: f64 = 3.0;

/// Figures typed into the napkin form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NapkinInput {
    pub gross_revenue: f64,
    pub total_expenses: f64,
    #[serde(default)]
    pub asking_price: Option<f64>,
    pub down_payment_pct: f64,
    pub interest_rate: f64,
    pub loan_term_years: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NapkinResult {
    pub noi: f64,
    pub cap_rate: f64,
    pub expense_ratio: f64,
    pub loan_amount: f64,
    pub annual_debt_service: f64,
    pub cash_flow: f64,
    pub equity_invested: f64,
    pub exit_cap_rate: f64,
    pub estimated_equity_multiple: f64,
    pub max_offer_price: f64,
}

/// Parameters for the max-offer search
#[derive(Debug, Clone, PartialEq)]
pub struct MaxOfferParams {
    pub noi: f64,
    pub target_equity_multiple: f64,
    pub down_payment_pct: f64,
    pub interest_rate: f64,
    pub loan_term_years: u32,
    pub exit_cap_rate: f64,
    pub hold_years: u32,
}

pub fn analyze(input: &NapkinInput) -> NapkinResult {
    let price = input.asking_price.unwrap_or(0.0);

    let noi = metrics::noi(input.gross_revenue, input.total_expenses);
    let cap_rate = metrics::cap_rate(noi, price);
    let expense_ratio = metrics::expense_ratio(input.total_expenses, input.gross_revenue);

    let loan_amount = loan::loan_amount(price, input.down_payment_pct);
    let annual_debt_service = loan::annual_debt_service(loan_amount, input.interest_rate, input.loan_term_years);
    let cash_flow = metrics::cash_flow(noi, annual_debt_service);
    let equity_invested = loan::down_payment(price, input.down_payment_pct);

    let exit_cap_rate = if cap_rate > 0.0 {
        cap_rate * EXIT_CAP_SPREAD
    } else {
        DEFAULT_EXIT_CAP_RATE
    };

    let exit_value = noi * (1.0 + NOI_GROWTH).powi(HOLD_YEARS as i32) / exit_cap_rate;
    let exit_proceeds = exit_value - loan_amount * REMAINING_LOAN_AT_EXIT;
    let total_distributions = cash_flow * HOLD_YEARS as f64 + exit_proceeds;
    let estimated_equity_multiple = metrics::equity_multiple(total_distributions, equity_invested);

    let max_offer_price = max_offer_price(&MaxOfferParams {
        noi,
        target_equity_multiple: TARGET_EQUITY_MULTIPLE,
        down_payment_pct: input.down_payment_pct,
        interest_rate: input.interest_rate,
        loan_term_years: input.loan_term_years,
        exit_cap_rate,
        hold_years: HOLD_YEARS,
    });

    NapkinResult {
        noi,
        cap_rate,
        expense_ratio,
        loan_amount,
        annual_debt_service,
        cash_flow,
        equity_invested,
        exit_cap_rate,
        estimated_equity_multiple,
        max_offer_price,
    }
}

/// Highest price that still reaches the target equity multiple.
///
/// Starts from an 8% cap rate price and steps 5% up or down for at most 20
/// rounds, stopping once within 0.1 of the target.
pub fn max_offer_price(params: &MaxOfferParams) -> f64 {
    let exit_noi = params.noi * (1.0 + NOI_GROWTH).powi(params.hold_years as i32);
    let exit_value = if params.exit_cap_rate > 0.0 { exit_noi / params.exit_cap_rate } else { 0.0 };

    let mut test_price = params.noi / 0.08;

    for _ in 0..20 {
        let equity = loan::down_payment(test_price, params.down_payment_pct);
        let loan_amount = loan::loan_amount(test_price, params.down_payment_pct);
        let debt_service = loan::annual_debt_service(loan_amount, params.interest_rate, params.loan_term_years);
        let annual_cash_flow = params.noi - debt_service;

        let exit_proceeds = exit_value - loan_amount * REMAINING_LOAN_AT_EXIT;
        let total_distributions = annual_cash_flow * params.hold_years as f64 + exit_proceeds;
        let multiple = metrics::equity_multiple(total_distributions, equity);

        if (multiple - params.target_equity_multiple).abs() < 0.1 {
            return test_price;
        }

        if multiple > params.target_equity_multiple {
            test_price *= 1.05;
        } else {
            test_price *= 0.95;
        }
    }

    test_price
}
