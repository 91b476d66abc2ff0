//! Amortizing loan arithmetic used by every downstream layer

/// Share of original principal assumed repaid per five years by the legacy
/// straight-line balance estimate
const LEGACY_PAYDOWN_PER_FIVE_YEARS: f64 = 0.15;

/// Loan amount financed for a purchase
pub fn loan_amount(purchase_price: f64, down_payment_pct: f64) -> f64 {
    purchase_price * (1.0 - down_payment_pct)
}

/// Cash down payment for a purchase
pub fn down_payment(purchase_price: f64, down_payment_pct: f64) -> f64 {
    purchase_price * down_payment_pct
}

/// Level monthly payment that fully amortizes `principal` over `years`
///
/// Uses the annuity formula `P·r·(1+r)^n / ((1+r)^n − 1)` with `r` the monthly
/// rate. A zero rate falls back to straight division. `years` must be positive.
pub fn monthly_payment(principal: f64, annual_rate: f64, years: u32) -> f64 {
    let monthly_rate = annual_rate / 12.0;
    let num_payments = (years * 12) as f64;

    if monthly_rate == 0.0 {
        return principal / num_payments;
    }

    let growth = (1.0 + monthly_rate).powf(num_payments);
    principal * monthly_rate * growth / (growth - 1.0)
}

/// Twelve monthly payments
pub fn annual_debt_service(principal: f64, annual_rate: f64, years: u32) -> f64 {
    monthly_payment(principal, annual_rate, years) * 12.0
}

/// Exact principal outstanding after `elapsed_years` of level monthly payments
///
/// Returns 0 once the loan is fully amortized.
pub fn remaining_balance(principal: f64, annual_rate: f64, years: u32, elapsed_years: u32) -> f64 {
    if elapsed_years >= years {
        return 0.0;
    }

    let paid = (elapsed_years * 12) as f64;
    let monthly_rate = annual_rate / 12.0;
    let payment = monthly_payment(principal, annual_rate, years);

    if monthly_rate == 0.0 {
        return (principal - payment * paid).max(0.0);
    }

    let growth = (1.0 + monthly_rate).powf(paid);
    (principal * growth - payment * (growth - 1.0) / monthly_rate).max(0.0)
}

/// Legacy straight-line balance estimate: 15% of principal repaid every five years
///
/// Kept for output compatibility with earlier proformas. Can go negative for
/// very long holds; callers get the raw figure.
pub fn approximate_balance(principal: f64, year: u32) -> f64 {
    principal * (1.0 - LEGACY_PAYDOWN_PER_FIVE_YEARS * (year as f64 / 5.0))
}
