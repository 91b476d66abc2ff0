//! Single-period financial calculators
//!
//! Pure functions over scalars. A zero denominator yields 0 rather than an error.

/// Net operating income
pub fn noi(gross_revenue: f64, total_expenses: f64) -> f64 {
    gross_revenue - total_expenses
}

pub fn cap_rate(noi: f64, purchase_price: f64) -> f64 {
    if purchase_price == 0.0 {
        return 0.0;
    }
    noi / purchase_price
}

pub fn expense_ratio(total_expenses: f64, gross_revenue: f64) -> f64 {
    if gross_revenue == 0.0 {
        return 0.0;
    }
    total_expenses / gross_revenue
}

/// Cash flow after debt service
pub fn cash_flow(noi: f64, debt_service: f64) -> f64 {
    noi - debt_service
}

pub fn cash_on_cash(cash_flow: f64, equity_invested: f64) -> f64 {
    if equity_invested == 0.0 {
        return 0.0;
    }
    cash_flow / equity_invested
}

pub fn equity_multiple(total_distributions: f64, total_invested: f64) -> f64 {
    if total_invested == 0.0 {
        return 0.0;
    }
    total_distributions / total_invested
}
