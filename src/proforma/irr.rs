//! Internal Rate of Return (IRR) calculation
//!
//! Used to derive the equity IRR from a proforma's yearly cash flows

use serde::{Deserialize, Serialize};

/// Starting rate for Newton-Raphson
pub const DEFAULT_IRR_GUESS: f64 = 0.10;

const TOLERANCE: f64 = 1e-5;
const MAX_ITERATIONS: u32 = 100;

/// Outcome of an IRR solve
///
/// Both variants carry a usable number; callers decide whether an unconverged
/// estimate is good enough to show.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IrrOutcome {
    Converged { rate: f64, iterations: u32 },
    DidNotConverge { last_estimate: f64, iterations: u32 },
}

impl IrrOutcome {
    /// Best-effort rate regardless of convergence
    pub fn rate(&self) -> f64 {
        match *self {
            IrrOutcome::Converged { rate, .. } => rate,
            IrrOutcome::DidNotConverge { last_estimate, .. } => last_estimate,
        }
    }

    pub fn converged(&self) -> bool {
        matches!(self, IrrOutcome::Converged { .. })
    }

    pub fn iterations(&self) -> u32 {
        match *self {
            IrrOutcome::Converged { iterations, .. } | IrrOutcome::DidNotConverge { iterations, .. } => {
                iterations
            }
        }
    }
}

/// Calculate the IRR of a yearly cash-flow series using Newton-Raphson.
///
/// # Arguments
/// * `cashflows` - Index 0 is the initial (typically negative) outlay
///
/// # Returns
/// * `IrrOutcome` - Annual IRR as a decimal (e.g., 0.15 for 15%)
pub fn calculate_irr(cashflows: &[f64]) -> IrrOutcome {
    calculate_irr_with_guess(cashflows, DEFAULT_IRR_GUESS)
}

/// Same as [`calculate_irr`] with a caller-supplied starting rate
pub fn calculate_irr_with_guess(cashflows: &[f64], guess: f64) -> IrrOutcome {
    let mut rate = guess;

    for iteration in 1..=MAX_ITERATIONS {
        let (npv, dnpv) = npv_and_derivative(cashflows, rate);

        // Flat NPV curve: Newton has nowhere to go
        if dnpv == 0.0 || !dnpv.is_finite() {
            return IrrOutcome::DidNotConverge {
                last_estimate: rate,
                iterations: iteration - 1,
            };
        }

        let new_rate = rate - npv / dnpv;

        if !new_rate.is_finite() {
            return IrrOutcome::DidNotConverge {
                last_estimate: rate,
                iterations: iteration,
            };
        }

        if (new_rate - rate).abs() < TOLERANCE {
            return IrrOutcome::Converged {
                rate: new_rate,
                iterations: iteration,
            };
        }

        rate = new_rate;
    }

    log::debug!(
        "IRR did not converge after {} iterations, last estimate {:.6}",
        MAX_ITERATIONS,
        rate
    );
    IrrOutcome::DidNotConverge {
        last_estimate: rate,
        iterations: MAX_ITERATIONS,
    }
}

/// Calculate NPV and its derivative with respect to rate
fn npv_and_derivative(cashflows: &[f64], rate: f64) -> (f64, f64) {
    let mut npv = 0.0;
    let mut dnpv = 0.0;

    for (t, &cf) in cashflows.iter().enumerate() {
        npv += cf / (1.0 + rate).powi(t as i32);
        if t > 0 {
            dnpv -= (t as f64) * cf / (1.0 + rate).powi(t as i32 + 1);
        }
    }

    (npv, dnpv)
}

/// Net present value of yearly cash flows at `rate`, index 0 undiscounted
pub fn npv(cashflows: &[f64], rate: f64) -> f64 {
    cashflows
        .iter()
        .enumerate()
        .map(|(t, &cf)| cf / (1.0 + rate).powi(t as i32))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_simple_irr() {
        // Invest 100, get 121 back after one year
        let outcome = calculate_irr(&[-100.0, 121.0]);
        assert!(outcome.converged());
        assert_abs_diff_eq!(outcome.rate(), 0.21, epsilon = 1e-4);
    }

    #[test]
    fn test_two_year_irr() {
        // 10% compounded over two years
        let outcome = calculate_irr(&[-1000.0, 0.0, 1210.0]);
        assert_abs_diff_eq!(outcome.rate(), 0.10, epsilon = 1e-4);
    }

    #[test]
    fn test_irr_zeroes_npv() {
        let cashflows = [-1_875_000.0, 120_000.0, 130_000.0, 140_000.0, 150_000.0, 2_900_000.0];
        let outcome = calculate_irr(&cashflows);
        assert!(outcome.converged());
        assert_abs_diff_eq!(npv(&cashflows, outcome.rate()), 0.0, epsilon = 1e-2);
    }

    #[test]
    fn test_negative_irr() {
        // Lose 20% over one year
        let outcome = calculate_irr(&[-100.0, 80.0]);
        assert_abs_diff_eq!(outcome.rate(), -0.20, epsilon = 1e-4);
    }

    #[test]
    fn test_all_zero_cashflows_do_not_converge() {
        let outcome = calculate_irr(&[0.0, 0.0, 0.0]);
        assert!(!outcome.converged());
        assert_eq!(outcome.rate(), DEFAULT_IRR_GUESS);
        assert_eq!(outcome.iterations(), 0);
    }

    #[test]
    fn test_no_sign_change_reports_failure() {
        // All inflows: NPV never reaches zero
        let outcome = calculate_irr(&[100.0, 100.0, 100.0]);
        assert!(!outcome.converged() || outcome.rate().abs() > 10.0);
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let json = serde_json::to_string(&IrrOutcome::Converged { rate: 0.21, iterations: 4 }).unwrap();
        assert!(json.contains("\"status\":\"converged\""));
    }
}
