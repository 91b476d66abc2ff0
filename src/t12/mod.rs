//! Trailing-twelve-month (T12) operating data and its aggregation

pub mod loader;

pub use loader::{load_t12, load_t12_from_reader};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::metrics;

/// Revenue line items for one month
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RevenueItems {
    pub room_rent: f64,
    /// Level-of-care fees
    pub loc_fees: f64,
    pub other_income: f64,
}

/// Operating expense categories for one month
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseItems {
    pub payroll: f64,
    pub dietary: f64,
    pub utilities: f64,
    pub insurance: f64,
    pub management_fee: f64,
    pub maintenance: f64,
    pub marketing: f64,
    pub admin: f64,
    pub other_expenses: f64,
}

impl ExpenseItems {
    pub fn total(&self) -> f64 {
        self.payroll
            + self.dietary
            + self.utilities
            + self.insurance
            + self.management_fee
            + self.maintenance
            + self.marketing
            + self.admin
            + self.other_expenses
    }
}

/// One month of operating history with derived totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct T12Month {
    /// First day of the month
    pub month: NaiveDate,
    pub revenue: RevenueItems,
    pub expenses: ExpenseItems,
    pub occupied_units: u32,
    pub total_units: u32,

    // Derived
    pub gross_revenue: f64,
    pub total_expenses: f64,
    pub occupancy_rate: f64,
    pub noi: f64,
}

impl T12Month {
    /// Build a month from raw line items, deriving its totals
    pub fn from_line_items(
        month: NaiveDate,
        revenue: RevenueItems,
        expenses: ExpenseItems,
        occupied_units: u32,
        total_units: u32,
    ) -> Self {
        let gross_revenue = revenue.room_rent + revenue.loc_fees + revenue.other_income;
        let total_expenses = expenses.total();
        let occupancy_rate = if total_units == 0 {
            0.0
        } else {
            occupied_units as f64 / total_units as f64
        };

        Self {
            month,
            revenue,
            expenses,
            occupied_units,
            total_units,
            gross_revenue,
            total_expenses,
            occupancy_rate,
            noi: metrics::noi(gross_revenue, total_expenses),
        }
    }

    pub fn expense_ratio(&self) -> f64 {
        metrics::expense_ratio(self.total_expenses, self.gross_revenue)
    }
}

/// Sums over a set of months
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct T12Totals {
    pub months: usize,
    pub total_gross_revenue: f64,
    pub total_room_rent: f64,
    pub total_loc_fees: f64,
    pub total_other_income: f64,
    pub total_expenses: f64,
    pub expenses: ExpenseItems,
    pub total_noi: f64,
    pub avg_occupancy_rate: f64,
    pub avg_expense_ratio: f64,
}

impl T12Totals {
    /// Aggregate monthly rows; no months gives all zeros
    pub fn from_months(months: &[T12Month]) -> Self {
        if months.is_empty() {
            return Self::default();
        }

        let mut totals = Self {
            months: months.len(),
            ..Default::default()
        };
        let mut occupancy_sum = 0.0;

        for m in months {
            totals.total_gross_revenue += m.gross_revenue;
            totals.total_room_rent += m.revenue.room_rent;
            totals.total_loc_fees += m.revenue.loc_fees;
            totals.total_other_income += m.revenue.other_income;
            totals.total_expenses += m.total_expenses;
            totals.total_noi += m.noi;

            let e = &mut totals.expenses;
            e.payroll += m.expenses.payroll;
            e.dietary += m.expenses.dietary;
            e.utilities += m.expenses.utilities;
            e.insurance += m.expenses.insurance;
            e.management_fee += m.expenses.management_fee;
            e.maintenance += m.expenses.maintenance;
            e.marketing += m.expenses.marketing;
            e.admin += m.expenses.admin;
            e.other_expenses += m.expenses.other_expenses;

            occupancy_sum += m.occupancy_rate;
        }

        totals.avg_occupancy_rate = occupancy_sum / months.len() as f64;
        totals.avg_expense_ratio = metrics::expense_ratio(totals.total_expenses, totals.total_gross_revenue);
        totals
    }

    /// Each expense category as a share of gross revenue
    pub fn expense_breakdown(&self) -> ExpenseItems {
        let share = |amount: f64| metrics::expense_ratio(amount, self.total_gross_revenue);
        let e = &self.expenses;

        ExpenseItems {
            payroll: share(e.payroll),
            dietary: share(e.dietary),
            utilities: share(e.utilities),
            insurance: share(e.insurance),
            management_fee: share(e.management_fee),
            maintenance: share(e.maintenance),
            marketing: share(e.marketing),
            admin: share(e.admin),
            other_expenses: share(e.other_expenses),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn month(m: u32, occupied: u32) -> T12Month {
        T12Month::from_line_items(
            NaiveDate::from_ymd_opt(2024, m, 1).unwrap(),
            RevenueItems { room_rent: 120_000.0, loc_fees: 25_000.0, other_income: 5_000.0 },
            ExpenseItems {
                payroll: 60_000.0,
                dietary: 12_000.0,
                utilities: 8_000.0,
                insurance: 4_000.0,
                management_fee: 7_500.0,
                maintenance: 5_000.0,
                marketing: 2_000.0,
                admin: 6_000.0,
                other_expenses: 5_000.0,
            },
            occupied,
            100,
        )
    }

    #[test]
    fn test_month_derivations() {
        let m = month(1, 85);
        assert_relative_eq!(m.gross_revenue, 150_000.0);
        assert_relative_eq!(m.total_expenses, 109_500.0);
        assert_relative_eq!(m.noi, 40_500.0);
        assert_relative_eq!(m.occupancy_rate, 0.85);
        assert_relative_eq!(m.expense_ratio(), 0.73);
    }

    #[test]
    fn test_zero_units_occupancy() {
        let m = T12Month::from_line_items(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            RevenueItems::default(),
            ExpenseItems::default(),
            0,
            0,
        );
        assert_eq!(m.occupancy_rate, 0.0);
        assert_eq!(m.expense_ratio(), 0.0);
    }

    #[test]
    fn test_totals_over_twelve_months() {
        let months: Vec<_> = (1..=12).map(|m| month(m, if m <= 6 { 80 } else { 90 })).collect();
        let totals = T12Totals::from_months(&months);

        assert_eq!(totals.months, 12);
        assert_relative_eq!(totals.total_gross_revenue, 1_800_000.0);
        assert_relative_eq!(totals.total_noi, 486_000.0);
        assert_relative_eq!(totals.expenses.payroll, 720_000.0);
        assert_relative_eq!(totals.avg_occupancy_rate, 0.85, epsilon = 1e-12);
        assert_relative_eq!(totals.avg_expense_ratio, 0.73, epsilon = 1e-12);

        let breakdown = totals.expense_breakdown();
        assert_relative_eq!(breakdown.payroll, 0.40, epsilon = 1e-12);
        assert_relative_eq!(breakdown.total(), 0.73, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_totals() {
        let totals = T12Totals::from_months(&[]);
        assert_eq!(totals, T12Totals::default());
        assert_eq!(totals.expense_breakdown(), ExpenseItems::default());
    }
}
