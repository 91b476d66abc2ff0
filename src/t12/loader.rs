//! Load T12 months from CSV

use std::path::Path;

use chrono::{Datelike, NaiveDate};
use csv::Reader;

use super::{ExpenseItems, RevenueItems, T12Month};
use crate::error::{Result, UnderwritingError};

/// Raw CSV row; totals are derived, never read
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    month: String,
    room_rent: f64,
    #[serde(alias = "level_of_care_fees")]
    loc_fees: f64,
    other_income: f64,
    occupied_units: u32,
    total_units: u32,
    payroll: f64,
    dietary: f64,
    utilities: f64,
    insurance: f64,
    management_fee: f64,
    maintenance: f64,
    marketing: f64,
    admin: f64,
    other_expenses: f64,
}

impl CsvRow {
    fn into_month(self, row: usize) -> Result<T12Month> {
        let month = parse_month(&self.month).ok_or_else(|| UnderwritingError::InvalidT12 {
            row,
            reason: format!("unrecognized month '{}', expected YYYY-MM or YYYY-MM-DD", self.month),
        })?;

        if self.occupied_units > self.total_units {
            return Err(UnderwritingError::InvalidT12 {
                row,
                reason: format!("{} occupied of {} total units", self.occupied_units, self.total_units),
            });
        }

        Ok(T12Month::from_line_items(
            month,
            RevenueItems {
                room_rent: self.room_rent,
                loc_fees: self.loc_fees,
                other_income: self.other_income,
            },
            ExpenseItems {
                payroll: self.payroll,
                dietary: self.dietary,
                utilities: self.utilities,
                insurance: self.insurance,
                management_fee: self.management_fee,
                maintenance: self.maintenance,
                marketing: self.marketing,
                admin: self.admin,
                other_expenses: self.other_expenses,
            },
            self.occupied_units,
            self.total_units,
        ))
    }
}

fn parse_month(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| NaiveDate::parse_from_str(&format!("{}-01", value), "%Y-%m-%d").ok())
        .map(|d| d.with_day0(0).unwrap_or(d))
}

/// Load T12 months from a CSV file, sorted by month
pub fn load_t12<P: AsRef<Path>>(path: P) -> Result<Vec<T12Month>> {
    let file = std::fs::File::open(path)?;
    load_t12_from_reader(file)
}

/// Load T12 months from any reader (e.g., string buffer, upload stream)
pub fn load_t12_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<T12Month>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut months = Vec::new();

    for (idx, result) in csv_reader.deserialize().enumerate() {
        let row: CsvRow = result?;
        // Header is line 1
        months.push(row.into_month(idx + 2)?);
    }

    months.sort_by_key(|m| m.month);
    log::debug!("loaded {} T12 months", months.len());
    Ok(months)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::t12::T12Totals;

    const HEADER: &str = "month,room_rent,loc_fees,other_income,occupied_units,total_units,payroll,dietary,utilities,insurance,management_fee,maintenance,marketing,admin,other_expenses";

    #[test]
    fn test_load_from_reader_sorts_months() {
        let data = format!(
            "{}\n2024-02,100,10,5,45,50,30,10,5,3,4,2,1,3,2\n2024-01-01,100,10,5,40,50,30,10,5,3,4,2,1,3,2\n",
            HEADER
        );
        let months = load_t12_from_reader(data.as_bytes()).unwrap();

        assert_eq!(months.len(), 2);
        assert_eq!(months[0].month, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(months[1].occupancy_rate, 0.9);
        assert_eq!(months[0].gross_revenue, 115.0);
        assert_eq!(months[0].total_expenses, 60.0);
    }

    #[test]
    fn test_bad_month_reports_row() {
        let data = format!("{}\nJanuary,100,10,5,45,50,30,10,5,3,4,2,1,3,2\n", HEADER);
        match load_t12_from_reader(data.as_bytes()) {
            Err(UnderwritingError::InvalidT12 { row, .. }) => assert_eq!(row, 2),
            other => panic!("expected InvalidT12, got {:?}", other),
        }
    }

    #[test]
    fn test_overfull_units_rejected() {
        let data = format!("{}\n2024-01,100,10,5,51,50,30,10,5,3,4,2,1,3,2\n", HEADER);
        assert!(load_t12_from_reader(data.as_bytes()).is_err());
    }

    #[test]
    fn test_load_sample_file() {
        let months = load_t12("data/sample_t12.csv").expect("Failed to load sample T12");
        assert_eq!(months.len(), 12);

        let totals = T12Totals::from_months(&months);
        assert!(totals.total_noi > 0.0);
        assert!(totals.avg_occupancy_rate > 0.0 && totals.avg_occupancy_rate < 1.0);
    }
}
