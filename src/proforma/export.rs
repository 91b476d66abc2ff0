//! Persisted-row shape for proforma years and CSV output

use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use super::years::ProformaYear;

/// One stored proforma row; numeric fields are decimal strings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProformaRow {
    pub deal_id: u32,
    pub year: u32,
    pub target_occupancy: String,
    pub projected_revenue: String,
    pub projected_expenses: String,
    pub projected_noi: String,
    pub debt_service: String,
    pub cash_flow: String,
    pub is_refi_year: bool,
    pub is_exit_year: bool,
    pub capital_returned: Option<String>,
}

impl ProformaRow {
    pub fn from_year(deal_id: u32, year: &ProformaYear) -> Self {
        Self {
            deal_id,
            year: year.year,
            target_occupancy: year.occupancy.to_string(),
            projected_revenue: year.gross_revenue.to_string(),
            projected_expenses: year.total_expenses.to_string(),
            projected_noi: year.noi.to_string(),
            debt_service: year.debt_service.to_string(),
            cash_flow: year.cash_flow.to_string(),
            is_refi_year: year.is_refi_year,
            is_exit_year: year.is_exit_year,
            capital_returned: year.capital_returned.map(|v| v.to_string()),
        }
    }
}

/// Convert a full projection into stored rows
pub fn to_rows(deal_id: u32, years: &[ProformaYear]) -> Vec<ProformaRow> {
    years.iter().map(|y| ProformaRow::from_year(deal_id, y)).collect()
}

/// Write rows as CSV with a header to any writer
pub fn write_proforma_csv<W: Write>(writer: W, deal_id: u32, years: &[ProformaYear]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in to_rows(deal_id, years) {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write rows as CSV to a file
pub fn write_proforma_csv_path<P: AsRef<Path>>(path: P, deal_id: u32, years: &[ProformaYear]) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_proforma_csv(file, deal_id, years)
}
