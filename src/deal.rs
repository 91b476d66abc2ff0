//! Deal files: the JSON a deal is underwritten from

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::proforma::assumptions::{resolve_assumptions, suggested_purchase_cap_rate, DEFAULT_OCCUPANCY};
use crate::proforma::{DealTerms, GrowthInputs, ProformaAssumptions};
use crate::t12::T12Totals;

/// Default path to the sample deal
pub const DEFAULT_DEAL_PATH: &str = "data/sample_deal.json";

/// A deal record with optional user growth inputs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealFile {
    #[serde(default)]
    pub deal_id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub terms: DealTerms,
    /// Missing growth inputs take the suggested defaults
    #[serde(default)]
    pub growth: Option<GrowthInputs>,
}

impl DealFile {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }

    /// Growth inputs from the file, or the suggested defaults for this deal
    pub fn growth_inputs(&self, t12: &T12Totals) -> GrowthInputs {
        if let Some(growth) = &self.growth {
            return growth.clone();
        }

        let occupancy = if t12.avg_occupancy_rate > 0.0 { t12.avg_occupancy_rate } else { DEFAULT_OCCUPANCY };
        let noi = if t12.total_noi != 0.0 { t12.total_noi } else { self.terms.noi_current.unwrap_or(0.0) };
        GrowthInputs::defaults_for(occupancy, suggested_purchase_cap_rate(noi, self.terms.asking_price))
    }

    /// Full proforma assumptions for this deal
    pub fn assumptions(&self, t12: &T12Totals) -> ProformaAssumptions {
        resolve_assumptions(&self.terms, t12, &self.growth_inputs(t12))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_sample_deal() {
        let deal = DealFile::load(DEFAULT_DEAL_PATH).expect("Failed to load sample deal");
        assert_eq!(deal.deal_id, 1);
        assert_eq!(deal.terms.asking_price, Some(6_250_000.0));

        let assumptions = deal.assumptions(&T12Totals::default());
        assert_eq!(assumptions.current_noi, 500_000.0);
        assert_eq!(assumptions.refi_year, Some(2));
        assert_eq!(assumptions.exit_year, 5);
        assert!(assumptions.validate().is_ok());
    }

    #[test]
    fn test_missing_growth_uses_defaults() {
        let deal: DealFile = serde_json::from_str(r#"{"terms": {"askingPrice": 5000000, "noiCurrent": 400000}}"#).unwrap();
        let growth = deal.growth_inputs(&T12Totals::default());

        assert_eq!(growth.hold_years, 5);
        assert_eq!(growth.refi_year, Some(2));
        assert!((growth.exit_cap_rate - 0.088).abs() < 1e-12);
    }
}
