//! Scenario runner for what-if recomputes and batch projections
//!
//! Holds one deal's base assumptions and re-runs the engine with overrides,
//! the way the returns sliders do. Runs are independent, so batches fan out
//! across threads.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::proforma::{EngineConfig, ProformaAssumptions, ProformaEngine, ProformaMetrics, ProformaResult};

/// Overrides for a single what-if run; `None` keeps the base value
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhatIf {
    pub exit_cap_rate: Option<f64>,
    /// Also moves the exit to the end of the new hold
    pub hold_years: Option<u32>,
    pub annual_rent_growth: Option<f64>,
}

impl WhatIf {
    pub fn apply(&self, base: &ProformaAssumptions) -> ProformaAssumptions {
        let mut assumptions = base.clone();
        if let Some(rate) = self.exit_cap_rate {
            assumptions.exit_cap_rate = rate;
        }
        if let Some(years) = self.hold_years {
            assumptions.hold_years = years;
            assumptions.exit_year = years;
        }
        if let Some(growth) = self.annual_rent_growth {
            assumptions.annual_rent_growth = growth;
        }
        assumptions
    }
}

/// One cell of an exit-cap by hold-period grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitivityPoint {
    pub exit_cap_rate: f64,
    pub hold_years: u32,
    pub metrics: ProformaMetrics,
}

/// Re-runs a deal's proforma under different overrides
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    base_assumptions: ProformaAssumptions,
    engine: ProformaEngine,
}

impl ScenarioRunner {
    pub fn new(base_assumptions: ProformaAssumptions) -> Self {
        Self::with_config(base_assumptions, EngineConfig::default())
    }

    pub fn with_config(base_assumptions: ProformaAssumptions, config: EngineConfig) -> Self {
        Self {
            base_assumptions,
            engine: ProformaEngine::new(config),
        }
    }

    /// Run the base case
    pub fn run_base(&self) -> ProformaResult {
        self.engine.run(&self.base_assumptions)
    }

    /// Run one set of overrides against the base case
    pub fn run(&self, what_if: &WhatIf) -> ProformaResult {
        self.engine.run(&what_if.apply(&self.base_assumptions))
    }

    /// Run many overrides in parallel; results keep input order
    pub fn run_scenarios(&self, what_ifs: &[WhatIf]) -> Vec<ProformaResult> {
        what_ifs.par_iter().map(|w| self.run(w)).collect()
    }

    /// Run independent deals with this runner's engine configuration
    pub fn run_batch(&self, deals: &[ProformaAssumptions]) -> Vec<ProformaResult> {
        deals.par_iter().map(|a| self.engine.run(a)).collect()
    }

    /// Metrics for every exit cap rate and hold period combination
    pub fn sensitivity_grid(&self, exit_cap_rates: &[f64], hold_years: &[u32]) -> Vec<SensitivityPoint> {
        let cells: Vec<(f64, u32)> = exit_cap_rates
            .iter()
            .flat_map(|&cap| hold_years.iter().map(move |&years| (cap, years)))
            .collect();

        log::debug!("running {} sensitivity cells", cells.len());

        cells
            .par_iter()
            .map(|&(exit_cap_rate, years)| {
                let what_if = WhatIf {
                    exit_cap_rate: Some(exit_cap_rate),
                    hold_years: Some(years),
                    annual_rent_growth: None,
                };
                SensitivityPoint {
                    exit_cap_rate,
                    hold_years: years,
                    metrics: self.run(&what_if).metrics,
                }
            })
            .collect()
    }

    pub fn assumptions(&self) -> &ProformaAssumptions {
        &self.base_assumptions
    }

    pub fn assumptions_mut(&mut self) -> &mut ProformaAssumptions {
        &mut self.base_assumptions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proforma::assumptions::sample_assumptions;

    #[test]
    fn test_hold_override_moves_exit() {
        let runner = ScenarioRunner::new(sample_assumptions());
        let result = runner.run(&WhatIf { hold_years: Some(7), ..Default::default() });

        assert_eq!(result.years.len(), 7);
        assert!(result.years[6].is_exit_year);
    }

    #[test]
    fn test_scenarios_keep_order() {
        let runner = ScenarioRunner::new(sample_assumptions());
        let what_ifs: Vec<_> = [0.07, 0.09, 0.11]
            .iter()
            .map(|&rate| WhatIf { exit_cap_rate: Some(rate), ..Default::default() })
            .collect();

        let results = runner.run_scenarios(&what_ifs);
        assert_eq!(results.len(), 3);

        // Tighter exit cap means a higher sale price and better multiple
        assert!(results[0].metrics.equity_multiple > results[1].metrics.equity_multiple);
        assert!(results[1].metrics.equity_multiple > results[2].metrics.equity_multiple);
    }

    #[test]
    fn test_rent_growth_lifts_returns() {
        let runner = ScenarioRunner::new(sample_assumptions());
        let low = runner.run(&WhatIf { annual_rent_growth: Some(0.0), ..Default::default() });
        let high = runner.run(&WhatIf { annual_rent_growth: Some(0.05), ..Default::default() });
        assert!(high.metrics.total_distributions > low.metrics.total_distributions);
    }

    #[test]
    fn test_sensitivity_grid_covers_all_cells() {
        let runner = ScenarioRunner::new(sample_assumptions());
        let grid = runner.sensitivity_grid(&[0.08, 0.09], &[3, 5, 7]);

        assert_eq!(grid.len(), 6);
        assert_eq!(grid[0].exit_cap_rate, 0.08);
        assert_eq!(grid[0].hold_years, 3);
        assert_eq!(grid[5].hold_years, 7);
    }

    #[test]
    fn test_batch_matches_individual_runs() {
        let runner = ScenarioRunner::new(sample_assumptions());
        let mut other = sample_assumptions();
        other.purchase_price = 5_500_000.0;

        let batch = runner.run_batch(&[sample_assumptions(), other.clone()]);
        assert_eq!(batch[0], runner.run_base());
        assert_eq!(batch[1], ProformaEngine::default().run(&other));
    }
}
