//! Proforma engine: yearly projections and investment returns

mod state;
mod engine;
mod years;
pub mod assumptions;
pub mod export;
pub mod irr;

pub use state::{LoanInForce, ProjectionState};
pub use engine::{
    generate_proforma, occupancy_for_year, BalanceMethod, BaselineMethod, EngineConfig, FeePolicy,
    ProformaEngine, RefiCarry, ASSUMED_EXPENSE_RATIO,
};
pub use years::{equity_cash_flows, ProformaMetrics, ProformaResult, ProformaYear};
pub use assumptions::{resolve_assumptions, DealTerms, GrowthInputs, ProformaAssumptions};
pub use irr::{calculate_irr, IrrOutcome};
