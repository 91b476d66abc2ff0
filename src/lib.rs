//! Underwriting Engine - Proforma projections and returns for real-estate acquisitions
//!
//! This library provides:
//! - Amortizing loan arithmetic
//! - Single-period deal metrics (NOI, cap rate, cash-on-cash, equity multiple)
//! - T12 operating data aggregation
//! - Napkin screening of a deal before full underwriting
//! - Multi-year proforma projections with refinance and exit events, and IRR
//! - What-if and batch scenario runs

pub mod deal;
pub mod error;
pub mod loan;
pub mod metrics;
pub mod napkin;
pub mod proforma;
pub mod scenario;
pub mod t12;

// Re-export commonly used types
pub use deal::DealFile;
pub use error::{Result, UnderwritingError};
pub use proforma::{
    generate_proforma, EngineConfig, ProformaAssumptions, ProformaEngine, ProformaMetrics, ProformaResult,
    ProformaYear,
};
pub use scenario::{ScenarioRunner, WhatIf};
pub use t12::{T12Month, T12Totals};
