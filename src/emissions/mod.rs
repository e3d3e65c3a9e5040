//! Emissions Module
//!
//! Emission factors, GWP constants and the per-gas CO₂e breakdown.

pub mod breakdown;
pub mod factors;

pub use breakdown::{calculate_gas_breakdown, round2, GasBreakdown, GasShare};
pub use factors::{
    co2e, EmissionFactorTable, FactorError, Gas, GasFactors, FALLBACK_FACTORS, GWP_CH4, GWP_CO2,
    GWP_N2O,
};
