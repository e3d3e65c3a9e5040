//! Waste Carbon
//!
//! HTTP service that predicts total carbon emissions (kg CO₂e) for a
//! waste-treatment scenario:
//! - Pre-trained regression pipeline loaded from a JSON/YAML artifact
//! - CO₂ / CH₄ / N₂O breakdown from emission factors and GWP100 values
//! - Form page plus a JSON/url-encoded `/predict` endpoint

pub mod config;
pub mod emissions;
pub mod model;
pub mod server;
pub mod services;
pub mod utils;

// Re-exports for convenience
pub use config::AppConfig;
pub use emissions::{calculate_gas_breakdown, EmissionFactorTable, GasBreakdown};
pub use model::{FeatureFrame, ModelArtifact, ModelError, Regressor};
pub use server::{router, run_server, AppState, ServerError};
