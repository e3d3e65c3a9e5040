//! Emission Factors
//!
//! Treatment-related emission factors (kg gas per kg waste) and the
//! 100-year global warming potentials used to fold them into CO₂e.
//!
//! NOTE: the built-in factors are estimated placeholders. Point
//! `CARBON_FACTORS_PATH` at a validated table to replace them.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// GWP of carbon dioxide (baseline)
pub const GWP_CO2: f64 = 1.0;
/// GWP of methane, 100-year horizon
pub const GWP_CH4: f64 = 28.0;
/// GWP of nitrous oxide, 100-year horizon
pub const GWP_N2O: f64 = 298.0;

/// Used when a (waste type, treatment method) pair has no table entry
pub const FALLBACK_FACTORS: GasFactors = GasFactors {
    co2: 0.020,
    ch4: 0.010,
    n2o: 0.005,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gas {
    Co2,
    Ch4,
    N2o,
}

impl Gas {
    pub const ALL: [Gas; 3] = [Gas::Co2, Gas::Ch4, Gas::N2o];

    pub fn gwp(&self) -> f64 {
        match self {
            Gas::Co2 => GWP_CO2,
            Gas::Ch4 => GWP_CH4,
            Gas::N2o => GWP_N2O,
        }
    }
}

/// Converts a gas mass (kg) into kg CO₂e
pub fn co2e(gas: Gas, mass_kg: f64) -> f64 {
    mass_kg * gas.gwp()
}

/// kg of each gas emitted per kg of waste treated
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GasFactors {
    #[serde(rename = "CO2", default)]
    pub co2: f64,
    #[serde(rename = "CH4", default)]
    pub ch4: f64,
    #[serde(rename = "N2O", default)]
    pub n2o: f64,
}

impl GasFactors {
    pub const fn new(co2: f64, ch4: f64, n2o: f64) -> Self {
        Self { co2, ch4, n2o }
    }

    pub fn get(&self, gas: Gas) -> f64 {
        match gas {
            Gas::Co2 => self.co2,
            Gas::Ch4 => self.ch4,
            Gas::N2o => self.n2o,
        }
    }
}

#[derive(Debug, Error)]
pub enum FactorError {
    #[error("failed to read factor table {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse factor table: {0}")]
    Parse(String),
    #[error("invalid {gas:?} factor {value} for {waste_type}/{method}")]
    InvalidFactor {
        waste_type: String,
        method: String,
        gas: Gas,
        value: f64,
    },
    #[error("factor table is empty")]
    Empty,
}

/// waste type -> treatment method -> factors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmissionFactorTable {
    entries: BTreeMap<String, BTreeMap<String, GasFactors>>,
}

const BUILTIN: &[(&str, &[(&str, GasFactors)])] = &[
    (
        "Sludge",
        &[
            ("Physical", GasFactors::new(0.015, 0.008, 0.001)),
            ("Chemical", GasFactors::new(0.020, 0.005, 0.002)),
            ("Biological", GasFactors::new(0.025, 0.015, 0.005)),
            ("Pre-Treatment", GasFactors::new(0.018, 0.006, 0.001)),
            ("Dewatering", GasFactors::new(0.030, 0.030, 0.018)),
        ],
    ),
    (
        "Waste Oil",
        &[
            ("Physical", GasFactors::new(0.050, 0.001, 0.0001)),
            ("Chemical", GasFactors::new(0.085, 0.0, 0.0)),
            ("Biological", GasFactors::new(0.040, 0.002, 0.0005)),
            ("Pre-Treatment", GasFactors::new(0.085, 0.0, 0.0)),
            ("Dewatering", GasFactors::new(0.045, 0.001, 0.0002)),
        ],
    ),
    (
        "Water Waste",
        &[
            ("Physical", GasFactors::new(0.006, 0.003, 0.001)),
            ("Chemical", GasFactors::new(0.020, 0.005, 0.005)),
            ("Biological", GasFactors::new(0.020, 0.020, 0.010)),
            ("Pre-Treatment", GasFactors::new(0.010, 0.004, 0.002)),
            ("Dewatering", GasFactors::new(0.008, 0.006, 0.003)),
        ],
    ),
];

impl EmissionFactorTable {
    /// The placeholder table shipped with the service
    pub fn builtin() -> Self {
        let entries = BUILTIN
            .iter()
            .map(|(waste, methods)| {
                let methods = methods
                    .iter()
                    .map(|(method, factors)| (method.to_string(), *factors))
                    .collect();
                (waste.to_string(), methods)
            })
            .collect();
        Self { entries }
    }

    /// Load a replacement table from a `.json`, `.yaml` or `.yml` file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FactorError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| FactorError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let table: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => {
                serde_yaml::from_str(&raw).map_err(|e| FactorError::Parse(e.to_string()))?
            }
            _ => serde_json::from_str(&raw).map_err(|e| FactorError::Parse(e.to_string()))?,
        };
        table.validate()?;

        info!(
            "Loaded emission factor table from {} ({} waste types)",
            path.display(),
            table.entries.len()
        );
        Ok(table)
    }

    fn validate(&self) -> Result<(), FactorError> {
        if self.entries.values().all(|methods| methods.is_empty()) {
            return Err(FactorError::Empty);
        }
        for (waste_type, methods) in &self.entries {
            for (method, factors) in methods {
                for gas in Gas::ALL {
                    let value = factors.get(gas);
                    if !value.is_finite() || value < 0.0 {
                        return Err(FactorError::InvalidFactor {
                            waste_type: waste_type.clone(),
                            method: method.clone(),
                            gas,
                            value,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Exact lookup, falling back to [`FALLBACK_FACTORS`]
    pub fn lookup(&self, waste_type: &str, method: &str) -> GasFactors {
        self.entries
            .get(waste_type)
            .and_then(|methods| methods.get(method))
            .copied()
            .unwrap_or(FALLBACK_FACTORS)
    }

    pub fn waste_types(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn treatment_methods(&self) -> Vec<String> {
        self.entries
            .values()
            .flat_map(|methods| methods.keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl Default for EmissionFactorTable {
    fn default() -> Self {
        Self::builtin()
    }
}
