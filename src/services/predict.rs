//! Prediction Endpoint
//!
//! `POST /predict`: validates the scenario form, runs the regressor and
//! attaches the per-gas breakdown. Accepts JSON or url-encoded form bodies.

use axum::{
    extract::{Form, FromRequest, Json, Request, State},
    http::header::CONTENT_TYPE,
};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info, info_span};
use uuid::Uuid;

use crate::emissions::{calculate_gas_breakdown, round2, GasBreakdown};
use crate::model::frame::{
    FeatureFrame, QUANTITY_TONS, TRANSPORT_DISTANCE_KM, TREATMENT_EFFICIENCY_PCT,
    TREATMENT_METHOD, VEHICLE_TYPE, WASTE_TYPE,
};
use crate::model::ModelError;
use crate::server::{AppState, ServerError};

pub const FIELD_TREATMENT_EMISSION: &str = "treatment_emission_kgCO2e";
pub const UNKNOWN_VEHICLE: &str = "Unknown";
pub const UNIT: &str = "kg CO₂e";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Waste type is required.")]
    MissingWasteType,
    #[error("Treatment method is required.")]
    MissingTreatmentMethod,
    #[error("Quantity (tons) must be a valid number.")]
    InvalidQuantity,
    #[error("Transport distance (km) must be a valid number.")]
    InvalidDistance,
    #[error("Quantity and distance must be non-negative.")]
    NegativeQuantityOrDistance,
    #[error("Treatment emission must be a valid number.")]
    InvalidTreatmentEmission,
    #[error("Treatment emission must be non-negative.")]
    NegativeTreatmentEmission,
    #[error("Treatment efficiency must be a valid number.")]
    InvalidEfficiency,
    #[error("Treatment efficiency must be between 0 and 100.")]
    EfficiencyOutOfRange,
}

/// Raw submitted fields. Url-encoded values arrive as strings, JSON values
/// may be strings or numbers.
#[derive(Debug, Clone, Default)]
pub struct PredictForm(pub HashMap<String, Value>);

impl<S> FromRequest<S> for PredictForm
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.trim_start().starts_with("application/json"))
            .unwrap_or(false);

        if is_json {
            let Json(fields) = Json::<HashMap<String, Value>>::from_request(req, state)
                .await
                .map_err(|e| ServerError::bad_request(e.body_text()))?;
            Ok(Self(fields))
        } else {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|e| ServerError::bad_request(e.body_text()))?;
            Ok(Self(
                fields.into_iter().map(|(k, v)| (k, Value::String(v))).collect(),
            ))
        }
    }
}

impl PredictForm {
    fn text(&self, key: &str) -> String {
        match self.0.get(key) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.trim().to_string(),
            Some(other) => other.to_string(),
        }
    }

    fn is_blank(&self, key: &str) -> bool {
        self.text(key).is_empty()
    }

    /// `None` for anything that is not a finite number
    fn number(&self, key: &str) -> Option<f64> {
        let value = match self.0.get(key)? {
            Value::Number(n) => n.as_f64()?,
            Value::String(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        value.is_finite().then_some(value)
    }
}

/// A scenario that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub waste_type: String,
    pub treatment_method: String,
    pub vehicle_type: String,
    pub quantity_tons: f64,
    pub transport_distance_km: f64,
    pub treatment_efficiency_pct: Option<f64>,
    pub treatment_emission_kgco2e: f64,
}

impl Scenario {
    /// Checks run in a fixed order; the first failure is reported
    pub fn from_form(form: &PredictForm) -> Result<Self, InputError> {
        let waste_type = form.text(WASTE_TYPE);
        if waste_type.is_empty() {
            return Err(InputError::MissingWasteType);
        }
        let treatment_method = form.text(TREATMENT_METHOD);
        if treatment_method.is_empty() {
            return Err(InputError::MissingTreatmentMethod);
        }

        let quantity_tons = form.number(QUANTITY_TONS).ok_or(InputError::InvalidQuantity)?;
        let transport_distance_km = form
            .number(TRANSPORT_DISTANCE_KM)
            .ok_or(InputError::InvalidDistance)?;
        if quantity_tons < 0.0 || transport_distance_km < 0.0 {
            return Err(InputError::NegativeQuantityOrDistance);
        }

        let treatment_emission_kgco2e = if form.is_blank(FIELD_TREATMENT_EMISSION) {
            0.0
        } else {
            form.number(FIELD_TREATMENT_EMISSION)
                .ok_or(InputError::InvalidTreatmentEmission)?
        };
        if treatment_emission_kgco2e < 0.0 {
            return Err(InputError::NegativeTreatmentEmission);
        }

        let treatment_efficiency_pct = if form.is_blank(TREATMENT_EFFICIENCY_PCT) {
            None
        } else {
            let pct = form
                .number(TREATMENT_EFFICIENCY_PCT)
                .ok_or(InputError::InvalidEfficiency)?;
            if !(0.0..=100.0).contains(&pct) {
                return Err(InputError::EfficiencyOutOfRange);
            }
            Some(pct)
        };

        let vehicle_type = match form.text(VEHICLE_TYPE) {
            v if v.is_empty() => UNKNOWN_VEHICLE.to_string(),
            v => v,
        };

        Ok(Self {
            waste_type,
            treatment_method,
            vehicle_type,
            quantity_tons,
            transport_distance_km,
            treatment_efficiency_pct,
            treatment_emission_kgco2e,
        })
    }

    /// Model input row. The user-supplied treatment emission is not a
    /// model feature; it is added to the prediction afterwards.
    pub fn to_frame(&self) -> FeatureFrame {
        let mut frame = FeatureFrame::new()
            .with(WASTE_TYPE, self.waste_type.as_str())
            .with(TREATMENT_METHOD, self.treatment_method.as_str())
            .with(VEHICLE_TYPE, self.vehicle_type.as_str())
            .with(QUANTITY_TONS, self.quantity_tons)
            .with(TRANSPORT_DISTANCE_KM, self.transport_distance_km);
        if let Some(pct) = self.treatment_efficiency_pct {
            frame.insert(TREATMENT_EFFICIENCY_PCT, pct);
        }
        frame
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictResponse {
    pub success: bool,
    pub prediction: f64,
    pub unit: &'static str,
    pub gas_breakdown: GasBreakdown,
}

/// Validate, predict and break down one scenario
pub fn estimate(state: &AppState, form: &PredictForm) -> Result<PredictResponse, ServerError> {
    let scenario = Scenario::from_form(form)?;

    let model = state
        .model
        .as_ref()
        .ok_or_else(|| ServerError::internal("Model not loaded"))?;

    let predicted = model.predict(&scenario.to_frame())?;
    let final_total = predicted + scenario.treatment_emission_kgco2e;
    if !final_total.is_finite() {
        return Err(ModelError::NonFinite.into());
    }
    debug!(predicted, final_total, "Model prediction");

    let gas_breakdown = calculate_gas_breakdown(
        &state.factors,
        &scenario.waste_type,
        &scenario.treatment_method,
        scenario.quantity_tons,
        final_total,
        scenario.treatment_emission_kgco2e,
    );

    info!(
        "{} / {} ({} t): {:.2} {}",
        scenario.waste_type, scenario.treatment_method, scenario.quantity_tons, final_total, UNIT
    );

    Ok(PredictResponse {
        success: true,
        prediction: round2(final_total),
        unit: UNIT,
        gas_breakdown,
    })
}

pub async fn predict_handler(
    State(state): State<AppState>,
    form: PredictForm,
) -> Result<Json<PredictResponse>, ServerError> {
    let request_id = Uuid::new_v4();
    let span = info_span!("predict", %request_id);
    span.in_scope(|| estimate(&state, &form)).map(Json)
}
