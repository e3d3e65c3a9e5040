//! Scenario form page (`GET /`)

use axum::{extract::State, response::Html};
use handlebars::Handlebars;
use serde::Serialize;

use crate::model::frame::VEHICLE_TYPE;
use crate::server::{AppState, ServerError};

const INDEX_TEMPLATE: &str = include_str!("../../templates/index.hbs");

pub fn templates() -> Result<Handlebars<'static>, handlebars::TemplateError> {
    let mut hb = Handlebars::new();
    hb.set_strict_mode(true);
    hb.register_template_string("index", INDEX_TEMPLATE)?;
    Ok(hb)
}

#[derive(Serialize)]
struct IndexContext {
    waste_types: Vec<String>,
    treatment_methods: Vec<String>,
    /// Empty when the model has no vehicle categories; the page falls back to free text
    vehicle_types: Vec<String>,
    model_loaded: bool,
}

pub async fn index(State(state): State<AppState>) -> Result<Html<String>, ServerError> {
    let ctx = IndexContext {
        waste_types: state.factors.waste_types(),
        treatment_methods: state.factors.treatment_methods(),
        vehicle_types: state
            .model
            .as_ref()
            .and_then(|m| m.categories(VEHICLE_TYPE))
            .unwrap_or_default(),
        model_loaded: state.model.is_some(),
    };

    state
        .templates
        .render("index", &ctx)
        .map(Html)
        .map_err(|e| ServerError::internal(format!("Failed to render form: {}", e)))
}
