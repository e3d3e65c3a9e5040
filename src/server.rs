use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use handlebars::Handlebars;
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::emissions::EmissionFactorTable;
use crate::model::{ModelArtifact, ModelError, Regressor};
use crate::services::{form, predict};

/// Error envelope shared by every endpoint: `{ "success": false, "error": ... }`
#[derive(Debug)]
pub struct ServerError {
    status: StatusCode,
    message: String,
}

impl ServerError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self { status: StatusCode::INTERNAL_SERVER_ERROR, message: message.into() }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("{}", self.message);
        } else {
            warn!("Rejected request: {}", self.message);
        }
        (
            self.status,
            Json(serde_json::json!({ "success": false, "error": self.message })),
        )
            .into_response()
    }
}

impl From<predict::InputError> for ServerError {
    fn from(err: predict::InputError) -> Self {
        Self::bad_request(err.to_string())
    }
}

// Prediction failures are reported as client errors, like any other
// input the model cannot score.
impl From<ModelError> for ServerError {
    fn from(err: ModelError) -> Self {
        Self::bad_request(err.to_string())
    }
}

#[derive(Clone)]
pub struct AppState {
    pub model: Option<Arc<dyn Regressor>>,
    pub factors: Arc<EmissionFactorTable>,
    pub templates: Arc<Handlebars<'static>>,
    pub started_at: DateTime<Local>,
}

impl AppState {
    pub fn new(model: Option<Arc<dyn Regressor>>, factors: EmissionFactorTable) -> Result<Self> {
        Ok(Self {
            model,
            factors: Arc::new(factors),
            templates: Arc::new(form::templates()?),
            started_at: Local::now(),
        })
    }

    /// Load factors and model per `config`. A missing or broken model is
    /// logged and leaves the service running without one.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let factors = match &config.factors_path {
            Some(path) => EmissionFactorTable::load(path)
                .with_context(|| format!("loading emission factors from {}", path.display()))?,
            None => EmissionFactorTable::builtin(),
        };

        let model: Option<Arc<dyn Regressor>> = match ModelArtifact::load(&config.model_path) {
            Ok(artifact) => {
                info!("✅ Model loaded successfully from {}", config.model_path.display());
                Some(Arc::new(artifact))
            }
            Err(e) => {
                error!("❌ Error loading model: {}", e);
                None
            }
        };

        Self::new(model, factors)
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    model_loaded: bool,
    model_name: Option<String>,
    since: String,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        model_loaded: state.model.is_some(),
        model_name: state.model.as_ref().map(|m| m.name()),
        since: state.started_at.to_rfc3339(),
    })
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(form::index))
        .route("/predict", post(predict::predict_handler))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(config: AppConfig) -> Result<()> {
    info!("🌱 Initializing carbon emission service...");

    let state = AppState::from_config(&config)?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    info!("🚀 Listening on http://{}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
