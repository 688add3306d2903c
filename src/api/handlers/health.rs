use crate::api::models::HealthResponse;
use crate::api::AppState;
use axum::{extract::State, response::Json};

/// Health check endpoint handler.
/// Always 200; `model_loaded` lets monitoring see whether the artifact was found.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        model_loaded: state.model.is_loaded(),
    })
}
