pub mod handlers;
pub mod models;
pub mod routes;

pub use routes::create_router;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::model::ModelState;
use axum::body::Bytes;
use std::sync::Arc;

/// Read-only state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub dashboard: Bytes,
    pub model: Arc<ModelState>,
}

impl AppState {
    pub fn new(dashboard: impl Into<Bytes>, model: ModelState) -> Self {
        Self {
            dashboard: dashboard.into(),
            model: Arc::new(model),
        }
    }

    /// Read the dashboard document and attempt the model load.
    /// A missing dashboard is fatal; a missing model is not.
    pub fn from_config(config: &Config) -> Result<Self> {
        let dashboard = std::fs::read(&config.dashboard.path).map_err(|e| {
            AppError::Config(format!(
                "failed to read dashboard {}: {}",
                config.dashboard.path, e
            ))
        })?;
        let model = ModelState::load(&config.model.path);
        Ok(Self::new(dashboard, model))
    }
}
