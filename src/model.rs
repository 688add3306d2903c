use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use tracing::{error, info, warn};

/// Outcome of the startup artifact load. Held for the life of the process and
/// never consulted by classification.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ModelState {
    Loaded {
        path: String,
        size_bytes: u64,
        loaded_at: DateTime<Utc>,
    },
    Absent {
        path: String,
        reason: String,
    },
}

impl ModelState {
    /// Try to load the artifact at `path`. Errors are logged and folded into
    /// [`ModelState::Absent`]; startup always continues.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        if !path.exists() {
            warn!(path = %path_str, "model artifact not found");
            return ModelState::Absent {
                path: path_str,
                reason: "not found".to_string(),
            };
        }

        match read_artifact(path) {
            Ok(size_bytes) => {
                info!(path = %path_str, size_bytes, "model artifact loaded");
                ModelState::Loaded {
                    path: path_str,
                    size_bytes,
                    loaded_at: Utc::now(),
                }
            }
            Err(e) => {
                error!(path = %path_str, error = %e, "error loading model artifact");
                ModelState::Absent {
                    path: path_str,
                    reason: e.to_string(),
                }
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, ModelState::Loaded { .. })
    }
}

fn read_artifact(path: &Path) -> Result<u64> {
    let bytes = std::fs::read(path)?;
    if bytes.is_empty() {
        return Err(AppError::Model("artifact is empty".to_string()));
    }
    Ok(bytes.len() as u64)
}
