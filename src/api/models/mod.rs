pub mod health;
pub mod predict;

pub use health::HealthResponse;
pub use predict::PredictResponse;
