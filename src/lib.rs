pub mod api;
pub mod classifier;
pub mod config;
pub mod error;
pub mod model;

pub use api::{create_router, AppState};
pub use classifier::{classify, Classification, Reading};
pub use config::Config;
pub use error::{AppError, Result};
pub use model::ModelState;
