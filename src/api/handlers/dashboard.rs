use crate::api::AppState;
use axum::{body::Bytes, extract::State, response::Html};

/// Serves the dashboard document read at startup. Query parameters are ignored.
pub async fn index(State(state): State<AppState>) -> Html<Bytes> {
    Html(state.dashboard.clone())
}
