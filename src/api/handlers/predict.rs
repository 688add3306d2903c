use crate::api::models::PredictResponse;
use crate::classifier::{self, Classification};
use axum::{body::Bytes, response::Json};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

/// `POST /api/predict`. Always answers 200; bad input shows up as the
/// `"Error"` prediction rather than a status code.
pub async fn predict(body: Bytes) -> Json<PredictResponse> {
    let result = match parse_body(&body) {
        Ok(payload) => classifier::predict(&payload, &mut rand::thread_rng()),
        Err(e) => {
            warn!(error = %e, "reading outside the representable range");
            Classification::Error
        }
    };

    if result.is_theft() {
        info!(confidence = result.confidence(), "theft detected");
    } else {
        debug!(
            prediction = result.label(),
            confidence = result.confidence(),
            "prediction computed"
        );
    }

    Json(result.into())
}

/// Empty or unparseable bodies count as an empty object so every field
/// falls back to its default. Well-formed JSON carrying a number that does
/// not fit in an f64 is an error, not a default.
fn parse_body(body: &[u8]) -> Result<Value, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }

    match serde_json::from_slice(body) {
        Ok(value) => Ok(value),
        Err(e) if is_number_out_of_range(&e) => Err(e),
        Err(e) => {
            debug!(error = %e, "malformed request body, using defaults");
            Ok(Value::Object(Map::new()))
        }
    }
}

// serde_json reports overflow as a syntax error; only the message tells it apart
fn is_number_out_of_range(e: &serde_json::Error) -> bool {
    e.is_syntax() && e.to_string().starts_with("number out of range")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn call(body: &'static str) -> PredictResponse {
        let Json(response) = predict(Bytes::from_static(body.as_bytes())).await;
        response
    }

    #[tokio::test]
    async fn test_theft_reading() {
        let response = call(r#"{"pole": 1.0, "total": 0.2}"#).await;
        assert_eq!(response.prediction, "THEFT DETECTED!");
        assert_eq!(response.confidence, 96.5);
    }

    #[tokio::test]
    async fn test_normal_reading() {
        let response = call(r#"{"pole": 0.2, "total": 0.1}"#).await;
        assert_eq!(response.prediction, "Normal");
        assert!((98.0..=99.0).contains(&response.confidence));
    }

    #[tokio::test]
    async fn test_empty_body_defaults() {
        let response = call("").await;
        assert_eq!(response.prediction, "Normal");
    }

    #[tokio::test]
    async fn test_malformed_body_defaults() {
        let response = call("{pole: oops").await;
        assert_eq!(response.prediction, "Normal");
    }

    #[tokio::test]
    async fn test_non_numeric_field_is_error() {
        let response = call(r#"{"pole": "1.0", "total": 0.2}"#).await;
        assert_eq!(response.prediction, "Error");
        assert_eq!(response.confidence, 0.0);
    }

    #[tokio::test]
    async fn test_array_body_is_error() {
        let response = call("[1.0, 0.2]").await;
        assert_eq!(response.prediction, "Error");
    }

    #[tokio::test]
    async fn test_boolean_pole_counts_as_one() {
        let response = call(r#"{"pole": true, "total": 0}"#).await;
        assert_eq!(response.prediction, "THEFT DETECTED!");
        assert_eq!(response.confidence, 97.5);
    }

    #[tokio::test]
    async fn test_overflowing_reading_is_error() {
        let response = call(r#"{"pole": 1e400, "total": 0}"#).await;
        assert_eq!(response.prediction, "Error");
        assert_eq!(response.confidence, 0.0);

        let response = call(r#"{"pole": 1.0, "total": -1e400}"#).await;
        assert_eq!(response.prediction, "Error");
    }

    #[test]
    fn test_parse_body() {
        assert_eq!(parse_body(b"  \n").unwrap(), json!({}));
        assert_eq!(parse_body(b"not json").unwrap(), json!({}));
        assert_eq!(parse_body(b"{\"pole\": ").unwrap(), json!({}));
        assert_eq!(parse_body(br#"{"pole": 2}"#).unwrap(), json!({ "pole": 2 }));
        assert!(parse_body(br#"{"pole": 1e400}"#).is_err());
    }
}
