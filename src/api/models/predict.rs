use crate::classifier::Classification;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub prediction: String,
    pub confidence: f64,
}

impl From<Classification> for PredictResponse {
    fn from(c: Classification) -> Self {
        Self {
            prediction: c.label().to_string(),
            confidence: c.confidence(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_theft() {
        let response: PredictResponse = Classification::Theft { confidence: 96.5 }.into();
        assert_eq!(
            response,
            PredictResponse {
                prediction: "THEFT DETECTED!".to_string(),
                confidence: 96.5,
            }
        );
    }

    #[test]
    fn test_from_error_has_zero_confidence() {
        let response: PredictResponse = Classification::Error.into();
        assert_eq!(response.prediction, "Error");
        assert_eq!(response.confidence, 0.0);
    }

    #[test]
    fn test_serialization_keys() {
        let response: PredictResponse = Classification::Normal { confidence: 98.42 }.into();
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json, serde_json::json!({ "prediction": "Normal", "confidence": 98.42 }));
    }
}
