//! Threshold rule deciding whether a pole is being tapped.
//!
//! A pole reading that exceeds what the meter reports by more than
//! [`DIFFERENCE_THRESHOLD`] while the pole is actually carrying current is
//! flagged as theft. The confidence attached to either outcome is synthetic,
//! not a calibrated probability.

use rand::Rng;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

pub const THEFT_LABEL: &str = "THEFT DETECTED!";
pub const NORMAL_LABEL: &str = "Normal";
pub const ERROR_LABEL: &str = "Error";

/// Gap between pole and total current above which a reading is suspicious.
pub const DIFFERENCE_THRESHOLD: f64 = 0.5;
/// Pole current at or below this is treated as idle, whatever the gap.
pub const POLE_ACTIVE_THRESHOLD: f64 = 0.3;

const THEFT_BASE_CONFIDENCE: f64 = 95.0;
const THEFT_CONFIDENCE_SLOPE: f64 = 5.0;
const THEFT_MAX_CONFIDENCE: f64 = 99.0;
const NORMAL_BASE_CONFIDENCE: f64 = 98.0;
const NORMAL_MAX_CONFIDENCE: f64 = 99.9;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Reading {
    pub pole_current: f64,
    pub total_current: f64,
}

#[derive(Debug, Error, PartialEq)]
pub enum ReadingError {
    #[error("field '{field}' must be a number, got {found}")]
    NotANumber { field: &'static str, found: String },
    #[error("request body must be a JSON object, got {0}")]
    NotAnObject(String),
}

impl Reading {
    pub fn new(pole_current: f64, total_current: f64) -> Self {
        Self {
            pole_current,
            total_current,
        }
    }

    /// Build a reading from `pole` / `total` keys. Missing keys count as 0.
    pub fn from_fields(fields: &Map<String, Value>) -> Result<Self, ReadingError> {
        Ok(Self {
            pole_current: numeric_field(fields, "pole")?,
            total_current: numeric_field(fields, "total")?,
        })
    }

    pub fn from_value(value: &Value) -> Result<Self, ReadingError> {
        match value {
            Value::Object(fields) => Self::from_fields(fields),
            other => Err(ReadingError::NotAnObject(json_kind(other).to_string())),
        }
    }

    pub fn difference(&self) -> f64 {
        (self.pole_current - self.total_current).abs()
    }
}

/// Booleans count as 1 / 0.
fn numeric_field(fields: &Map<String, Value>, field: &'static str) -> Result<f64, ReadingError> {
    match fields.get(field) {
        None => Ok(0.0),
        Some(Value::Bool(b)) => Ok(if *b { 1.0 } else { 0.0 }),
        Some(value) => value.as_f64().ok_or_else(|| ReadingError::NotANumber {
            field,
            found: json_kind(value).to_string(),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Classification {
    Theft { confidence: f64 },
    Normal { confidence: f64 },
    Error,
}

impl Classification {
    pub fn label(&self) -> &'static str {
        match self {
            Classification::Theft { .. } => THEFT_LABEL,
            Classification::Normal { .. } => NORMAL_LABEL,
            Classification::Error => ERROR_LABEL,
        }
    }

    pub fn confidence(&self) -> f64 {
        match self {
            Classification::Theft { confidence } | Classification::Normal { confidence } => {
                *confidence
            }
            Classification::Error => 0.0,
        }
    }

    pub fn is_theft(&self) -> bool {
        matches!(self, Classification::Theft { .. })
    }
}

/// Apply the threshold rule to a reading.
///
/// The theft branch is deterministic. The normal branch adds a fresh draw in
/// `[0, 1)` from `rng` on every call.
pub fn classify<R: Rng + ?Sized>(reading: &Reading, rng: &mut R) -> Classification {
    let difference = reading.difference();

    if difference > DIFFERENCE_THRESHOLD && reading.pole_current > POLE_ACTIVE_THRESHOLD {
        let raw = THEFT_BASE_CONFIDENCE
            + (difference - DIFFERENCE_THRESHOLD) * THEFT_CONFIDENCE_SLOPE;
        Classification::Theft {
            confidence: round2(raw.min(THEFT_MAX_CONFIDENCE)),
        }
    } else {
        let jitter: f64 = rng.gen();
        Classification::Normal {
            confidence: round2((NORMAL_BASE_CONFIDENCE + jitter).min(NORMAL_MAX_CONFIDENCE)),
        }
    }
}

/// Classify an arbitrary JSON payload, folding any input problem into
/// [`Classification::Error`].
pub fn predict<R: Rng + ?Sized>(payload: &Value, rng: &mut R) -> Classification {
    match Reading::from_value(payload) {
        Ok(reading) => classify(&reading, rng),
        Err(e) => {
            warn!(error = %e, "prediction failed");
            Classification::Error
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
