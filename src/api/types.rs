use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::normalize::normalize_metrics;

/// Metrics mapping returned by the detection endpoint.
///
/// Kept as a raw JSON object so that backend-specific extra fields survive.
/// Canonical fields are read through the typed accessors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metrics(Map<String, Value>);

impl Metrics {
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Build from a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Numeric value of `key`, if present and numeric.
    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(Value::as_f64)
    }

    pub fn detection_score(&self) -> Option<f64> {
        self.get("detection_score")
    }

    pub fn nail_count(&self) -> Option<f64> {
        self.get("nail_count")
    }

    pub fn match_count(&self) -> Option<f64> {
        self.get("match_count")
    }

    pub fn match_precision(&self) -> Option<f64> {
        self.get("match_precision")
    }

    pub fn match_recall(&self) -> Option<f64> {
        self.get("match_recall")
    }

    /// Map backend alias keys onto canonical names. Idempotent.
    pub fn normalize(&mut self) {
        normalize_metrics(&mut self.0);
    }
}

/// Treat an explicit `null` the same as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One detected nail with its bounding box and estimated dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NailDetail {
    #[serde(default, deserialize_with = "null_as_default")]
    pub x1: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub y1: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub x2: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub y2: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub confidence: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub height_mm: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub weight_g: f64,
}

/// Normalized response of `POST /api/detect`.
///
/// Image and CSV fields are resource names on the backend, not content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub metrics: Metrics,
    #[serde(default, deserialize_with = "null_as_default")]
    pub output_image: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub analysis_image: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub results_csv: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nail_details: Option<Vec<NailDetail>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DetectionResult {
    /// Parse a raw backend response body and normalize its metrics.
    pub fn from_response(value: Value) -> Result<Self, serde_json::Error> {
        let mut result: DetectionResult = serde_json::from_value(value)?;
        result.metrics.normalize();
        Ok(result)
    }
}

/// Body of `POST /api/evaluate`.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationRequest {
    pub test_dir: String,
}

/// Response of `POST /api/evaluate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub metrics: Map<String, Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub evaluation_results_image: String,
}
