// SPDX-License-Identifier: MIT

//! Request and response records for the processing service
//!
//! Field names follow the service's snake_case JSON.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Shape of an uploaded dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub rows: u64,
    pub columns: u64,
    #[serde(default)]
    pub column_names: Vec<String>,
    #[serde(default)]
    pub column_types: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub pipeline_id: String,
    pub dataset_info: DatasetInfo,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanRequest {
    pub pipeline_id: String,
    pub strategy: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_value: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanResponse {
    #[serde(default)]
    pub missing_before: HashMap<String, u64>,
    #[serde(default)]
    pub missing_after: HashMap<String, u64>,
    pub rows_before: u64,
    pub rows_after: u64,
    #[serde(default)]
    pub cleaned_columns: Vec<String>,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessRequest {
    pub pipeline_id: String,
    pub scaler_type: String,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessResponse {
    #[serde(default)]
    pub processed_columns: Vec<String>,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitRequest {
    pub pipeline_id: String,
    pub split_ratio: f64,
    pub target_column: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitResponse {
    pub train_size: u64,
    pub test_size: u64,
    #[serde(default)]
    pub features: Vec<String>,
    pub target_column: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainRequest {
    pub pipeline_id: String,
    pub model_type: String,
    pub task_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainResponse {
    pub model_type: String,
    pub task_type: String,
    pub train_score: f64,
    pub test_score: f64,
    #[serde(default)]
    pub metrics: Map<String, Value>,
    #[serde(default)]
    pub message: String,
}

/// Trained model summary as reported by the results endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    #[serde(default)]
    pub model_type: Option<String>,
    #[serde(default)]
    pub metrics: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsResponse {
    #[serde(default)]
    pub pipeline_id: Option<String>,
    #[serde(default)]
    pub dataset_info: Option<DatasetInfo>,
    #[serde(default)]
    pub preprocessing: Option<Value>,
    #[serde(default)]
    pub split_info: Option<Value>,
    #[serde(default)]
    pub model_info: Option<ModelInfo>,
    #[serde(default)]
    pub visualizations: Option<Value>,
}

/// Error body returned by the service on failure.
///
/// `detail` is usually a string, but request validation failures carry a list
/// of `{loc, msg, type}` records.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: Option<Value>,
}

impl ErrorBody {
    pub(crate) fn message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Array(items) => {
                let parts: Vec<String> = items
                    .iter()
                    .filter_map(|item| match item {
                        Value::String(s) => Some(s.clone()),
                        other => other.get("msg").and_then(Value::as_str).map(String::from),
                    })
                    .collect();
                if parts.is_empty() {
                    None
                } else {
                    Some(parts.join("; "))
                }
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_body_string_detail() {
        let body: ErrorBody = serde_json::from_value(json!({"detail": "Pipeline x not found"})).unwrap();
        assert_eq!(body.message(), Some("Pipeline x not found".to_string()));
    }

    #[test]
    fn test_error_body_validation_list() {
        let body: ErrorBody = serde_json::from_value(json!({
            "detail": [
                {"loc": ["body", "split_ratio"], "msg": "ensure this value is less than or equal to 0.9", "type": "value_error"},
                {"loc": ["body", "target_column"], "msg": "field required", "type": "value_error.missing"}
            ]
        }))
        .unwrap();
        assert_eq!(
            body.message(),
            Some("ensure this value is less than or equal to 0.9; field required".to_string())
        );
    }

    #[test]
    fn test_error_body_without_detail() {
        let body: ErrorBody = serde_json::from_value(json!({"error": "boom"})).unwrap();
        assert_eq!(body.message(), None);
    }

    #[test]
    fn test_results_response_without_model() {
        let resp: ResultsResponse = serde_json::from_value(json!({
            "pipeline_id": "p1",
            "dataset_info": null,
            "model_info": null
        }))
        .unwrap();
        assert!(resp.model_info.is_none());
        assert!(resp.visualizations.is_none());
    }

    #[test]
    fn test_clean_request_skips_absent_fields() {
        let req = CleanRequest {
            pipeline_id: "p1".into(),
            strategy: "mean".into(),
            columns: None,
            fill_value: None,
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value, json!({"pipeline_id": "p1", "strategy": "mean"}));
    }
}
