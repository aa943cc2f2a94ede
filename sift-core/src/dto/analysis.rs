//! Analysis DTOs for the HTTP API

use serde::{Deserialize, Serialize};

use crate::domain::execution::FailureKind;

/// Body of `POST /collect` and `POST /fetch-reviews`
///
/// Required fields are optional here so that a missing field is reported as a
/// validation error by the server instead of a deserialization rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectRequest {
    pub product_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_pages: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_reviews: Option<u32>,
}

/// Body of `POST /analyze`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzeRequest {
    pub question: Option<String>,
}

/// Body of `POST /collect-and-analyze`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectAndAnalyzeRequest {
    pub question: Option<String>,
    pub product_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_pages: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_reviews: Option<u32>,
}

/// Successful collect response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectResponse {
    pub success: bool,
    pub message: String,
    pub collect_output: String,
    /// Present when the index was rebuilt after collecting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_output: Option<String>,
}

/// Successful analyze response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub answer: String,
}

/// Successful collect-and-analyze response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectAndAnalyzeResponse {
    pub answer: String,
    pub collect_output: String,
    pub index_output: String,
}

/// Error body returned for every non-2xx response
///
/// Validation errors carry only `error`. Stage failures also name the stage,
/// carry its stderr in `details`, and include the output of stages that
/// completed before it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<FailureKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Stdout of the failing stage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collect_output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_output: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
}

impl ErrorResponse {
    pub fn message(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_deserialize_as_none() {
        let req: CollectAndAnalyzeRequest =
            serde_json::from_str(r#"{"question": "Is sizing accurate?"}"#).unwrap();
        assert_eq!(req.question.as_deref(), Some("Is sizing accurate?"));
        assert!(req.product_url.is_none());
        assert!(req.max_pages.is_none());

        let req: AnalyzeRequest = serde_json::from_str("{}").unwrap();
        assert!(req.question.is_none());
    }

    #[test]
    fn test_validation_error_body_only_has_error() {
        let body = serde_json::to_value(ErrorResponse::message("product_url is required")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "error": "product_url is required" })
        );
    }

    #[test]
    fn test_stage_error_body() {
        let body = ErrorResponse {
            error: "index stage failed".to_string(),
            stage: Some("index".to_string()),
            kind: Some(FailureKind::WorkerFailure),
            details: Some("disk full".to_string()),
            collect_output: Some("12 reviews saved".to_string()),
            skipped: vec!["query".to_string()],
            ..Default::default()
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["stage"], "index");
        assert_eq!(json["kind"], "worker_failure");
        assert_eq!(json["details"], "disk full");
        assert_eq!(json["skipped"], serde_json::json!(["query"]));
        assert!(json.get("output").is_none());
        assert!(json.get("index_output").is_none());
    }

    #[test]
    fn test_collect_response_omits_index_output() {
        let json = serde_json::to_value(CollectResponse {
            success: true,
            message: "Reviews collected".to_string(),
            collect_output: "12 reviews saved".to_string(),
            index_output: None,
        })
        .unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["collect_output"], "12 reviews saved");
        assert!(json.get("index_output").is_none());
    }
}
