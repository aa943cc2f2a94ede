//! API Error Handling
//!
//! Unified error types and conversion for API responses.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sift_core::dto::analysis::ErrorResponse;

use crate::service::analysis::{AnalysisError, StageFailure};
use crate::service::plan::StageKind;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    RequestTimeout(Box<ErrorResponse>),
    StageFailed(Box<ErrorResponse>),
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorResponse::message(msg)),
            ApiError::RequestTimeout(body) => (StatusCode::REQUEST_TIMEOUT, *body),
            ApiError::StageFailed(body) => (StatusCode::INTERNAL_SERVER_ERROR, *body),
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::message(msg),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::Validation(msg) => ApiError::BadRequest(msg),
            AnalysisError::CollectTimedOut(failure) => {
                ApiError::RequestTimeout(Box::new(failure_body(&failure)))
            }
            AnalysisError::StageFailed(failure) => {
                ApiError::StageFailed(Box::new(failure_body(&failure)))
            }
            AnalysisError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}

/// Error body for a failed stage; diagnostics are passed through untouched
fn failure_body(failure: &StageFailure) -> ErrorResponse {
    ErrorResponse {
        error: failure.message.clone(),
        stage: Some(failure.stage.clone()),
        kind: Some(failure.kind),
        details: Some(failure.details.clone()),
        output: Some(failure.output.clone()),
        collect_output: failure
            .completed_output(StageKind::Collect)
            .map(str::to_string),
        index_output: failure.completed_output(StageKind::Index).map(str::to_string),
        skipped: failure.skipped.clone(),
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
