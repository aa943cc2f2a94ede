//! Analysis API Handlers
//!
//! HTTP endpoints that trigger collect, index and query pipelines.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use sift_core::dto::analysis::{
    AnalyzeRequest, AnalyzeResponse, CollectAndAnalyzeRequest, CollectAndAnalyzeResponse,
    CollectRequest, CollectResponse,
};
use std::sync::Arc;

use crate::api::error::ApiResult;
use crate::service::analysis_service::PipelineRequestHandler;

/// POST /collect
/// Collect reviews for a product
pub async fn collect(
    State(handler): State<Arc<PipelineRequestHandler>>,
    payload: Result<Json<CollectRequest>, JsonRejection>,
) -> ApiResult<Json<CollectResponse>> {
    let Json(req) = payload?;
    tracing::info!("Collecting reviews: {:?}", req.product_url);

    let response = handler.collect(req).await?;

    Ok(Json(response))
}

/// POST /fetch-reviews
/// Collect reviews and rebuild the retrieval index
pub async fn fetch_reviews(
    State(handler): State<Arc<PipelineRequestHandler>>,
    payload: Result<Json<CollectRequest>, JsonRejection>,
) -> ApiResult<Json<CollectResponse>> {
    let Json(req) = payload?;
    tracing::info!("Collecting and indexing reviews: {:?}", req.product_url);

    let response = handler.collect_and_index(req).await?;

    Ok(Json(response))
}

/// POST /analyze
/// Answer a question against the existing index
pub async fn analyze(
    State(handler): State<Arc<PipelineRequestHandler>>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> ApiResult<Json<AnalyzeResponse>> {
    let Json(req) = payload?;
    tracing::info!("Analyzing question: {:?}", req.question);

    let response = handler.analyze(req).await?;

    Ok(Json(response))
}

/// POST /collect-and-analyze
/// Collect reviews, rebuild the index, then answer a question
pub async fn collect_and_analyze(
    State(handler): State<Arc<PipelineRequestHandler>>,
    payload: Result<Json<CollectAndAnalyzeRequest>, JsonRejection>,
) -> ApiResult<Json<CollectAndAnalyzeResponse>> {
    let Json(req) = payload?;
    tracing::info!(
        "Collecting and analyzing: {:?} / {:?}",
        req.product_url,
        req.question
    );

    let response = handler.collect_and_analyze(req).await?;

    Ok(Json(response))
}
