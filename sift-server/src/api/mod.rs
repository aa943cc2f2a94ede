//! API Module
//!
//! HTTP API layer of the server.
//! Each submodule handles endpoints for a specific concern.

pub mod analysis;
pub mod error;
pub mod health;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::service::analysis_service::PipelineRequestHandler;

/// Create the main API router with all endpoints
pub fn create_router(handler: Arc<PipelineRequestHandler>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Pipeline endpoints
        .route("/collect", post(analysis::collect))
        .route("/fetch-reviews", post(analysis::fetch_reviews))
        .route("/analyze", post(analysis::analyze))
        .route("/collect-and-analyze", post(analysis::collect_and_analyze))
        .route("/fetch-and-analyze", post(analysis::collect_and_analyze))
        // Add state and middleware
        .with_state(handler)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::testing::{RecordingExecutor, handler_with};
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use sift_core::domain::execution::StageOutcome;
    use tower::ServiceExt;

    fn router(executor: Arc<RecordingExecutor>) -> Router {
        create_router(Arc::new(handler_with(executor)))
    }

    async fn post_json(
        app: Router,
        uri: &str,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        post_raw(app, uri, body.to_string()).await
    }

    async fn post_raw(app: Router, uri: &str, body: String) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let app = router(Arc::new(RecordingExecutor::default()));
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_collect_only_scenario() {
        let executor =
            Arc::new(RecordingExecutor::default().with_stdout("collect", "12 reviews saved"));

        let (status, body) = post_json(
            router(executor.clone()),
            "/collect",
            serde_json::json!({ "product_url": "https://shop.example/p/123" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["collect_output"], "12 reviews saved");
        assert!(body["message"].is_string());
        assert_eq!(executor.invocations(), vec!["collect"]);
    }

    #[tokio::test]
    async fn test_missing_field_is_bad_request_without_spawning() {
        let executor = Arc::new(RecordingExecutor::default());

        for (uri, body) in [
            ("/collect", serde_json::json!({})),
            ("/fetch-reviews", serde_json::json!({ "product_url": "" })),
            ("/analyze", serde_json::json!({ "product_url": "https://shop.example/p/1" })),
            (
                "/collect-and-analyze",
                serde_json::json!({ "question": "Is sizing accurate?" }),
            ),
            (
                "/fetch-and-analyze",
                serde_json::json!({ "product_url": "https://shop.example/p/1" }),
            ),
        ] {
            let (status, body) = post_json(router(executor.clone()), uri, body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert!(body["error"].as_str().unwrap().contains("is required"));
        }

        assert!(executor.invocations().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body_is_json_bad_request() {
        let executor = Arc::new(RecordingExecutor::default());

        for (uri, body) in [
            ("/collect", r#"{"product_url":123}"#),
            (
                "/fetch-reviews",
                r#"{"product_url":"https://shop.example/p/1","max_pages":-1}"#,
            ),
            ("/analyze", r#"{"question":["Is sizing accurate?"]}"#),
            ("/collect-and-analyze", r#"{"product_url":"#),
        ] {
            let (status, body) = post_raw(router(executor.clone()), uri, body.to_string()).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert!(
                body["error"]
                    .as_str()
                    .unwrap()
                    .starts_with("Invalid request body"),
                "{}",
                uri
            );
        }

        assert!(executor.invocations().is_empty());
    }

    #[tokio::test]
    async fn test_index_failure_scenario() {
        let executor = Arc::new(
            RecordingExecutor::default()
                .with_stdout("collect", "12 reviews saved")
                .with_outcome("index", StageOutcome::Exited { code: 1 }, "", "disk full"),
        );

        let (status, body) = post_json(
            router(executor.clone()),
            "/collect-and-analyze",
            serde_json::json!({
                "question": "Is sizing accurate?",
                "product_url": "https://shop.example/p/123"
            }),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["stage"], "index");
        assert_eq!(body["details"], "disk full");
        assert_eq!(body["collect_output"], "12 reviews saved");
        assert_eq!(body["skipped"], serde_json::json!(["query"]));
        assert_eq!(body["output"], "");
        assert!(body["error"].as_str().unwrap().contains("index"));
        assert_eq!(executor.invocations(), vec!["collect", "index"]);
    }

    #[tokio::test]
    async fn test_collect_timeout_is_request_timeout() {
        let executor = Arc::new(RecordingExecutor::default().with_outcome(
            "collect",
            StageOutcome::TimedOut,
            "",
            "still scrolling",
        ));

        let (status, body) = post_json(
            router(executor.clone()),
            "/fetch-and-analyze",
            serde_json::json!({
                "question": "Is sizing accurate?",
                "product_url": "https://shop.example/p/123"
            }),
        )
        .await;

        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
        assert_eq!(body["stage"], "collect");
        assert_eq!(body["kind"], "timeout_exceeded");
        assert_eq!(body["details"], "still scrolling");
    }

    #[tokio::test]
    async fn test_collect_failure_includes_output() {
        let executor = Arc::new(RecordingExecutor::default().with_outcome(
            "collect",
            StageOutcome::Exited { code: 2 },
            "opened page",
            "selector not found",
        ));

        let (status, body) = post_json(
            router(executor),
            "/collect",
            serde_json::json!({ "product_url": "https://shop.example/p/123" }),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["details"], "selector not found");
        assert_eq!(body["output"], "opened page");
    }

    #[tokio::test]
    async fn test_analyze_returns_answer() {
        let executor = Arc::new(RecordingExecutor::default().with_stdout("query", "Yes.\n"));

        let (status, body) = post_json(
            router(executor),
            "/analyze",
            serde_json::json!({ "question": "Is sizing accurate?" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "answer": "Yes." }));
    }
}
