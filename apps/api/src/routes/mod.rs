pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // HTML form
        .route("/", get(handlers::handle_index))
        .route("/analyze", post(handlers::handle_analyze_form))
        // JSON API
        .route("/api/v1/analyze", post(handlers::handle_analyze_api))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::analysis::pipeline::tests::{
        job_response, profile_response, FixedChat, ScriptedExtractor, JOB_URL, PROFILE_URL,
    };
    use crate::analysis::pipeline::Pipeline;
    use crate::config::Config;
    use crate::extraction::embedded_json::ScanMode;

    fn app(extractor: Arc<ScriptedExtractor>, chat: Arc<FixedChat>) -> Router {
        let mut config = Config::from_lookup(|_| None).unwrap();
        config.firecrawl_api_key = Some("fc-secret".to_string());
        build_router(AppState {
            config,
            pipeline: Pipeline::new(extractor, chat, ScanMode::FirstToLast),
        })
    }

    fn happy_app() -> (Router, Arc<FixedChat>) {
        let extractor = Arc::new(ScriptedExtractor::new(&[
            (PROFILE_URL, profile_response()),
            (JOB_URL, job_response()),
        ]));
        let chat = Arc::new(FixedChat::replying("Pitch paragraph."));
        (app(extractor, chat.clone()), chat)
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = happy_app();
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["status"], json!("ok"));
    }

    #[tokio::test]
    async fn test_index_renders_form_without_leaking_key() {
        let (app, _) = happy_app();
        let response = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response).await;
        assert!(html.contains("Analyze Match"));
        assert!(!html.contains("fc-secret"));
        assert!(html.contains("OpenAI API key NOT FOUND"));
    }

    #[tokio::test]
    async fn test_form_submission_renders_report() {
        let (app, chat) = happy_app();
        let form = format!(
            "linkedin_url={}&job_url={}",
            "https%3A%2F%2Fwww.linkedin.com%2Fin%2Fjane", "https%3A%2F%2Fjobs.example.com%2F42"
        );
        let response = app
            .oneshot(
                Request::post("/analyze")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(form))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response).await;
        assert!(html.contains("LinkedIn Summary"));
        assert!(html.contains("Pitch paragraph."));
        assert_eq!(chat.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_form_with_missing_url_warns() {
        let (app, chat) = happy_app();
        let response = app
            .oneshot(
                Request::post("/analyze")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("linkedin_url=&job_url="))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response).await;
        assert!(html.contains("Please provide both a LinkedIn profile URL and a job listing URL."));
        assert_eq!(chat.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_api_rejects_missing_urls() {
        let (app, _) = happy_app();
        let response = app
            .oneshot(
                Request::post("/api/v1/analyze")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(json!({"linkedin_url": PROFILE_URL}).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["error"]["code"], json!("VALIDATION_ERROR"));
    }

    #[tokio::test]
    async fn test_api_returns_succeeded_report() {
        let (app, _) = happy_app();
        let response = app
            .oneshot(
                Request::post("/api/v1/analyze")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        json!({"linkedin_url": PROFILE_URL, "job_url": JOB_URL}).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["state"], json!("succeeded"));
        assert_eq!(body["profile"]["Summary"], json!("Backend developer"));
        assert_eq!(body["job"]["Job Title"], json!("Engineer"));
        assert_eq!(body["pitch"], json!("Pitch paragraph."));
    }

    #[tokio::test]
    async fn test_api_failed_run_drops_partial_records() {
        let extractor = Arc::new(ScriptedExtractor::new(&[
            (PROFILE_URL, profile_response()),
            (JOB_URL, json!({"content": ""})),
        ]));
        let chat = Arc::new(FixedChat::replying("unused"));
        let response = app(extractor, chat.clone())
            .oneshot(
                Request::post("/api/v1/analyze")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        json!({"linkedin_url": PROFILE_URL, "job_url": JOB_URL}).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["state"], json!("failed"));
        assert_eq!(body["profile"], Value::Null);
        assert_eq!(chat.calls.load(Ordering::SeqCst), 0);
    }
}
