//! Router assembly: HTTP endpoints, WebSocket upgrade, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - WebSocket at `/ws` (one learner session per connection)
/// - REST-ish API under `/api/v1/...`
/// - Static SPA from `./static` with index fallback
/// - CORS (allow any origin/method/headers); tighten for production if needed
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    let static_service = ServeDir::new("./static")
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new("./static/index.html"));

    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_upgrade))
        // HTTP API
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/concepts", get(http::http_get_concepts))
        .route("/api/v1/quiz", get(http::http_get_quiz))
        .route("/api/v1/tutor", post(http::http_post_tutor))
        .route("/api/v1/chat/suggestions", get(http::http_get_suggestions))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Frontend fallback
        .fallback_service(static_service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::model::ModelError;
    use crate::testing::{sample_quiz_json, test_state, FakeBackend};

    fn router(replies: Vec<Result<String, ModelError>>, key: Option<&str>) -> Router {
        let backend = Arc::new(FakeBackend::with_replies(replies));
        build_router(Arc::new(test_state(backend, key)))
    }

    async fn json_body(res: axum::response::Response) -> Value {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.expect("body");
        serde_json::from_slice(&bytes).expect("json")
    }

    #[tokio::test]
    async fn quiz_endpoint_returns_five_questions() {
        let app = router(vec![Ok(sample_quiz_json())], Some("k"));
        let res = app
            .oneshot(Request::get("/api/v1/quiz?difficulty=advanced").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(res.status(), StatusCode::OK);
        let v = json_body(res).await;
        assert_eq!(v["difficulty"], "advanced");
        assert_eq!(v["questions"].as_array().map(|a| a.len()), Some(5));
    }

    #[tokio::test]
    async fn quiz_endpoint_distinguishes_missing_key_from_bad_output() {
        let app = router(vec![], None);
        let res = app
            .oneshot(Request::get("/api/v1/quiz").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json_body(res).await["code"], "API_KEY_MISSING");

        let app = router(vec![Ok("no quiz today".into())], Some("k"));
        let res = app
            .oneshot(Request::get("/api/v1/quiz").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(json_body(res).await["code"], "QUIZ_GENERATION_FAILED");
    }

    #[tokio::test]
    async fn empty_quiz_is_no_content() {
        let app = router(vec![Ok("[]".into())], Some("k"));
        let res = app
            .oneshot(Request::get("/api/v1/quiz").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn tutor_endpoint_is_ok_even_when_the_model_fails() {
        let app = router(vec![Err(ModelError::transport("down"))], Some("k"));
        let req = Request::post("/api/v1/tutor")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"history":[{"role":"model","text":"안녕!"}],"message":"동명사가 뭐야?"}"#))
            .expect("request");
        let res = app.oneshot(req).await.expect("response");
        assert_eq!(res.status(), StatusCode::OK);
        let v = json_body(res).await;
        assert!(v["text"].as_str().unwrap_or("").contains("연결에 문제"));
    }

    #[tokio::test]
    async fn tutor_endpoint_rejects_blank_message_without_calling_the_model() {
        let backend = Arc::new(FakeBackend::with_replies(vec![Ok("unused".into())]));
        let app = build_router(Arc::new(test_state(backend.clone(), Some("k"))));
        let req = Request::post("/api/v1/tutor")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"message":"   "}"#))
            .expect("request");
        let res = app.oneshot(req).await.expect("response");
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(res).await["code"], "INVALID_INPUT");
        assert!(backend.requests().is_empty());
    }

    #[tokio::test]
    async fn health_and_concepts_are_served() {
        let app = router(vec![], None);
        let res = app
            .clone()
            .oneshot(Request::get("/api/v1/health").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        let v = json_body(res).await;
        assert_eq!(v["ok"], true);
        assert_eq!(v["api_key_configured"], false);

        let res = app
            .oneshot(Request::get("/api/v1/concepts").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(json_body(res).await["cards"].as_array().map(|a| a.len()), Some(4));
    }
}
