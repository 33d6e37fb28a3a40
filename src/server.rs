//! HTTP surface for the extraction pipeline.
//!
//! # Endpoints
//!
//! - `POST /extract` accepts either `multipart/form-data` with a `file` field
//!   or `application/json` `{"url": "https://…"}` and answers with the
//!   [`ExtractionResult`] JSON body.
//! - `GET /health` answers `{"status":"healthy","service":"pdfsalvage"}`.
//!
//! # Status codes
//!
//! | Outcome                                        | Status |
//! |------------------------------------------------|--------|
//! | text extracted                                 | 200    |
//! | missing input, not a PDF, download failed, no text | 400 |
//! | anything else                                  | 500    |
//!
//! Bodies over the configured limit are rejected with a 400 and the same JSON
//! failure shape as every other client error.
//!
//! ```bash
//! curl -F "file=@report.pdf" http://localhost:8080/extract
//! curl -H 'content-type: application/json' \
//!      -d '{"url":"https://example.org/report.pdf"}' http://localhost:8080/extract
//! ```

use crate::error::SalvageError;
use crate::extract::Pipeline;
use crate::output::ExtractionResult;
use crate::pipeline::input::is_url;
use axum::extract::{DefaultBodyLimit, FromRequest, Multipart, Request, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

/// Default cap on request bodies (uploads included): 50 MiB.
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 50 * 1024 * 1024;

/// Name of the multipart field carrying the PDF.
pub const FILE_FIELD: &str = "file";

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub pipeline: Pipeline,
}

/// JSON request body for URL inputs.
#[derive(Debug, Deserialize)]
pub struct UrlRequest {
    #[serde(default)]
    pub url: Option<String>,
}

/// Build the service router with tracing, CORS and body-limit layers.
pub fn router(pipeline: Pipeline, body_limit_bytes: usize) -> Router {
    Router::new()
        .route("/extract", post(extract_handler))
        .route("/health", get(health))
        .with_state(AppState { pipeline })
        .layer(DefaultBodyLimit::max(body_limit_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "service": "pdfsalvage" }))
}

/// `POST /extract`.
pub async fn extract_handler(State(state): State<AppState>, request: Request) -> Response {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    let outcome = if content_type.starts_with("multipart/form-data") {
        extract_upload(&state, request).await
    } else if content_type.starts_with("application/json") {
        extract_url(&state, request).await
    } else {
        Err(missing_input(
            "expected multipart/form-data with a 'file' field or JSON {\"url\": …}",
        ))
    };

    respond(outcome)
}

async fn extract_upload(
    state: &AppState,
    request: Request,
) -> Result<ExtractionResult, SalvageError> {
    let mut multipart = Multipart::from_request(request, state)
        .await
        .map_err(|e| missing_input(&e.body_text()))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| missing_input(&e.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().map(str::to_string).unwrap_or_default();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| missing_input(&e.body_text()))?;
        if bytes.is_empty() {
            return Err(missing_input("uploaded file is empty"));
        }
        info!("Upload '{}' ({} bytes)", filename, bytes.len());
        return state.pipeline.extract_bytes(bytes.to_vec(), filename).await;
    }

    Err(missing_input("no 'file' field in multipart body"))
}

async fn extract_url(state: &AppState, request: Request) -> Result<ExtractionResult, SalvageError> {
    let Json(body) = Json::<UrlRequest>::from_request(request, state)
        .await
        .map_err(|e| missing_input(&e.body_text()))?;

    let url = body.url.unwrap_or_default();
    let url = url.trim();
    if url.is_empty() {
        return Err(missing_input("JSON body has no 'url'"));
    }
    // Only remote inputs: a request must never name a file on this host.
    if !is_url(url) {
        return Err(SalvageError::InvalidInput {
            input: url.to_string(),
            reason: "only http:// and https:// URLs are accepted".into(),
        });
    }
    info!("URL input '{}'", url);
    state.pipeline.extract(url).await
}

fn missing_input(reason: &str) -> SalvageError {
    SalvageError::InvalidInput {
        input: String::new(),
        reason: reason.to_string(),
    }
}

fn respond(outcome: Result<ExtractionResult, SalvageError>) -> Response {
    let status = match &outcome {
        Ok(_) => StatusCode::OK,
        Err(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if let Err(e) = &outcome {
        debug!("Responding {}: {}", status, e);
    }
    (status, Json(ExtractionResult::from_outcome(outcome))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractionConfig;
    use crate::strategy::fixture::pdf_with_pages;
    use crate::strategy::StrategyKind;
    use axum::body::Body;
    use tower::ServiceExt;

    const BOUNDARY: &str = "pdfsalvage-test-boundary";

    fn state() -> AppState {
        let config = ExtractionConfig::builder()
            .strategies(vec![StrategyKind::Lopdf])
            .max_pages(20)
            .build()
            .unwrap();
        AppState {
            pipeline: Pipeline::new(&config).unwrap(),
        }
    }

    fn multipart_request(field: &str, filename: &str, content: &[u8]) -> Request {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; \
                 filename=\"{filename}\"\r\nContent-Type: application/pdf\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        axum::http::Request::builder()
            .method("POST")
            .uri("/extract")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn json_request(body: &str) -> Request {
        axum::http::Request::builder()
            .method("POST")
            .uri("/extract")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_reports_service() {
        let Json(v) = health().await;
        assert_eq!(v, json!({"status": "healthy", "service": "pdfsalvage"}));
    }

    #[tokio::test]
    async fn upload_is_extracted() {
        let pdf = pdf_with_pages(&["Uploaded page"], Some("Upload"));
        let response =
            extract_handler(State(state()), multipart_request("file", "up.pdf", &pdf)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let v = body_json(response).await;
        assert_eq!(v["success"], json!(true));
        assert!(v["text"].as_str().unwrap().contains("Uploaded"));
        assert_eq!(v["method"], json!("lopdf"));
        assert_eq!(v["numPages"], json!(1));
        assert_eq!(v["metadata"]["filename"], json!("up.pdf"));
    }

    #[tokio::test]
    async fn non_pdf_upload_is_bad_request() {
        let response = extract_handler(
            State(state()),
            multipart_request("file", "notes.txt", b"just some text"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let v = body_json(response).await;
        assert_eq!(v["success"], json!(false));
        assert!(v["error"].as_str().unwrap().contains("not a PDF"));
    }

    #[tokio::test]
    async fn wrong_field_is_missing_input() {
        let pdf = pdf_with_pages(&["x"], None);
        let response =
            extract_handler(State(state()), multipart_request("document", "a.pdf", &pdf)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let v = body_json(response).await;
        assert!(v["details"].as_str().unwrap().contains("'file'"));
    }

    #[tokio::test]
    async fn json_without_url_is_bad_request() {
        let response = extract_handler(State(state()), json_request("{}")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["success"], json!(false));
    }

    #[tokio::test]
    async fn json_local_path_is_rejected() {
        let response =
            extract_handler(State(state()), json_request(r#"{"url":"/etc/passwd"}"#)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let v = body_json(response).await;
        assert!(v["error"].as_str().unwrap().contains("only http"));
    }

    #[tokio::test]
    async fn unsupported_content_type_is_bad_request() {
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/extract")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from("hello"))
            .unwrap();
        let response = extract_handler(State(state()), request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    async fn send(app: Router, request: Request) -> Response {
        app.oneshot(request).await.unwrap()
    }

    #[tokio::test]
    async fn oversized_upload_is_json_bad_request() {
        let app = router(state().pipeline, 1024);
        let pdf = pdf_with_pages(&["x"; 40], None);
        assert!(pdf.len() > 1024);

        let response = send(app, multipart_request("file", "big.pdf", &pdf)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let v = body_json(response).await;
        assert_eq!(v["success"], json!(false));
        assert!(v["error"].as_str().is_some());
    }

    #[tokio::test]
    async fn oversized_json_is_json_bad_request() {
        let app = router(state().pipeline, 64);
        let url = format!("https://example.org/{}.pdf", "a".repeat(200));
        let response = send(app, json_request(&json!({ "url": url }).to_string())).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["success"], json!(false));
    }

    #[tokio::test]
    async fn router_serves_upload_within_limit() {
        let app = router(state().pipeline, DEFAULT_BODY_LIMIT_BYTES);
        let pdf = pdf_with_pages(&["Routed page"], None);
        let response = send(app, multipart_request("file", "ok.pdf", &pdf)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_json(response).await["text"]
            .as_str()
            .unwrap()
            .contains("Routed"));
    }

    #[test]
    fn internal_errors_map_to_500() {
        let response = respond(Err(SalvageError::Internal("boom".into())));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
