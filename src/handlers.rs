use axum::{
    Json, Router,
    body::Bytes,
    extract::DefaultBodyLimit,
    http::StatusCode,
    routing::{MethodRouter, any},
};
use log::{debug, info};
use serde_json::{Map, Value, json};

use crate::{
    extract::{extract_response, extract_title},
    models::{IngestRequest, InvokeRequest, InvokeResponse},
};

pub const INGEST_PATH: &str = "/ingest";
pub const EMBEDDINGS_STORE_OUTPUT: &str = "EmbeddingsStoreOutput";
pub const INGEST_CONFIRMATION: &str = "The Cosmos DB documents have been processed successfully.";

/// Routes that answer with the `Response` of a semantic search binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchTool {
    Prompt,
    SupportInformation,
}

impl SearchTool {
    pub fn path(self) -> &'static str {
        match self {
            Self::Prompt => "/prompt",
            Self::SupportInformation => "/getsupportinformation",
        }
    }

    fn status_line(self) -> &'static str {
        match self {
            Self::Prompt => "Starting to process information for prompt call...",
            Self::SupportInformation => {
                "Starting to process information for getsupportinformation tool..."
            }
        }
    }
}

pub fn process_search(tool: SearchTool, body: &[u8]) -> InvokeResponse {
    let logs = vec![
        tool.status_line().to_string(),
        format!("Received data (raw): {}", String::from_utf8_lossy(body)),
    ];
    let request = InvokeRequest::from_body(body);
    if let Some(method) = request.method_name() {
        debug!("{} invoked as {}", tool.path(), method);
    }
    let response = extract_response(&request.data);
    InvokeResponse {
        outputs: Map::new(),
        logs,
        return_value: Value::String(response),
    }
}

pub fn process_ingest(body: &[u8]) -> InvokeResponse {
    let mut logs = vec![
        "Starting to process ingested content for Cosmos DB NoSQL...".to_string(),
        format!("Received documents (raw): {}", String::from_utf8_lossy(body)),
    ];
    let request = IngestRequest::from_body(body);
    let metadata_json = serde_json::to_string(&request).unwrap_or_default();
    logs.push(format!("Extracted Metadata: {metadata_json}"));

    let title = request
        .metadata
        .as_ref()
        .map(extract_title)
        .unwrap_or_default();
    info!("Ingest title extracted: '{}'", title);
    logs.push(format!("Title extracted: {title}"));

    let mut outputs = Map::new();
    outputs.insert(EMBEDDINGS_STORE_OUTPUT.to_string(), json!({ "title": title }));
    InvokeResponse {
        outputs,
        logs,
        return_value: Value::String(INGEST_CONFIRMATION.to_string()),
    }
}

type EnvelopeResult = (StatusCode, Json<InvokeResponse>);

fn search_route(tool: SearchTool) -> MethodRouter {
    any(move |body: Bytes| async move {
        debug!("Handling {}", tool.path());
        (StatusCode::OK, Json(process_search(tool, &body)))
    })
}

async fn ingest(body: Bytes) -> EnvelopeResult {
    debug!("Handling {}", INGEST_PATH);
    (StatusCode::OK, Json(process_ingest(&body)))
}

pub fn router() -> Router {
    Router::new()
        .route(INGEST_PATH, any(ingest))
        .route(SearchTool::Prompt.path(), search_route(SearchTool::Prompt))
        .route(
            SearchTool::SupportInformation.path(),
            search_route(SearchTool::SupportInformation),
        )
        .layer(DefaultBodyLimit::disable())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request, header},
    };
    use tower::ServiceExt;

    async fn call(method: Method, path: &str, body: &'static str) -> (StatusCode, Value) {
        let response = router()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(path)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    const PROMPT_BODY: &str = r#"{"Data":{"SemanticSearchInput":"\"{\\\"Response\\\":\\\"Hello\\\"}\""},"Metadata":{}}"#;

    #[tokio::test]
    async fn prompt_returns_extracted_response() {
        let (status, body) = call(Method::POST, "/prompt", PROMPT_BODY).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ReturnValue"], "Hello");
        assert_eq!(body["Outputs"], json!({}));
        assert_eq!(
            body["Logs"],
            json!([
                "Starting to process information for prompt call...",
                format!("Received data (raw): {PROMPT_BODY}"),
            ])
        );
    }

    #[tokio::test]
    async fn support_shares_prompt_logic_with_own_status_line() {
        let (status, body) = call(Method::POST, "/getsupportinformation", PROMPT_BODY).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ReturnValue"], "Hello");
        assert_eq!(
            body["Logs"][0],
            "Starting to process information for getsupportinformation tool..."
        );
    }

    #[tokio::test]
    async fn ingest_decodes_title_into_output_binding() {
        let (status, body) = call(
            Method::POST,
            "/ingest",
            r#"{"Metadata":{"title":"\"Doc A\""}}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["Outputs"]["EmbeddingsStoreOutput"]["title"], "Doc A");
        assert_eq!(body["ReturnValue"], INGEST_CONFIRMATION);
        assert_eq!(
            body["Logs"],
            json!([
                "Starting to process ingested content for Cosmos DB NoSQL...",
                r#"Received documents (raw): {"Metadata":{"title":"\"Doc A\""}}"#,
                r#"Extracted Metadata: {"Metadata":{"title":"\"Doc A\""}}"#,
                "Title extracted: Doc A",
            ])
        );
    }

    #[tokio::test]
    async fn empty_object_is_answered_with_200_on_every_route() {
        for path in ["/prompt", "/getsupportinformation"] {
            let (status, body) = call(Method::POST, path, "{}").await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["ReturnValue"], "");
        }
        let (status, body) = call(Method::POST, "/ingest", "{}").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ReturnValue"], INGEST_CONFIRMATION);
        assert_eq!(body["Outputs"]["EmbeddingsStoreOutput"]["title"], "");
    }

    #[tokio::test]
    async fn malformed_body_is_still_200() {
        let (status, body) = call(Method::POST, "/prompt", "{{{").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ReturnValue"], "");
        assert_eq!(body["Logs"][1], "Received data (raw): {{{");

        let (status, body) = call(Method::POST, "/ingest", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ReturnValue"], INGEST_CONFIRMATION);
        assert_eq!(body["Logs"][2], r#"Extracted Metadata: {"Metadata":null}"#);
    }

    #[test]
    fn duplicate_and_recased_envelope_fields_still_extract() {
        let resp = process_search(
            SearchTool::Prompt,
            br#"{"Data":{"SemanticSearchInput":"\"{\\\"Response\\\":\\\"Hello\\\"}\""},"data":{}}"#,
        );
        assert_eq!(resp.return_value, "Hello");

        let resp = process_ingest(br#"{"Metadata":{"title":"\"Doc A\""},"Metadata":{}}"#);
        assert_eq!(resp.outputs[EMBEDDINGS_STORE_OUTPUT]["title"], "Doc A");

        let resp = process_ingest(br#"{"METADATA":{"title":"\"Doc A\""}}"#);
        assert_eq!(resp.outputs[EMBEDDINGS_STORE_OUTPUT]["title"], "Doc A");
        assert_eq!(
            resp.logs[2],
            r#"Extracted Metadata: {"Metadata":{"title":"\"Doc A\""}}"#
        );
    }

    #[tokio::test]
    async fn routes_accept_any_method() {
        let (status, body) = call(Method::GET, "/prompt", PROMPT_BODY).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ReturnValue"], "Hello");
        let (status, _) = call(Method::PUT, "/ingest", "{}").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let response = router()
            .oneshot(
                Request::builder()
                    .uri("/prompt/extra")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn plain_title_is_kept() {
        let resp = process_ingest(br#"{"Metadata":{"title":"My Title"}}"#);
        assert_eq!(
            resp.outputs[EMBEDDINGS_STORE_OUTPUT],
            json!({"title": "My Title"})
        );
    }

    #[test]
    fn invalid_utf8_body_is_echoed_lossily() {
        let resp = process_search(SearchTool::Prompt, b"\xff{}");
        assert_eq!(resp.logs[1], "Received data (raw): \u{fffd}{}");
        assert_eq!(resp.return_value, "");
    }
}
