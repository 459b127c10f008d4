//! Router contract tests over injected collaborators.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use ragdoc::RagConfig;
use ragdoc::document::{Chunk, ChunkMetadata, FileType};
use ragdoc::embedding::EmbeddingProvider;
use ragdoc::jsonfile::JsonFileVectorStore;
use ragdoc::llm::LanguageModel;
use ragdoc::loader::DocumentLoader;
use ragdoc::service::RagService;
use ragdoc_server::{AppState, app_router};

struct MockEmbedder;

#[async_trait]
impl EmbeddingProvider for MockEmbedder {
    async fn embed(&self, text: &str) -> ragdoc::Result<Vec<f32>> {
        let hash = text.bytes().fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
        Ok((0..8).map(|i| ((hash.wrapping_add(i)) as f32).sin()).collect())
    }

    fn dimensions(&self) -> usize {
        8
    }
}

struct StubLlm;

#[async_trait]
impl LanguageModel for StubLlm {
    async fn generate(&self, _prompt: &str) -> ragdoc::Result<String> {
        Ok("answer text".to_string())
    }

    fn model_name(&self) -> &str {
        "stub"
    }
}

struct StubLoader;

impl DocumentLoader for StubLoader {
    fn load_and_split(&self, _docs_dir: &Path, files: &[String]) -> Vec<Chunk> {
        files
            .iter()
            .map(|file| {
                let metadata = ChunkMetadata {
                    source_file: file.clone(),
                    page: 1,
                    file_type: FileType::Docx,
                };
                Chunk::new(format!("content of {file}"), metadata, 0)
            })
            .collect()
    }
}

fn make_state(root: &Path, with_document: bool) -> AppState {
    let docs = root.join("documents");
    let index = root.join("index");
    std::fs::create_dir_all(&docs).unwrap();
    if with_document {
        std::fs::write(docs.join("handbook.docx"), b"placeholder").unwrap();
    }

    let config = RagConfig::builder().docs_dir(docs).index_dir(&index).build().unwrap();
    let service = RagService::builder()
        .config(config)
        .embedder(Arc::new(MockEmbedder))
        .llm(Arc::new(StubLlm))
        .backend(Arc::new(JsonFileVectorStore::open(index).unwrap()))
        .loader(Arc::new(StubLoader))
        .build()
        .unwrap();

    AppState { service: Arc::new(service) }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_reports_not_ready_before_initialization() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app_router(make_state(tmp.path(), true));

    let response = app.oneshot(get("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["system_ready"], false);
}

#[tokio::test]
async fn status_reports_missing_database() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app_router(make_state(tmp.path(), true));

    let response = app.oneshot(get("/api/status")).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["database_exists"], false);
    assert_eq!(body["database_status"], "Database not found");
    assert_eq!(body["system_ready"], false);
}

#[tokio::test]
async fn search_before_initialization_returns_structured_error() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app_router(make_state(tmp.path(), true));

    let response =
        app.oneshot(post_json("/api/search", r#"{"question":"anything"}"#)).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("not initialized"));
}

#[tokio::test]
async fn initialize_then_search_round_trip() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app_router(make_state(tmp.path(), true));

    let response = app.clone().oneshot(post_json("/api/initialize", "{}")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);

    let response = app
        .clone()
        .oneshot(post_json("/api/search", r#"{"question":"what is covered?"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["answer"], "answer text");
    let sources = body["sources"].as_array().unwrap();
    assert!(!sources.is_empty());
    assert_eq!(sources[0], "handbook.docx (p.1)");

    let response = app.oneshot(get("/api/health")).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["system_ready"], true);
}

#[tokio::test]
async fn initialize_without_documents_returns_500() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app_router(make_state(tmp.path(), false));

    let response = app.oneshot(post_json("/api/initialize", "{}")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().is_some());
}
