#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use lopdf::{Document, Object, Stream, dictionary};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use flashdeck::config::Config;
use flashdeck::data::models::{ExampleSentence, GeneratedCard};
use flashdeck::features::generation::{FlashcardGenerator, GenerationError, GenerationRequest};
use flashdeck::features::storage::{LocalStorage, StorageAdapter, StorageRegistry};
use flashdeck::{AppState, DbPool, app, db};

pub const PASSWORD: &str = "correct-horse";
const BOUNDARY: &str = "flashdeck-test-boundary";

/// Generator that answers with `num_cards` predictable cards.
#[derive(Default)]
pub struct StubGenerator {
    pub calls: AtomicUsize,
}

#[async_trait]
impl FlashcardGenerator for StubGenerator {
    async fn generate(
        &self,
        pdf: Vec<u8>,
        request: &GenerationRequest,
    ) -> Result<Vec<GeneratedCard>, GenerationError> {
        let pages = Document::load_mem(&pdf)?.get_pages().len();
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok((0..request.num_cards)
            .map(|i| GeneratedCard {
                front: format!("wort-{call}-{i}"),
                back: format!("word {i} of {pages} pages"),
                examples: vec![ExampleSentence {
                    sentence: "Das ist ein Wort.".into(),
                    translation: "That is a word.".into(),
                }],
                synonyms: vec![],
                antonyms: vec![],
                part_of_speech: Some("noun".into()),
                gender: Some("das".into()),
                plural_form: None,
                pronunciation: None,
                notes: None,
            })
            .collect())
    }
}

pub struct TestApp {
    pub router: Router,
    pub pool: DbPool,
    pub generator: Arc<StubGenerator>,
    _storage_dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        let pool = db::establish_pool(":memory:", 1).unwrap();
        {
            let mut conn = pool.get().unwrap();
            db::run_migrations(&mut conn).unwrap();
        }

        let storage_dir = TempDir::new().unwrap();
        let local: Arc<dyn StorageAdapter> = Arc::new(LocalStorage::new(storage_dir.path()));
        let storage = StorageRegistry::new(reqwest::Client::new(), Some(local), None);
        let generator = Arc::new(StubGenerator::default());

        let state = AppState {
            pool: pool.clone(),
            config: Arc::new(Config::with_secret("integration-test-secret")),
            storage,
            generator: generator.clone(),
        };

        Self {
            router: app(state),
            pool,
            generator,
            _storage_dir: storage_dir,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, body)
    }

    pub async fn send_raw(&self, request: Request<Body>) -> axum::response::Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn register(&self, username: &str) -> (StatusCode, Value) {
        let body = serde_json::json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": PASSWORD,
        });
        self.send(json_request("POST", "/auth/register", None, &body)).await
    }

    pub async fn login(&self, username: &str, password: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/auth/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("username={username}&password={password}")))
            .unwrap();
        self.send(request).await
    }

    /// Registers `username` and returns a bearer token for it.
    pub async fn token_for(&self, username: &str) -> String {
        let (status, _) = self.register(username).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = self.login(username, PASSWORD).await;
        assert_eq!(status, StatusCode::OK);
        body["access_token"].as_str().unwrap().to_string()
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(empty_request("GET", uri, Some(token))).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(empty_request("DELETE", uri, Some(token))).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: &Value) -> (StatusCode, Value) {
        self.send(json_request("POST", uri, Some(token), body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: &Value) -> (StatusCode, Value) {
        self.send(json_request("PUT", uri, Some(token), body)).await
    }

    pub async fn create_card(&self, token: &str, front: &str, back: &str) -> i64 {
        let (status, body) = self
            .post("/cards", token, &serde_json::json!({ "front": front, "back": back }))
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["id"].as_i64().unwrap()
    }

    pub async fn upload_book(&self, token: &str, title: &str, pages: usize) -> (StatusCode, Value) {
        self.send(upload_request(token, title, "book.pdf", &blank_pdf(pages))).await
    }
}

pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn upload_request(token: &str, title: &str, filename: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\n{title}\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"target_language\"\r\n\r\nGerman\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/pdf\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/books/upload")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Minimal PDF with `pages` empty pages.
pub fn blank_pdf(pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let kids: Vec<Object> = (0..pages)
        .map(|_| {
            let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            })
            .into()
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}
