//! In-process fake upstreams for integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use comic_image_proxy::api::routes::AppState;
use comic_image_proxy::replicate::poll::PollPolicy;
use comic_image_proxy::{ImageJobRunner, PromptEnhancer};

pub const OPENROUTER_KEY: &str = "sk-or-v1-test-0123456789abcdef";
pub const REPLICATE_TOKEN: &str = "r8_test_0123456789abcdef";
pub const TEST_INTERVAL: Duration = Duration::from_millis(10);

/// Serve `app` on an ephemeral localhost port and return its base URL.
pub async fn spawn(app: Router) -> String {
    let addr = SocketAddr::from(([127, 0, 0, 1], 0));
    let server = axum::Server::bind(&addr).serve(app.into_make_service());
    let addr = server.local_addr();
    tokio::spawn(async move {
        let _ = server.await;
    });
    format!("http://{}", addr)
}

pub fn fast_policy() -> PollPolicy {
    PollPolicy {
        max_attempts: 30,
        interval: TEST_INTERVAL,
        query_timeout: Duration::from_millis(500),
    }
}

// ---------------------------------------------------------------------------
// Chat completion
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct FakeChat {
    pub hits: Arc<AtomicUsize>,
    pub last_request: Arc<Mutex<Option<(HeaderMap, Value)>>>,
    reply: Arc<(StatusCode, Value)>,
}

impl FakeChat {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<(HeaderMap, Value)> {
        self.last_request.lock().unwrap().clone()
    }
}

async fn chat_completions(
    State(fake): State<FakeChat>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    fake.hits.fetch_add(1, Ordering::SeqCst);
    *fake.last_request.lock().unwrap() = Some((headers, body));
    let (status, reply) = &*fake.reply;
    (*status, Json(reply.clone()))
}

/// Fake chat endpoint answering every request with `status` and `reply`.
/// Returns the full endpoint URL.
pub async fn fake_openrouter(status: StatusCode, reply: Value) -> (String, FakeChat) {
    let fake = FakeChat {
        hits: Arc::new(AtomicUsize::new(0)),
        last_request: Arc::new(Mutex::new(None)),
        reply: Arc::new((status, reply)),
    };
    let app = Router::new()
        .route("/chat/completions", post(chat_completions))
        .with_state(fake.clone());
    let base = spawn(app).await;
    (format!("{}/chat/completions", base), fake)
}

pub fn chat_reply(content: &str) -> Value {
    json!({
        "id": "gen-1",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
    })
}

// ---------------------------------------------------------------------------
// Predictions
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct FakeReplicate {
    pub create_hits: Arc<AtomicUsize>,
    pub status_hits: Arc<AtomicUsize>,
    pub last_create: Arc<Mutex<Option<(HeaderMap, Value)>>>,
    create_reply: Arc<(StatusCode, Value)>,
    script: Arc<Mutex<VecDeque<(StatusCode, Value)>>>,
}

impl FakeReplicate {
    pub fn create_hits(&self) -> usize {
        self.create_hits.load(Ordering::SeqCst)
    }

    pub fn status_hits(&self) -> usize {
        self.status_hits.load(Ordering::SeqCst)
    }

    pub fn last_create(&self) -> Option<(HeaderMap, Value)> {
        self.last_create.lock().unwrap().clone()
    }
}

async fn create_prediction(
    State(fake): State<FakeReplicate>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    fake.create_hits.fetch_add(1, Ordering::SeqCst);
    *fake.last_create.lock().unwrap() = Some((headers, body));
    let (status, reply) = &*fake.create_reply;
    (*status, Json(reply.clone()))
}

async fn prediction_status(
    State(fake): State<FakeReplicate>,
    Path(id): Path<String>,
) -> (StatusCode, Json<Value>) {
    fake.status_hits.fetch_add(1, Ordering::SeqCst);
    let next = fake.script.lock().unwrap().pop_front();
    match next {
        Some((status, body)) => (status, Json(body)),
        None => (StatusCode::OK, Json(json!({"id": id, "status": "processing", "output": null}))),
    }
}

async fn image_file() -> (StatusCode, Vec<u8>) {
    (StatusCode::OK, b"\x89PNG\r\n\x1a\nfake".to_vec())
}

/// Fake predictions API. Status queries pop `script` in order and report
/// `processing` once it runs out. Also serves `/files/comic.png`.
pub async fn fake_replicate_with(
    create_reply: (StatusCode, Value),
    script: Vec<(StatusCode, Value)>,
) -> (String, FakeReplicate) {
    let fake = FakeReplicate {
        create_hits: Arc::new(AtomicUsize::new(0)),
        status_hits: Arc::new(AtomicUsize::new(0)),
        last_create: Arc::new(Mutex::new(None)),
        create_reply: Arc::new(create_reply),
        script: Arc::new(Mutex::new(script.into())),
    };
    let app = Router::new()
        .route("/predictions", post(create_prediction))
        .route("/predictions/:id", get(prediction_status))
        .route("/files/comic.png", get(image_file))
        .with_state(fake.clone());
    (spawn(app).await, fake)
}

pub async fn fake_replicate(script: Vec<(StatusCode, Value)>) -> (String, FakeReplicate) {
    fake_replicate_with(
        (StatusCode::CREATED, json!({"id": "job-1", "status": "starting"})),
        script,
    )
    .await
}

pub fn status(state: &str) -> (StatusCode, Value) {
    (StatusCode::OK, json!({"id": "job-1", "status": state, "output": null}))
}

pub fn succeeded(output: Value) -> (StatusCode, Value) {
    (StatusCode::OK, json!({"id": "job-1", "status": "succeeded", "output": output}))
}

// ---------------------------------------------------------------------------
// Service under test
// ---------------------------------------------------------------------------

pub fn app_state(chat_url: &str, replicate_url: &str, keys: bool) -> AppState {
    let (key, token) = if keys {
        (Some(OPENROUTER_KEY.to_string()), Some(REPLICATE_TOKEN.to_string()))
    } else {
        (None, None)
    };
    AppState {
        enhancer: PromptEnhancer::new(
            chat_url.to_string(),
            key,
            "http://localhost:3000".to_string(),
        ),
        runner: ImageJobRunner::new(replicate_url.to_string(), token)
            .with_poll_policy(fast_policy()),
    }
}
