use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::post;
use axum::Router;
use serde_json::{json, Value};

use crate::config::{AppConfig, Environment, UpstreamConfig};

#[derive(Clone)]
pub enum MockReply {
    /// 200 with the given string as `choices[0].message.content`.
    Content(String),
    /// Non-success status with a JSON error body.
    Status(u16),
    /// Like `Content`, after sleeping.
    Delayed(Duration, String),
}

#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub headers: HeaderMap,
    pub body: Value,
}

#[derive(Clone)]
struct MockState {
    reply: MockReply,
    hits: Arc<AtomicUsize>,
    last: Arc<Mutex<Option<RecordedRequest>>>,
}

pub struct MockUpstream {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
    last: Arc<Mutex<Option<RecordedRequest>>>,
}

impl MockUpstream {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.last
            .lock()
            .expect("mock lock")
            .clone()
            .expect("upstream was not called")
    }
}

pub async fn spawn_upstream(reply: MockReply) -> MockUpstream {
    let state = MockState {
        reply,
        hits: Arc::new(AtomicUsize::new(0)),
        last: Arc::new(Mutex::new(None)),
    };
    let hits = state.hits.clone();
    let last = state.last.clone();

    let app = Router::new()
        .route("/chat/completions", post(chat_completions))
        .with_state(state);

    MockUpstream {
        base_url: serve(app).await,
        hits,
        last,
    }
}

async fn chat_completions(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    *state.last.lock().expect("mock lock") = Some(RecordedRequest { headers, body });

    match state.reply {
        MockReply::Content(content) => completion(&content),
        MockReply::Delayed(delay, content) => {
            tokio::time::sleep(delay).await;
            completion(&content)
        }
        MockReply::Status(code) => {
            let status = StatusCode::from_u16(code).expect("valid status");
            let body = json!({ "error": { "message": "mock failure", "code": code } });
            (status, Json(body)).into_response()
        }
    }
}

fn completion(content: &str) -> Response {
    Json(json!({
        "id": "gen-test",
        "choices": [
            { "index": 0, "message": { "role": "assistant", "content": content } }
        ]
    }))
    .into_response()
}

/// Serves `app` on an ephemeral local port and returns its base URL.
pub async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server");
    });
    format!("http://{addr}")
}

pub fn test_config(base_url: &str, environment: Environment) -> AppConfig {
    AppConfig {
        bind_addr: "127.0.0.1:0".to_string(),
        static_dir: PathBuf::from("public"),
        environment,
        upstream: UpstreamConfig {
            base_url: base_url.to_string(),
            api_key: "test-key".to_string(),
            referrer_url: "http://localhost:3000".to_string(),
            app_title: "RecycleAI".to_string(),
            timeout: Duration::from_secs(5),
        },
    }
}

pub const ALL_FIELDS_CONTENT: &str = r#"{"title":"Bottle Planter","functionality":"Grows herbs","manufacturing":"Cut and fold","benefits":"Less landfill","safety":"Sand edges","users":"Gardeners","scenarios":"Balconies"}"#;
