//! HTTP front door for the avatar client.
//!
//! ## Endpoints
//!
//! - `GET /`: health string
//! - `GET /voices`: the speech provider's voice list, passed through
//! - `POST /chat`: `{message?}` → `{userPrompt, aiMessages}`
//!
//! Every response allows any origin; `OPTIONS` preflights get `204`.

use crate::answer::ScriptAnswerProvider;
use crate::chat::ChatService;
use crate::config::{CompanionConfig, ServerConfig};
use crate::error::{CompanionError, Result};
use crate::lipsync::{converter_from_config, extractor_from_config};
use crate::message::ChatRequest;
use crate::pipeline::MediaPipeline;
use crate::scripted::ScriptedReplies;
use crate::tts::{ElevenLabsTts, SpeechSynthesizer};
use axum::Router;
use axum::body::Bytes;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Body of `GET /`.
pub const HEALTH_TEXT: &str = "Hello World!";

/// Shared, immutable handler state.
#[derive(Clone)]
pub struct AppState {
    chat: Arc<ChatService>,
    speech: Arc<dyn SpeechSynthesizer>,
}

impl AppState {
    pub fn new(chat: ChatService, speech: Arc<dyn SpeechSynthesizer>) -> Self {
        Self {
            chat: Arc::new(chat),
            speech,
        }
    }

    /// Wire the production backends described by `config`.
    ///
    /// Scripted reply assets are read here, once.
    pub async fn from_config(config: &CompanionConfig) -> Self {
        let speech: Arc<dyn SpeechSynthesizer> = Arc::new(ElevenLabsTts::new(config.tts.clone()));
        let pipeline = MediaPipeline::new(
            Arc::clone(&speech),
            converter_from_config(&config.lipsync, &config.tools),
            extractor_from_config(&config.lipsync, &config.tools),
            config.pipeline.clone(),
            config.tts.voice_id.clone(),
        );
        let scripts = ScriptedReplies::load(&config.scripts.dir).await;
        let chat = ChatService::new(
            Arc::new(ScriptAnswerProvider::new(config.answer.clone())),
            pipeline,
            scripts,
            speech.is_configured(),
            config.chat.clone(),
        );
        Self::new(chat, speech)
    }
}

/// Build the router with CORS applied to every route.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handle_health))
        .route("/voices", get(handle_voices))
        .route("/chat", post(handle_chat))
        .layer(middleware::from_fn(cors))
        .with_state(state)
}

/// A running server bound to a local address.
pub struct CompanionServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl CompanionServer {
    /// Bind `{config.host}:{config.port}` (port `0` = auto-assign) and serve
    /// in a background task.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot bind.
    pub async fn start(state: AppState, config: &ServerConfig) -> Result<Self> {
        let bind_addr = format!("{}:{}", config.host, config.port);
        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|e| CompanionError::Config(format!("cannot bind {bind_addr}: {e}")))?;
        let addr = listener.local_addr()?;

        info!("companion server listening on http://{addr}");

        let app = router(state);
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                error!("companion server error: {e}");
            }
        });

        Ok(Self { addr, handle })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Abort the server task.
    pub fn shutdown(&self) {
        self.handle.abort();
    }
}

impl Drop for CompanionServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn error_body(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(serde_json::json!({ "error": message.into() })),
    )
        .into_response()
}

fn apply_cors(headers: &mut HeaderMap) {
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("content-type"),
    );
}

async fn cors(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        let mut response = StatusCode::NO_CONTENT.into_response();
        apply_cors(response.headers_mut());
        return response;
    }
    let mut response = next.run(request).await;
    apply_cors(response.headers_mut());
    response
}

/// `GET /`
async fn handle_health() -> &'static str {
    HEALTH_TEXT
}

/// `GET /voices`
async fn handle_voices(State(state): State<AppState>) -> Response {
    match state.speech.voices().await {
        Ok(voices) => Json(voices).into_response(),
        Err(e) => {
            warn!("voice list unavailable: {e}");
            error_body(StatusCode::BAD_GATEWAY, e.to_string())
        }
    }
}

/// `POST /chat`
///
/// An empty body is treated as `{}`.
async fn handle_chat(State(state): State<AppState>, body: Bytes) -> Response {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        ChatRequest::default()
    } else {
        match serde_json::from_slice::<ChatRequest>(&body) {
            Ok(request) => request,
            Err(e) => return error_body(StatusCode::BAD_REQUEST, format!("invalid body: {e}")),
        }
    };

    match state.chat.handle(request.message).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => {
            error!("chat request failed: {e}");
            error_body(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}
