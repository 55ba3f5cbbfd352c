use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use futures_util::StreamExt;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::{
    config::MockConfig,
    scenarios::{
        ScenarioIndex, CHAT_DIALOGUE_SCENARIOS_FILE, CHAT_TOOL_SCENARIOS_FILE,
        GENERATE_SCENARIOS_FILE,
    },
    services::{timestamp, ChatService, ChatToolsService, GenerateService, ResponseStream},
    types::{ChatRequest, GenerateRequest, VersionInfo},
    MockError,
};

pub const NDJSON: &str = "application/x-ndjson";

/// Everything the handlers share. Immutable once built.
pub struct AppState {
    pub config: Arc<MockConfig>,
    pub generate: GenerateService,
    pub chat: ChatService,
    pub chat_tools: ChatToolsService,
}

impl AppState {
    /// Loads all three catalogs from the configured scenarios directory.
    pub fn load(config: MockConfig) -> Result<Self, MockError> {
        let config = Arc::new(config);
        let dir = &config.scenarios_dir;

        let generate = Arc::new(ScenarioIndex::load(dir.join(GENERATE_SCENARIOS_FILE))?);
        let dialogue = Arc::new(ScenarioIndex::load(dir.join(CHAT_DIALOGUE_SCENARIOS_FILE))?);
        let tools = Arc::new(ScenarioIndex::load(dir.join(CHAT_TOOL_SCENARIOS_FILE))?);

        Ok(Self {
            generate: GenerateService::new(config.clone(), generate),
            chat: ChatService::new(config.clone(), dialogue),
            chat_tools: ChatToolsService::new(config.clone(), tools),
            config,
        })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/generate", post(generate))
        .route("/api/chat", post(chat))
        .route("/api/chat/tools", post(chat_tools))
        .route("/chat/tools", post(chat_tools))
        .route("/api/version", get(version))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn generate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerateRequest>,
) -> Response {
    if request.streaming() {
        ndjson(state.generate.stream(&request))
    } else {
        Json(state.generate.single(&request)).into_response()
    }
}

async fn chat(State(state): State<Arc<AppState>>, Json(request): Json<ChatRequest>) -> Response {
    if request.has_tools() {
        return chat_with_tools(&state, &request);
    }
    if request.streaming() {
        ndjson(state.chat.stream(&request))
    } else {
        Json(state.chat.single(&request)).into_response()
    }
}

async fn chat_tools(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Response {
    chat_with_tools(&state, &request)
}

fn chat_with_tools(state: &AppState, request: &ChatRequest) -> Response {
    if request.streaming() {
        ndjson(state.chat_tools.stream(request))
    } else {
        Json(state.chat_tools.single(request)).into_response()
    }
}

async fn version(State(state): State<Arc<AppState>>) -> Json<VersionInfo> {
    Json(VersionInfo {
        version: state.config.version.clone(),
        mock_model: state.config.default_model.clone(),
        timestamp: timestamp(),
    })
}

/// Frames a stream as newline-delimited JSON, one object per line.
fn ndjson<T>(frames: ResponseStream<T>) -> Response
where
    T: Serialize + 'static,
{
    let body = frames.map(|frame| {
        serde_json::to_vec(&frame).map(|mut line| {
            line.push(b'\n');
            Bytes::from(line)
        })
    });

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, NDJSON)],
        Body::from_stream(body),
    )
        .into_response()
}
