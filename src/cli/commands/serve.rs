//! HTTP front end.
//!
//! A small JSON API mirroring the interactive UI: report whether the
//! index is built, trigger a build, and ask questions. Ask failures are
//! caught at the handler level and returned as error payloads instead of
//! taking the process down.

use crate::agent::{Agent, ToolContext};
use crate::cli::Output;
use crate::config::{Credentials, Settings};
use crate::embedding::OpenAIEmbedder;
use crate::knowledge_base::{self, Retriever};
use crate::vector_store::index_exists;
use crate::weather::WeatherClient;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Shared application state.
struct AppState {
    settings: Settings,
    credentials: Credentials,
}

/// Run the HTTP front end.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    // Fail fast on missing secrets before binding anything.
    let credentials = Credentials::from_env()?;

    let state = Arc::new(AppState {
        settings,
        credentials,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/status", get(status))
        .route("/build", post(build))
        .route("/ask", post(ask))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Reise API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Status", "GET  /status");
    Output::kv("Build index", "POST /build");
    Output::kv("Ask", "POST /ask");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Serialize)]
struct StatusResponse {
    /// Whether the knowledge base index has been built.
    index_built: bool,
}

#[derive(Serialize)]
struct BuildResponse {
    chunks_indexed: usize,
}

#[derive(Deserialize)]
struct AskRequest {
    question: String,
}

#[derive(Serialize)]
struct AskResponse {
    answer: String,
    tool_calls: Vec<ToolCallInfo>,
    iterations: usize,
}

#[derive(Serialize)]
struct ToolCallInfo {
    name: String,
    arguments: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(StatusResponse {
        index_built: index_exists(&state.settings.index_dir()),
    })
}

async fn build(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let embedder = Arc::new(OpenAIEmbedder::new(
        &state.credentials,
        &state.settings.embedding.model,
        state.settings.embedding.dimensions as usize,
    ));

    match knowledge_base::build(&state.settings, embedder).await {
        Ok(result) => Json(BuildResponse {
            chunks_indexed: result.chunks_indexed,
        })
        .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

async fn ask(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AskRequest>,
) -> impl IntoResponse {
    let embedder = Arc::new(OpenAIEmbedder::new(
        &state.credentials,
        &state.settings.embedding.model,
        state.settings.embedding.dimensions as usize,
    ));

    let retriever = match Retriever::open(&state.settings, embedder) {
        Ok(r) => r,
        Err(e) => {
            return (
                StatusCode::CONFLICT,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    };

    let weather = WeatherClient::new(&state.credentials, &state.settings.weather);
    let tools = ToolContext::new(weather, retriever);
    let agent = Agent::new(&state.credentials, &state.settings.agent, tools);

    match agent.run(&req.question).await {
        Ok(response) => Json(AskResponse {
            answer: response.content,
            tool_calls: response
                .tool_calls
                .into_iter()
                .map(|c| ToolCallInfo {
                    name: c.name,
                    arguments: c.arguments,
                })
                .collect(),
            iterations: response.iterations,
        })
        .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("Something went wrong while answering: {}", e),
            }),
        )
            .into_response(),
    }
}
