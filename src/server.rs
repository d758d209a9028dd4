use std::any::Any;
use std::net::SocketAddr;
use std::path::Path;

use anyhow::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde_json::Value;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::generator::IdeaGenerator;
use crate::models::{ErrorDescriptor, GenerateRequest, GenerateResponse, ModelsResponse};

const INVALID_INPUT_MESSAGE: &str = "Invalid input materials";
const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

#[derive(Clone)]
struct AppState {
    generator: IdeaGenerator,
}

pub async fn run_server(config: AppConfig, generator: IdeaGenerator) -> Result<()> {
    let app = build_router(generator, &config.static_dir);

    let addr: SocketAddr = config.bind_addr.parse()?;
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(generator: IdeaGenerator, static_dir: &Path) -> Router {
    let state = AppState { generator };

    Router::new()
        .route("/generate", post(generate_handler))
        .route("/models", get(list_models))
        .fallback_service(ServeDir::new(static_dir))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn generate_handler(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let Json(body) = payload.map_err(|rejection| {
        tracing::debug!("rejected generate body: {}", rejection);
        ApiError::InvalidInput
    })?;
    let request = GenerateRequest::from_body(body).ok_or(ApiError::InvalidInput)?;
    let materials = request.valid_materials().ok_or(ApiError::InvalidInput)?;

    let idea = state
        .generator
        .generate(materials, request.model_alias())
        .await
        .map_err(ApiError::Generation)?;

    Ok(Json(GenerateResponse::success(idea)))
}

async fn list_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    Json(state.generator.catalog().describe())
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let reason = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!("request handler panicked: {}", reason);
    ApiError::Internal.into_response()
}

#[derive(Debug)]
enum ApiError {
    InvalidInput,
    Generation(ErrorDescriptor),
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::InvalidInput => {
                let body = serde_json::json!({ "error": INVALID_INPUT_MESSAGE });
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            ApiError::Generation(descriptor) => {
                let body = GenerateResponse::failure(descriptor.message, descriptor.details);
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
            ApiError::Internal => {
                let body = GenerateResponse::failure(INTERNAL_ERROR_MESSAGE, None);
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}
