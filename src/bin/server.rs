//! Frame Solver HTTP Server

use anyhow::Context;
use axum::{
    body::Bytes,
    extract::Json,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};

use frame_solver::error::{ErrorKind, FrameError};
use frame_solver::input::{respond, AnalysisResponse};

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn status_for(response: &AnalysisResponse) -> StatusCode {
    match response {
        AnalysisResponse::Success { .. } => StatusCode::OK,
        AnalysisResponse::Error { kind, .. } => match kind {
            ErrorKind::SingularSystem => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::InputValidation | ErrorKind::Geometry => StatusCode::BAD_REQUEST,
            ErrorKind::State => StatusCode::INTERNAL_SERVER_ERROR,
        },
    }
}

// Body is parsed here rather than by the Json extractor so that malformed requests
// get the same error envelope as failed analyses
async fn calculate(body: Bytes) -> impl IntoResponse {
    // The solve is CPU-bound; keep it off the async workers
    let response = match tokio::task::spawn_blocking(move || respond(&body)).await {
        Ok(response) => response,
        Err(e) => {
            log::error!("Analysis task failed: {e}");
            AnalysisResponse::from(Err(FrameError::InvalidInput(format!(
                "analysis aborted: {e}"
            ))))
        }
    };

    if let AnalysisResponse::Error { error, .. } = &response {
        log::warn!("Error processing request: {error}");
    }

    (status_for(&response), Json(response))
}

fn bind_address() -> anyhow::Result<SocketAddr> {
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = match std::env::var("PORT") {
        Ok(port) => port.parse().with_context(|| format!("invalid PORT '{port}'"))?,
        Err(_) => 8000,
    };
    format!("{host}:{port}")
        .parse()
        .with_context(|| format!("invalid HOST '{host}'"))
}


#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/calculate", post(calculate))
        .layer(cors);

    let addr = bind_address()?;
    println!("Frame Solver Server listening on http://{}", addr);
    println!("  Health check: GET  /health");
    println!("  Analysis:     POST /calculate");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await?;
    Ok(())
}
