//! HTTP server exposing the generators to the level editor

mod routes;

use std::net::SocketAddr;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;

use crate::core::error::{LevelError, Result};

pub fn router() -> Router {
    Router::new()
        .route("/generate", get(routes::generate_get).post(routes::generate_post))
        .route("/connect", post(routes::connect))
        .route("/post-process/walls", post(routes::post_process_walls))
        .route("/post-process/cliff", post(routes::post_process_cliff))
        .route("/health", get(routes::health))
        .route("/rules", get(routes::rules))
        .layer(CorsLayer::permissive())
}

pub async fn serve(addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, router()).await?;
    Ok(())
}

impl IntoResponse for LevelError {
    fn into_response(self) -> Response {
        let status = match &self {
            LevelError::UnknownAlgorithm(_)
            | LevelError::InvalidSiteCount(_)
            | LevelError::DegenerateBounds { .. }
            | LevelError::SerdeError(_) => StatusCode::BAD_REQUEST,
            LevelError::RoomNotFound(_)
            | LevelError::InvalidAddress(_)
            | LevelError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::warn!(error = %self, status = %status, "request failed");
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
