//! Route handlers

use axum::extract::Query;
use axum::Json;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;

use crate::api::{
    generate_map, generate_procedural_path, CliffPassRequest, CliffPassResponse, ConnectRequest,
    ConnectResponse, GenerateOptions, GenerateRequest, MapResponse, WallPassRequest,
    WallPassResponse,
};
use crate::core::error::LevelError;
use crate::core::types::Bounds;
use crate::geometry::heightmap::{
    generate_cliffs_from_polygon_edges, generate_walls_from_polygon_edges, CliffOptions,
    WallOptions,
};
use crate::rules::schema::rules_schema;

#[derive(Debug, Deserialize)]
pub struct GenerateQuery {
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
    width: Option<f64>,
    height: Option<f64>,
    seed: Option<u64>,
}

pub async fn generate_get(
    Query(query): Query<GenerateQuery>,
) -> Result<Json<MapResponse>, LevelError> {
    let bounds = Bounds {
        x: query.x,
        y: query.y,
        width: query.width.unwrap_or(4800.0),
        height: query.height.unwrap_or(4800.0),
    };
    let options = GenerateOptions { seed: query.seed, ..GenerateOptions::default() };
    Ok(Json(generate_map(bounds, &options)?))
}

pub async fn generate_post(
    Json(request): Json<GenerateRequest>,
) -> Result<Json<MapResponse>, LevelError> {
    Ok(Json(generate_map(request.bounds, &request.options)?))
}

pub async fn connect(Json(request): Json<ConnectRequest>) -> Json<ConnectResponse> {
    let mut rng = match request.options.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };
    if !request.options.existing_objects.is_empty() {
        tracing::debug!(
            existing = request.options.existing_objects.len(),
            "connect ignoring existing objects"
        );
    }
    let objects =
        generate_procedural_path(request.start, request.end, request.options.width, &mut rng);
    Json(ConnectResponse { objects, start: request.start, end: request.end })
}

pub async fn post_process_walls(Json(request): Json<WallPassRequest>) -> Json<WallPassResponse> {
    let options = WallOptions {
        wall_height: request.options.wall_height,
        wall_thickness: request.options.wall_thickness,
    };
    let walls = generate_walls_from_polygon_edges(&request.objects, options);
    Json(WallPassResponse { walls })
}

pub async fn post_process_cliff(Json(request): Json<CliffPassRequest>) -> Json<CliffPassResponse> {
    let options = CliffOptions {
        default_depth: request.options.default_depth,
        min_height_diff: request.options.min_height_diff,
    };
    let cliffs = generate_cliffs_from_polygon_edges(&request.objects, options);
    Json(CliffPassResponse { cliffs })
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn rules() -> Json<serde_json::Value> {
    Json(rules_schema())
}
