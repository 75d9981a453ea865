use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};
use towerwatch_api::restful::*;

use crate::errors::ApiError;
use crate::handles::FleetState;

pub fn tower_router(state: FleetState) -> Router {
    Router::new()
        .route("/api/towers/:tower_id/output", post(toggle_output))
        .route("/api/towers/:tower_id/led", post(apply_led))
        .route("/api/towers/:tower_id/ptt", post(press_to_talk))
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/towers/{tower_id}/output",
    tag = "tower",
    params(
        ("tower_id" = String, Path, description = "Tower id or region code with sequence")
    ),
    request_body = OutputRequest,
    responses(
        (status = 200, description = "Output toggled", body = TowerResponse),
        (status = 400, description = "Output index out of range"),
        (status = 404, description = "Tower not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn toggle_output(
    State(state): State<FleetState>,
    Path(tower_id): Path<String>,
    Json(body): Json<OutputRequest>,
) -> Result<Json<TowerResponse>, ApiError> {
    Ok(Json(state.fleet.toggle_output(tower_id, body.index).await?))
}

#[utoipa::path(
    post,
    path = "/api/towers/{tower_id}/led",
    tag = "tower",
    params(
        ("tower_id" = String, Path, description = "Tower anchoring the command target")
    ),
    request_body = LedRequest,
    responses(
        (status = 200, description = "LED state applied", body = LedResponse),
        (status = 400, description = "Missing LED mode"),
        (status = 404, description = "Tower not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn apply_led(
    State(state): State<FleetState>,
    Path(tower_id): Path<String>,
    Json(body): Json<LedRequest>,
) -> Result<Json<LedResponse>, ApiError> {
    Ok(Json(state.fleet.apply_led(tower_id, body).await?))
}

#[utoipa::path(
    post,
    path = "/api/towers/{tower_id}/ptt",
    tag = "tower",
    params(
        ("tower_id" = String, Path, description = "Tower id or region code with sequence")
    ),
    responses(
        (status = 200, description = "Press-to-talk started", body = AckResponse),
        (status = 404, description = "Tower not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn press_to_talk(
    State(state): State<FleetState>,
    Path(tower_id): Path<String>,
) -> Result<Json<AckResponse>, ApiError> {
    Ok(Json(state.fleet.press_to_talk(tower_id).await?))
}
