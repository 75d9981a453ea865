use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use towerwatch_api::restful::{AckResponse, DemoCallRequest};

use crate::errors::ApiError;
use crate::handles::FleetState;

pub fn demo_router(state: FleetState) -> Router {
    Router::new()
        .route("/api/demo/call", post(demo_call))
        .with_state(state)
}

/// Presses the call button on the given tower, or on a random one when
/// no id (or an empty one) is given.
#[utoipa::path(
    post,
    path = "/api/demo/call",
    tag = "demo",
    request_body(content = DemoCallRequest, description = "Optional exact tower id"),
    responses(
        (status = 200, description = "Call triggered", body = AckResponse),
        (status = 404, description = "Tower not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn demo_call(
    State(state): State<FleetState>,
    body: Option<Json<DemoCallRequest>>,
) -> Result<Json<AckResponse>, ApiError> {
    let tower_id = body
        .and_then(|Json(body)| body.id)
        .filter(|id| !id.is_empty());

    Ok(Json(state.fleet.demo_call(tower_id).await?))
}
