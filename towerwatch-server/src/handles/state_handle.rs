use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use towerwatch_api::FleetSnapshot;

use crate::errors::ApiError;
use crate::handles::FleetState;

pub fn state_router(state: FleetState) -> Router {
    Router::new()
        .route("/api/state", get(get_state))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/state",
    tag = "fleet",
    responses(
        (status = 200, description = "Full fleet snapshot", body = FleetSnapshot),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_state(State(state): State<FleetState>) -> Result<Json<FleetSnapshot>, ApiError> {
    Ok(Json(state.fleet.snapshot().await?))
}
