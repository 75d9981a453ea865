use axum::routing::get;
use axum::{Json, Router};
use towerwatch_api::restful::*;
use towerwatch_api::*;
use utoipa::OpenApi;

use crate::handles::*;

#[derive(OpenApi)]
#[openapi(
    paths(get_state, toggle_output, apply_led, press_to_talk, demo_call),
    components(schemas(
        FleetSnapshot,
        FleetStats,
        Tower,
        GeoPoint,
        LedState,
        Region,
        LogEntry,
        LogKind,
        OutputRequest,
        TowerResponse,
        LedTarget,
        LedRequest,
        LedResponse,
        DemoCallRequest,
        AckResponse
    )),
    tags(
        (name = "fleet", description = "Fleet snapshot"),
        (name = "tower", description = "Direct tower commands"),
        (name = "demo", description = "Demo helpers")
    )
)]
pub struct ApiDoc;

pub fn docs_router() -> Router {
    Router::new().route("/api/openapi.json", get(get_openapi))
}

pub async fn get_openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
