use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handles::*;
use crate::services::FleetHandle;

pub fn create_app(fleet: FleetHandle) -> Router {
    let fleet_state = FleetState { fleet };

    Router::new()
        .merge(state_router(fleet_state.clone()))
        .merge(tower_router(fleet_state.clone()))
        .merge(demo_router(fleet_state.clone()))
        .merge(ws_router(fleet_state))
        .merge(docs_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
