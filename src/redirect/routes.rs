use axum::{extract::DefaultBodyLimit, middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::tee::Tee;
use crate::upstream::{proxy_handler, LegacyUpstream, MAX_BODY_BYTES};

use super::handlers::{health_check, ShimState};
use super::middleware::{migration_shim, record_request_start};

/// Router serving the legacy site from `upstream` behind the shim.
pub fn create_shim_router(upstream: Arc<LegacyUpstream>, tee: Option<Arc<Tee>>) -> Router {
    let legacy = Router::new()
        .fallback(proxy_handler)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(upstream);
    create_shim_router_with(legacy, tee)
}

/// Put the shim in front of an arbitrary legacy router.
pub fn create_shim_router_with(legacy: Router, tee: Option<Arc<Tee>>) -> Router {
    let state = Arc::new(ShimState { tee });

    let shimmed = legacy
        .layer(middleware::from_fn_with_state(state, migration_shim))
        .layer(middleware::from_fn(record_request_start));

    Router::new()
        .route("/healthz", get(health_check))
        .fallback_service(shimmed)
        .layer(TraceLayer::new_for_http())
}
