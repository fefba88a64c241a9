use axum::{
    body::Body,
    extract::{Request, State},
    http::header::SET_COOKIE,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;

use super::handlers::{redirect_response, ShimState};
use super::resolver::{resolve, RedirectDecision};
use crate::tee::is_robot;

#[derive(Copy, Clone)]
pub struct RequestStart(pub Instant);

pub async fn record_request_start(mut request: Request<Body>, next: Next) -> Response {
    request
        .extensions_mut()
        .insert(RequestStart(Instant::now()));
    next.run(request).await
}

/// Redirect opted-in visitors to the new site, serve everyone else from the
/// inner service, then mirror the served request to the collector.
pub async fn migration_shim(
    State(state): State<Arc<ShimState>>,
    request: Request,
    next: Next,
) -> Response {
    let start = request
        .extensions()
        .get::<RequestStart>()
        .map(|RequestStart(start)| *start)
        .unwrap_or_else(Instant::now);
    let uri = request.uri().clone();
    let headers = request.headers().clone();

    let decision = resolve(&uri, &headers);

    let mut response = match &decision {
        RedirectDecision::Redirect { destination, .. } => {
            tracing::debug!(path = %uri.path(), destination = %destination, "redirecting to new site");
            redirect_response(destination)
        }
        RedirectDecision::Stay { .. } => next.run(request).await,
    };

    if let Some(update) = decision.cookie() {
        response
            .headers_mut()
            .append(SET_COOKIE, update.header_value());
    }

    if let Some(tee) = &state.tee {
        tee.mirror(
            &uri,
            &headers,
            start.elapsed(),
            is_robot(&headers),
            response.status(),
        );
    }

    response
}
