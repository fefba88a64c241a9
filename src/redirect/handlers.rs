use axum::{
    http::{header::LOCATION, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use super::destination::Destination;
use crate::tee::Tee;

pub struct ShimState {
    /// `None` when mirroring is disabled
    pub tee: Option<Arc<Tee>>,
}

/// 302 Found pointing at the new site.
pub fn redirect_response(destination: &Destination) -> Response {
    match HeaderValue::try_from(destination.to_string()) {
        Ok(location) => (StatusCode::FOUND, [(LOCATION, location)]).into_response(),
        Err(err) => {
            tracing::error!(destination = %destination, error = %err, "destination is not a valid header value");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    #[derive(Serialize)]
    struct HealthResponse {
        status: String,
    }

    Json(HealthResponse {
        status: "OK".to_string(),
    })
}
