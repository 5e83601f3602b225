//! Upload size limit
//!
//! Rejects requests that announce a body larger than the configured cap before
//! any of it is read. Bodies without a `Content-Length` are capped while
//! streaming by the router's body limit.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use log::debug;

use crate::error::ServerError;
use crate::server::AppState;

pub async fn enforce_upload_limit(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let limit = state.config.max_upload_bytes;
    let announced = request
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok());

    if let Some(length) = announced
        && length > limit
    {
        debug!(
            "Rejected {} {}: body of {} bytes exceeds limit of {}",
            request.method(),
            request.uri().path(),
            length,
            limit
        );
        return ServerError::PayloadTooLarge(limit).into_response();
    }

    next.run(request).await
}
