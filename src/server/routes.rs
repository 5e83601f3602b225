//! Route table
//!
//! Everything except login, logout and the favicon sits behind the session gate.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::{Request, Response};
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use log::info;
use tower_http::trace::TraceLayer;
use tracing::Span;

use crate::middleware::{enforce_upload_limit, require_session};
use crate::server::AppState;
use crate::server::handlers;

pub fn build_router(state: Arc<AppState>) -> Router {
    let body_limit = usize::try_from(state.config.max_upload_bytes).unwrap_or(usize::MAX);

    let protected = Router::new()
        .route("/", get(handlers::browse_root).post(handlers::upload_root))
        .route("/{*path}", get(handlers::browse).post(handlers::upload))
        .route("/download/{*path}", get(handlers::download))
        .route("/create-folder", post(handlers::create_folder_root))
        .route("/create-folder/{*path}", post(handlers::create_folder))
        .route("/delete/{*path}", post(handlers::delete))
        .route_layer(from_fn_with_state(Arc::clone(&state), require_session));

    let public = Router::new()
        .route("/login", get(handlers::login_page).post(handlers::login))
        .route("/logout", get(handlers::logout))
        .route("/favicon.ico", get(handlers::favicon));

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(from_fn_with_state(Arc::clone(&state), enforce_upload_limit))
        .layer(
            TraceLayer::new_for_http()
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("{} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        "-> {} ({} ms)",
                        response.status().as_u16(),
                        latency.as_millis()
                    );
                }),
        )
        .with_state(state)
}
