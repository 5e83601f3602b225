//! Session gate
//!
//! Wraps every filesystem route: requests without a live session are sent to
//! the login page and the wrapped handler never runs.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;
use log::debug;

use crate::error::{AuthError, ServerError};
use crate::server::AppState;

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "session";

/// Username of the authenticated caller, attached to the request by [`require_session`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(pub String);

/// Looks up the session cookie and either runs the handler or redirects to `/login`
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let username = match jar.get(SESSION_COOKIE) {
        Some(cookie) => state.sessions.lookup(cookie.value()).await,
        None => None,
    };

    match username {
        Some(username) => {
            request.extensions_mut().insert(CurrentUser(username));
            next.run(request).await
        }
        None => {
            debug!(
                "Unauthenticated {} {} redirected to login",
                request.method(),
                request.uri().path()
            );
            ServerError::Auth(AuthError::NotLoggedIn).into_response()
        }
    }
}
