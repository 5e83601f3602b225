//! HTTP server
//!
//! Application state, the listener lifecycle, routing, handlers and page rendering.

pub mod core;
pub mod handlers;
pub mod html;
pub mod routes;

pub use core::{AppState, Server};
pub use routes::build_router;
