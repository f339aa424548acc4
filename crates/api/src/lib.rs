//! HTTP API layer for circle.
//!
//! - **Endpoints**: auth, users, posts, comments, friends and reactions
//! - **Extractors**: caller identity, JSON bodies and path IDs
//! - **Middleware**: bearer-token resolution
//!
//! Built on Axum 0.8.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

use axum::{Router, middleware::from_fn_with_state};

pub use endpoints::router;
pub use middleware::AppState;

/// The API router with token resolution applied and state attached.
pub fn app(state: AppState) -> Router {
    router()
        .layer(from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ))
        .with_state(state)
}
