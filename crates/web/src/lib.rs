//! HTTP layer for yatube-rs.
//!
//! - **Endpoints**: server-rendered pages for posts, groups, profiles,
//!   subscriptions and sessions
//! - **Extractors**: authenticated user, optional viewer, page number
//! - **Middleware**: session resolution from cookie or bearer token
//! - **Cache**: short-lived cache for the index page
//!
//! Built on Axum 0.8.

pub mod cache;
pub mod endpoints;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod pages;

use axum::{Router, middleware::from_fn_with_state};

pub use cache::PageCache;
pub use error::{WebError, WebResult};
pub use middleware::{AppState, TOKEN_COOKIE, auth_middleware};

/// Build the application router with its state and session middleware.
pub fn router(state: AppState) -> Router {
    endpoints::router()
        .fallback(error::fallback)
        .layer(from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
