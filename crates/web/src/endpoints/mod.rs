//! Page endpoints.

mod auth;
mod follow;
mod media;
mod posts;

use axum::Router;

use crate::middleware::AppState;

/// Create the page router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(posts::router())
        .merge(follow::router())
        .merge(auth::router())
        .merge(media::router())
}
