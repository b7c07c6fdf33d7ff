//! Application state and request middleware.

#![allow(missing_docs)]

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use yatube_core::{
    CommentService, FollowService, GroupService, ImageService, PostService, UserService,
};

use crate::cache::PageCache;

/// Name of the session cookie.
pub const TOKEN_COOKIE: &str = "yatube_token";

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub post_service: PostService,
    pub group_service: GroupService,
    pub comment_service: CommentService,
    pub follow_service: FollowService,
    pub image_service: ImageService,
    pub page_cache: PageCache,
}

/// Authentication middleware.
///
/// Resolves the session token from the cookie or a bearer header and stores
/// the user in request extensions. Unknown tokens leave the request anonymous.
pub async fn auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let bearer = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string);

    let token = jar
        .get(TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .or(bearer);

    if let Some(token) = token.filter(|t| !t.is_empty()) {
        match state.user_service.authenticate_by_token(&token).await {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(e) if e.is_server_error() => {
                tracing::warn!(error = %e, "Failed to resolve session");
            }
            Err(_) => {}
        }
    }

    next.run(req).await
}
