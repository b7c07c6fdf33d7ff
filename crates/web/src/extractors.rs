//! Request extractors.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use yatube_core::PageNumber;
use yatube_db::entities::user;

/// Login page path.
pub const LOGIN_URL: &str = "/auth/login/";

/// Login URL that sends the user back to `next` afterwards.
#[must_use]
pub fn login_url(next: &str) -> String {
    let encoded = urlencoding::encode(next).replace("%2F", "/");
    format!("{LOGIN_URL}?next={encoded}")
}

/// Authenticated user extractor.
///
/// Anonymous requests are redirected to the login page.
#[derive(Debug, Clone)]
pub struct AuthUser(pub user::Model);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get user from request extensions (set by auth middleware)
        parts
            .extensions
            .get::<user::Model>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| {
                let next = parts
                    .uri
                    .path_and_query()
                    .map_or_else(|| parts.uri.path(), |pq| pq.as_str());
                Redirect::to(&login_url(next)).into_response()
            })
    }
}

/// Optional authenticated user extractor.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<user::Model>);

impl MaybeAuthUser {
    /// The viewer's user ID, if logged in.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.0.as_ref().map(|u| u.id.as_str())
    }
}

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<user::Model>().cloned()))
    }
}

/// The `?page=` query parameter. Anything unparsable means page 1.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    /// The requested page number.
    #[must_use]
    pub fn number(&self) -> PageNumber {
        PageNumber::parse(self.page.as_deref())
    }
}
