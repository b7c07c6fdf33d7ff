//! HTML error responses.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use yatube_common::AppError;

use crate::{extractors::LOGIN_URL, pages};

/// Handler result type.
pub type WebResult<T> = Result<T, WebError>;

/// An [`AppError`] rendered as a page.
#[derive(Debug)]
pub struct WebError(pub AppError);

impl From<AppError> for WebError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let err = self.0;
        let code = err.error_code();

        // Log server errors
        if err.is_server_error() {
            tracing::error!(error = %err, code = code, "Server error occurred");
        } else {
            tracing::debug!(error = %err, code = code, "Client error occurred");
        }

        if err.is_not_found() {
            return not_found();
        }

        match err {
            AppError::Unauthorized => Redirect::to(LOGIN_URL).into_response(),
            AppError::Forbidden(_) => {
                (StatusCode::FORBIDDEN, Html(pages::forbidden())).into_response()
            }
            AppError::BadRequest(_) | AppError::Validation(_) | AppError::Conflict(_) => {
                (err.status_code(), Html(pages::bad_request(&err.to_string()))).into_response()
            }
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(pages::server_error()),
            )
                .into_response(),
        }
    }
}

/// The not-found page.
#[must_use]
pub fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Html(pages::not_found())).into_response()
}

/// Fallback handler for unmatched routes.
pub async fn fallback() -> Response {
    not_found()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;

    #[test]
    fn test_not_found_variants_render_404() {
        let response = WebError(AppError::GroupNotFound("cats".into())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_unauthorized_redirects_to_login() {
        let response = WebError(AppError::Unauthorized).into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], LOGIN_URL);
    }

    #[test]
    fn test_database_error_renders_500() {
        let response = WebError(AppError::Database("gone".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
