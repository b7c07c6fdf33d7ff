//! Signup, login and logout pages.

use axum::{
    Form, Router,
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use validator::Validate;
use yatube_common::AppError;
use yatube_core::forms::{FieldErrors, LoginForm, SignupForm, field_errors};
use yatube_db::entities::user;

use crate::{
    error::WebResult,
    extractors::MaybeAuthUser,
    middleware::{AppState, TOKEN_COOKIE},
    pages,
};

const INVALID_LOGIN_MESSAGE: &str =
    "Пожалуйста, введите правильные имя пользователя и пароль. Оба поля могут быть чувствительны к регистру.";

#[derive(Debug, Default, Deserialize)]
struct NextQuery {
    next: Option<String>,
}

/// A local path to continue to after login; anything else falls back to `/`.
fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path
        }
        _ => "/",
    }
}

fn session_cookie(user: &user::Model) -> WebResult<Cookie<'static>> {
    let token = user
        .token
        .clone()
        .ok_or_else(|| AppError::Internal("User has no session token".to_string()))?;

    Ok(Cookie::build((TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build())
}

async fn signup_form() -> Html<String> {
    Html(pages::signup(&SignupForm::default(), &FieldErrors::new()))
}

async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<SignupForm>,
) -> WebResult<Response> {
    if let Err(errors) = form.validate() {
        return Ok(Html(pages::signup(&form, &field_errors(&errors))).into_response());
    }

    let shown = SignupForm {
        password: String::new(),
        password_confirmation: String::new(),
        ..form.clone()
    };

    match state.user_service.signup(form).await {
        Ok(user) => {
            let cookie = session_cookie(&user)?;
            Ok((jar.add(cookie), Redirect::to("/")).into_response())
        }
        Err(AppError::Conflict(message)) => {
            let mut errors = FieldErrors::new();
            errors.insert("username".to_string(), vec![message]);
            Ok(Html(pages::signup(&shown, &errors)).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

async fn login_form(Query(query): Query<NextQuery>) -> Html<String> {
    let form = LoginForm {
        next: query.next,
        ..LoginForm::default()
    };
    Html(pages::login(&form, &FieldErrors::new(), &[]))
}

async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> WebResult<Response> {
    if let Err(errors) = form.validate() {
        return Ok(Html(pages::login(&form, &field_errors(&errors), &[])).into_response());
    }

    match state.user_service.login(&form).await {
        Ok(user) => {
            tracing::debug!(user_id = %user.id, "User logged in");
            let cookie = session_cookie(&user)?;
            let next = safe_next(form.next.as_deref());
            Ok((jar.add(cookie), Redirect::to(next)).into_response())
        }
        Err(AppError::Unauthorized) => {
            let shown = LoginForm {
                password: String::new(),
                ..form
            };
            let errors = [INVALID_LOGIN_MESSAGE.to_string()];
            Ok(Html(pages::login(&shown, &FieldErrors::new(), &errors)).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// End the session. Rotating the token also ends sessions on other devices.
async fn logout(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    jar: CookieJar,
) -> WebResult<Response> {
    if let Some(user) = &viewer.0 {
        state.user_service.logout(&user.id).await?;
    }
    let jar = jar.remove(Cookie::build(TOKEN_COOKIE).path("/"));
    Ok((jar, Redirect::to("/")).into_response())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/signup/", get(signup_form).post(signup))
        .route("/auth/login/", get(login_form).post(login))
        .route("/auth/logout/", get(logout).post(logout))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_next_accepts_local_paths_only() {
        assert_eq!(safe_next(Some("/create/")), "/create/");
        assert_eq!(safe_next(Some("/follow/?page=2")), "/follow/?page=2");
        assert_eq!(safe_next(Some("//evil.example/")), "/");
        assert_eq!(safe_next(Some("https://evil.example/")), "/");
        assert_eq!(safe_next(Some("/\\evil.example")), "/");
        assert_eq!(safe_next(None), "/");
    }
}
