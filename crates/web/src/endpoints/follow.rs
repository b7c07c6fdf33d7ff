//! Subscriptions: the feed and follow/unfollow actions.

use axum::{
    Router,
    extract::{Path, Query, State},
    response::{Html, Redirect},
    routing::get,
};

use crate::{
    error::WebResult,
    extractors::{AuthUser, PageQuery},
    middleware::AppState,
    pages::{self, Ctx},
};

fn profile_url(username: &str) -> String {
    format!("/profile/{username}/")
}

/// Posts by the authors the user follows.
async fn feed(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(query): Query<PageQuery>,
) -> WebResult<Html<String>> {
    let page = state.post_service.feed_page(&user.id, query.number()).await?;
    let ctx = Ctx {
        viewer: Some(&user),
        images: &state.image_service,
    };
    Ok(Html(pages::follow(&page, ctx)))
}

/// Follow an author. Following yourself is silently ignored.
async fn follow(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(username): Path<String>,
) -> WebResult<Redirect> {
    let author = state.user_service.get_by_username(&username).await?;
    if author.id != user.id {
        state.follow_service.follow(&user.id, &author.id).await?;
    }
    Ok(Redirect::to(&profile_url(&author.username)))
}

async fn unfollow(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(username): Path<String>,
) -> WebResult<Redirect> {
    let author = state.user_service.get_by_username(&username).await?;
    state.follow_service.unfollow(&user.id, &author.id).await?;
    Ok(Redirect::to(&profile_url(&author.username)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/follow/", get(feed))
        .route("/profile/{username}/follow", get(follow))
        .route("/profile/{username}/unfollow", get(unfollow))
}
