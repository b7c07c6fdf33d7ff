//! Post listings, the post page and the post form.

use axum::{
    Form, Router,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use validator::Validate;
use yatube_common::AppError;
use yatube_core::{
    MAX_IMAGE_BYTES,
    forms::{CommentForm, PostForm, field_errors},
};
use yatube_db::entities::user;

use crate::{
    cache::PageCache,
    error::WebResult,
    extractors::{AuthUser, MaybeAuthUser, PageQuery},
    middleware::AppState,
    pages::{self, Ctx, PostFormState},
};

/// Room for the text fields next to the largest accepted image.
const FORM_BODY_LIMIT: usize = MAX_IMAGE_BYTES + 1024 * 1024;

fn ctx<'a>(state: &'a AppState, viewer: &'a MaybeAuthUser) -> Ctx<'a> {
    Ctx {
        viewer: viewer.0.as_ref(),
        images: &state.image_service,
    }
}

fn post_url(post_id: &str) -> String {
    format!("/posts/{post_id}/")
}

/// All posts, newest first. Rendered pages are cached per viewer and page.
async fn index(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Query(query): Query<PageQuery>,
) -> WebResult<Html<String>> {
    let number = query.number();
    let key = PageCache::key(viewer.id(), number);
    if let Some(body) = state.page_cache.get(&key).await {
        tracing::debug!(key = %key, "Index served from cache");
        return Ok(Html(body));
    }

    let page = state.post_service.index_page(number).await?;
    let body = pages::index(&page, ctx(&state, &viewer));
    state.page_cache.insert(key, body.clone()).await;
    Ok(Html(body))
}

async fn group_posts(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> WebResult<Html<String>> {
    let data = state.post_service.group_page(&slug, query.number()).await?;
    Ok(Html(pages::group_list(&data, ctx(&state, &viewer))))
}

async fn profile(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> WebResult<Html<String>> {
    let data = state
        .post_service
        .profile_page(&username, viewer.id(), query.number())
        .await?;
    Ok(Html(pages::profile(&data, ctx(&state, &viewer))))
}

async fn post_detail(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Path(post_id): Path<String>,
) -> WebResult<Html<String>> {
    let view = state.post_service.get_view(&post_id).await?;
    let author_posts = state
        .post_service
        .count_by_author(&view.post.author_id)
        .await?;
    let comments = state.comment_service.list_for_post(&view.post.id).await?;

    Ok(Html(pages::post_detail(
        &view,
        author_posts,
        &comments,
        ctx(&state, &viewer),
    )))
}

/// Read the multipart post form: `text`, `group` and an optional `image` file.
async fn read_post_form(mut multipart: Multipart) -> WebResult<(PostForm, Option<Vec<u8>>)> {
    let mut form = PostForm::default();
    let mut image: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "text" => {
                form.text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
            }
            "group" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                if !text.is_empty() {
                    form.group = Some(text);
                }
            }
            "image" => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                // Browsers send an empty part when no file was chosen.
                if !data.is_empty() {
                    image = Some(data.to_vec());
                }
            }
            _ => {}
        }
    }

    Ok((form, image))
}

/// Validate a submitted post form, store its image and save the post.
///
/// Returns the saved post ID, or the form state to re-render with field
/// errors.
async fn submit(
    state: &AppState,
    author_id: &str,
    form: PostForm,
    image: Option<Vec<u8>>,
    post_id: Option<String>,
) -> WebResult<Result<String, PostFormState>> {
    let mut form_state = PostFormState::from_form(&form, post_id.clone());

    if let Err(errors) = form.validate() {
        form_state.errors = field_errors(&errors);
        return Ok(Err(form_state));
    }

    let image = match image {
        Some(data) => match state.image_service.store_post_image(&data).await {
            Ok(key) => Some(key),
            Err(AppError::Validation(message)) => {
                form_state.errors.insert("image".to_string(), vec![message]);
                return Ok(Err(form_state));
            }
            Err(e) => return Err(e.into()),
        },
        None => None,
    };

    let result = match &post_id {
        Some(id) => state.post_service.edit(id, author_id, form, image).await,
        None => state.post_service.create(author_id, form, image).await,
    };

    match result {
        Ok(post) => Ok(Ok(post.id)),
        // Text was checked above, so this is the group choice.
        Err(AppError::Validation(message)) => {
            form_state.errors.insert("group".to_string(), vec![message]);
            Ok(Err(form_state))
        }
        Err(e) => Err(e.into()),
    }
}

async fn render_form(
    state: &AppState,
    viewer: &user::Model,
    form_state: &PostFormState,
) -> WebResult<Response> {
    let groups = state.group_service.list().await?;
    let ctx = Ctx {
        viewer: Some(viewer),
        images: &state.image_service,
    };
    Ok(Html(pages::create_post(form_state, &groups, ctx)).into_response())
}

async fn create_form(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> WebResult<Response> {
    render_form(&state, &user, &PostFormState::default()).await
}

async fn create_post(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    multipart: Multipart,
) -> WebResult<Response> {
    let (form, image) = read_post_form(multipart).await?;

    match submit(&state, &user.id, form, image, None).await? {
        Ok(_) => Ok(Redirect::to(&format!("/profile/{}/", user.username)).into_response()),
        Err(form_state) => render_form(&state, &user, &form_state).await,
    }
}

async fn edit_form(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(post_id): Path<String>,
) -> WebResult<Response> {
    let post = state.post_service.get(&post_id).await?;
    if post.author_id != user.id {
        return Ok(Redirect::to(&post_url(&post.id)).into_response());
    }

    let form_state = PostFormState {
        text: post.text,
        group: post.group_id,
        post_id: Some(post.id),
        ..PostFormState::default()
    };
    render_form(&state, &user, &form_state).await
}

async fn edit_post(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(post_id): Path<String>,
    multipart: Multipart,
) -> WebResult<Response> {
    let post = state.post_service.get(&post_id).await?;
    if post.author_id != user.id {
        return Ok(Redirect::to(&post_url(&post.id)).into_response());
    }

    let (form, image) = read_post_form(multipart).await?;

    match submit(&state, &user.id, form, image, Some(post.id)).await? {
        Ok(id) => Ok(Redirect::to(&post_url(&id)).into_response()),
        Err(form_state) => render_form(&state, &user, &form_state).await,
    }
}

/// Add a comment. Invalid comments are dropped; the post page is shown either way.
async fn add_comment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(post_id): Path<String>,
    Form(form): Form<CommentForm>,
) -> WebResult<Redirect> {
    match state.comment_service.add(&post_id, &user.id, form).await {
        Ok(_) => {}
        Err(AppError::Validation(message)) => {
            tracing::debug!(post_id = %post_id, reason = %message, "Discarded invalid comment");
        }
        Err(e) => return Err(e.into()),
    }
    Ok(Redirect::to(&post_url(&post_id)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/group/{slug}/", get(group_posts))
        .route("/profile/{username}/", get(profile))
        .route("/posts/{post_id}/", get(post_detail))
        .route(
            "/create/",
            get(create_form)
                .post(create_post)
                .layer(DefaultBodyLimit::max(FORM_BODY_LIMIT)),
        )
        .route(
            "/posts/{post_id}/edit/",
            get(edit_form)
                .post(edit_post)
                .layer(DefaultBodyLimit::max(FORM_BODY_LIMIT)),
        )
        .route("/posts/{post_id}/comment", post(add_comment))
}
