//! Uploaded image serving.

use axum::{
    Router,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
};
use yatube_core::ImageKind;

use crate::{
    error::{WebError, not_found},
    middleware::AppState,
};

async fn serve(State(state): State<AppState>, Path(key): Path<String>) -> Response {
    match state.image_service.storage().read(&key).await {
        Ok(Some(data)) => {
            let content_type =
                ImageKind::detect(&data).map_or("application/octet-stream", ImageKind::mime_type);
            ([(header::CONTENT_TYPE, content_type)], data).into_response()
        }
        Ok(None) => not_found(),
        // Keys that escape the media root are treated as missing.
        Err(e) if !e.is_server_error() => not_found(),
        Err(e) => WebError(e).into_response(),
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/media/{*key}", get(serve))
}
