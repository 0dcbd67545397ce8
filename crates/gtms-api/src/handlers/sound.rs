//! Notification sound assets.

use std::path::Path as FsPath;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};
use tokio_util::io::ReaderStream;

use gtms_core::error::AppError;
use gtms_entity::notification::NotificationSound;

use crate::error::ApiError;
use crate::state::AppState;

const CACHE_CONTROL: &str = "public, max-age=86400";

/// GET /api/sounds/{filename}
///
/// Only the fixed asset names resolve; anything else is a 404 before the
/// filesystem is touched.
pub async fn get_sound(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let sound = NotificationSound::from_file_name(&filename)
        .ok_or_else(|| AppError::not_found("Sound not found").with_code("SOUND_NOT_FOUND"))?;

    let path = FsPath::new(&state.config.sounds.directory).join(sound.file_name());
    let file = tokio::fs::File::open(&path).await.map_err(|e| {
        tracing::warn!(path = %path.display(), error = %e, "Sound asset unavailable");
        AppError::not_found("Sound not found").with_code("SOUND_NOT_FOUND")
    })?;
    let length = file.metadata().await.ok().map(|m| m.len());

    let mut response = Body::from_stream(ReaderStream::new(file)).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("audio/mpeg"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(CACHE_CONTROL));
    if let Some(len) = length {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
    }
    Ok(response)
}
