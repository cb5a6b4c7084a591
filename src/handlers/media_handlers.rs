//! HTTP handlers for the `media` collection.
//! Uploads are buffered in memory, handed to the storage adapter, and only
//! then written as a media row with whatever identity the adapter settled on.

use crate::{
    errors::AppError,
    models::{
        collection,
        file::FileRecord,
        media::{MediaDoc, NewMedia},
    },
    services::storage_adapter::{DEFAULT_RESOURCE_TYPE, MediaStorageAdapter},
    state::AppState,
};
use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use std::collections::HashMap;
use uuid::Uuid;

const FILE_FIELD: &str = "file";

/// `POST /api/media` — multipart body with a `file` part plus the media fields.
pub async fn upload_media(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut file: Option<FileRecord> = None;
    let mut fields: HashMap<String, String> = HashMap::new();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        if name == FILE_FIELD {
            let filename = field
                .file_name()
                .map(str::to_string)
                .filter(|f| !f.is_empty())
                .ok_or_else(|| AppError::bad_request("`file` part has no filename"))?;
            let mime_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let buffer: Bytes = field.bytes().await?;
            file = Some(FileRecord::new(buffer, filename, mime_type));
        } else {
            fields.insert(name, field.text().await?);
        }
    }

    let mut file = file.ok_or_else(|| AppError::bad_request("missing `file` field"))?;
    for required in collection::media().required_fields() {
        let present = fields
            .get(required.name)
            .is_some_and(|v| !v.trim().is_empty());
        if !present {
            return Err(AppError::bad_request(format!(
                "missing required field `{}`",
                required.name
            )));
        }
    }

    state.adapter.handle_upload(&mut file).await?;

    let doc = state
        .media
        .insert(NewMedia {
            alt: fields.remove("alt").unwrap_or_default(),
            url: state.adapter.file_url(&file),
            resource_type: file
                .resource_type
                .unwrap_or_else(|| DEFAULT_RESOURCE_TYPE.to_string()),
            filename: file.filename,
            mime_type: file.mime_type,
            filesize: file.filesize,
        })
        .await?;

    tracing::info!("created media {} ({})", doc.id, doc.filename);
    Ok((StatusCode::CREATED, Json(doc)))
}

/// `GET /api/media/{id}`
pub async fn get_media(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MediaDoc>, AppError> {
    Ok(Json(state.media.find(id).await?))
}

/// `DELETE /api/media/{id}` — remove the remote asset, then the row.
pub async fn delete_media(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MediaDoc>, AppError> {
    let doc = state.media.find(id).await?;
    state
        .adapter
        .handle_delete_as(&doc.filename, &doc.resource_type)
        .await?;
    state.media.delete(id).await?;

    tracing::info!("deleted media {} ({})", doc.id, doc.filename);
    Ok(Json(doc))
}

/// `GET /api/media/file/{filename}` — local serving is disabled.
pub async fn serve_media_file(Path(_filename): Path<String>) -> Response {
    MediaStorageAdapter::static_handler()
}
