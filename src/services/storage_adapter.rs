//! src/services/storage_adapter.rs
//!
//! Media storage adapter. Sits between the media endpoints and a
//! `RemoteMediaStore`: derives the remote key from the uploaded filename,
//! forwards the buffer, and rewrites the in-flight `FileRecord` with what the
//! remote host reports. Local file serving is disabled; every asset is
//! addressed through its delivery URL instead.

use crate::{
    models::file::FileRecord,
    services::cloudinary::{RemoteError, RemoteMediaStore},
};
use axum::{
    body::Body,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::{fmt, str::FromStr, sync::Arc};
use thiserror::Error;
use tracing::{debug, error};

/// Folder on the remote host that holds every media asset.
pub const MEDIA_NAMESPACE: &str = "media";

/// Resource type assumed for rows the remote host never classified.
pub const DEFAULT_RESOURCE_TYPE: &str = "image";

/// What to do when the remote host rejects an upload or delete.
///
/// `Ignore` logs the failure and reports success to the caller, so the media
/// row is still written with its original filename. `Propagate` returns the
/// error and the request fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OnUploadFailure {
    #[default]
    Ignore,
    Propagate,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown failure policy `{0}` (expected `ignore` or `propagate`)")]
pub struct ParsePolicyError(String);

impl FromStr for OnUploadFailure {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ignore" => Ok(Self::Ignore),
            "propagate" => Ok(Self::Propagate),
            other => Err(ParsePolicyError(other.to_string())),
        }
    }
}

impl fmt::Display for OnUploadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ignore => f.write_str("ignore"),
            Self::Propagate => f.write_str("propagate"),
        }
    }
}

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("upload of `{filename}` failed: {source}")]
    Upload {
        filename: String,
        #[source]
        source: RemoteError,
    },
    #[error("delete of `{key}` failed: {source}")]
    Delete {
        key: String,
        #[source]
        source: RemoteError,
    },
}

pub type AdapterResult<T> = Result<T, AdapterError>;

#[derive(Clone)]
pub struct MediaStorageAdapter {
    store: Arc<dyn RemoteMediaStore>,
    on_failure: OnUploadFailure,
    /// Prefix for delivery URLs, without trailing slash.
    delivery_root: String,
}

impl MediaStorageAdapter {
    pub fn new(
        store: Arc<dyn RemoteMediaStore>,
        on_failure: OnUploadFailure,
        delivery_root: impl Into<String>,
    ) -> Self {
        Self {
            store,
            on_failure,
            delivery_root: delivery_root.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn on_failure(&self) -> OnUploadFailure {
        self.on_failure
    }

    /// Upload the record's buffer and adopt the remote identity on success.
    ///
    /// The record is only rewritten once the remote host has answered with an
    /// asset; on failure it keeps its original values.
    pub async fn handle_upload(&self, file: &mut FileRecord) -> AdapterResult<()> {
        let key = remote_key(&file.filename);
        match self.store.upload(file.buffer.clone(), &key).await {
            Ok(asset) => {
                debug!(
                    "stored {} as {} {} at {}",
                    file.filename, asset.resource_type, asset.public_id, asset.secure_url
                );
                file.filename = asset.public_id;
                file.mime_type = asset.format;
                file.filesize = asset.bytes;
                file.url = Some(asset.secure_url).filter(|u| !u.is_empty());
                file.resource_type = Some(asset.resource_type).filter(|t| !t.is_empty());
                Ok(())
            }
            Err(source) => self.settle(AdapterError::Upload {
                filename: file.filename.clone(),
                source,
            }),
        }
    }

    /// Delete the remote image that backs `filename`.
    pub async fn handle_delete(&self, filename: &str) -> AdapterResult<()> {
        self.handle_delete_as(filename, DEFAULT_RESOURCE_TYPE).await
    }

    /// Delete the remote asset that backs `filename`, stored as `resource_type`.
    pub async fn handle_delete_as(&self, filename: &str, resource_type: &str) -> AdapterResult<()> {
        let key = remote_key(filename);
        debug!("deleting remote {} {}", resource_type, key);
        match self.store.delete(&key, resource_type).await {
            Ok(()) => Ok(()),
            Err(source) => self.settle(AdapterError::Delete { key, source }),
        }
    }

    /// Direct file serving is disabled; assets are served by the remote host.
    pub fn static_handler() -> Response {
        (StatusCode::NOT_IMPLEMENTED, Body::empty()).into_response()
    }

    /// Public delivery URL for a stored filename, assuming an image asset.
    pub fn generate_file_url(&self, filename: &str) -> String {
        format!("{}/{}", self.delivery_root, namespaced(filename))
    }

    /// URL reported by the remote host, or a generated one when the upload
    /// never reached it.
    pub fn file_url(&self, file: &FileRecord) -> String {
        file.url
            .clone()
            .unwrap_or_else(|| self.generate_file_url(&file.filename))
    }

    fn settle(&self, err: AdapterError) -> AdapterResult<()> {
        match self.on_failure {
            OnUploadFailure::Ignore => {
                error!("media storage error (ignored): {}", err);
                Ok(())
            }
            OnUploadFailure::Propagate => Err(err),
        }
    }
}

/// Remove a trailing `.ext`, where `ext` is non-empty and has no `/` or `.`.
pub fn strip_extension(filename: &str) -> &str {
    match filename.rfind('.') {
        Some(pos) if pos + 1 < filename.len() && !filename[pos + 1..].contains('/') => {
            &filename[..pos]
        }
        _ => filename,
    }
}

/// Prefix `name` with the media namespace unless it already carries it.
fn namespaced(name: &str) -> String {
    let prefix = format!("{}/", MEDIA_NAMESPACE);
    if name.starts_with(&prefix) {
        name.to_string()
    } else {
        format!("{}{}", prefix, name)
    }
}

/// Remote key for a filename: `media/<filename without extension>`.
///
/// A name already under the media namespace is a remote identifier and is
/// used verbatim; its dots are part of the id, not an extension.
pub fn remote_key(filename: &str) -> String {
    if filename.starts_with(&format!("{}/", MEDIA_NAMESPACE)) {
        filename.to_string()
    } else {
        namespaced(strip_extension(filename))
    }
}
