//! Represents an uploaded file while its request is in flight.

use bytes::Bytes;

/// An uploaded asset before it is persisted.
///
/// Built from the multipart body, rewritten once by the storage adapter after
/// the remote host confirms the upload, then stored as a media row.
#[derive(Clone, Debug, PartialEq)]
pub struct FileRecord {
    /// Raw payload, held fully in memory.
    pub buffer: Bytes,

    /// Original filename, or the remote identifier after a successful upload.
    pub filename: String,

    /// Declared MIME type, or the remote-reported format after upload.
    pub mime_type: String,

    /// Size in bytes.
    pub filesize: i64,

    /// Delivery URL reported by the remote host.
    pub url: Option<String>,

    /// Remote resource class (`image`, `video`, `raw`).
    pub resource_type: Option<String>,
}

impl FileRecord {
    pub fn new(buffer: Bytes, filename: impl Into<String>, mime_type: impl Into<String>) -> Self {
        let filesize = buffer.len() as i64;
        Self {
            buffer,
            filename: filename.into(),
            mime_type: mime_type.into(),
            filesize,
            url: None,
            resource_type: None,
        }
    }
}
