//! Represents a persisted media document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A row in the `media` collection.
///
/// Only metadata lives here; the payload itself is hosted remotely and
/// addressed through `url`.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MediaDoc {
    pub id: Uuid,

    /// Alternative text shown in place of the image.
    pub alt: String,

    /// Remote identifier (e.g. `media/logo`).
    pub filename: String,

    pub mime_type: String,

    /// Size in bytes.
    pub filesize: i64,

    /// Public delivery URL.
    pub url: String,

    /// Remote resource class, needed to address the asset on delete.
    pub resource_type: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating a media row.
#[derive(Clone, Debug)]
pub struct NewMedia {
    pub alt: String,
    pub filename: String,
    pub mime_type: String,
    pub filesize: i64,
    pub url: String,
    pub resource_type: String,
}
