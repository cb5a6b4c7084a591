//! src/services/media_repository.rs
//!
//! Postgres persistence for media documents. Payloads never touch this layer;
//! rows only carry the metadata the storage adapter settled on.

use crate::models::media::{MediaDoc, NewMedia};
use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("media `{0}` not found")]
    NotFound(Uuid),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type MediaResult<T> = Result<T, MediaError>;

const MEDIA_COLUMNS: &str =
    "id, alt, filename, mime_type, filesize, url, resource_type, created_at, updated_at";

#[derive(Clone)]
pub struct MediaRepository {
    pub db: Arc<PgPool>,
}

impl MediaRepository {
    pub fn new(db: Arc<PgPool>) -> Self {
        Self { db }
    }

    pub async fn insert(&self, media: NewMedia) -> MediaResult<MediaDoc> {
        let now = Utc::now();
        let doc = sqlx::query_as::<_, MediaDoc>(&format!(
            "INSERT INTO media ({MEDIA_COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
             RETURNING {MEDIA_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&media.alt)
        .bind(&media.filename)
        .bind(&media.mime_type)
        .bind(media.filesize)
        .bind(&media.url)
        .bind(&media.resource_type)
        .bind(now)
        .fetch_one(&*self.db)
        .await?;
        Ok(doc)
    }

    /// Fetch a media row by id.
    ///
    /// Returns NotFound if missing.
    pub async fn find(&self, id: Uuid) -> MediaResult<MediaDoc> {
        sqlx::query_as::<_, MediaDoc>(&format!(
            "SELECT {MEDIA_COLUMNS} FROM media WHERE id = $1"
        ))
        .bind(id)
        .fetch_one(&*self.db)
        .await
        .map_err(|err| match err {
            sqlx::Error::RowNotFound => MediaError::NotFound(id),
            other => MediaError::Sqlx(other),
        })
    }

    pub async fn delete(&self, id: Uuid) -> MediaResult<()> {
        let result = sqlx::query("DELETE FROM media WHERE id = $1")
            .bind(id)
            .execute(&*self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(MediaError::NotFound(id));
        }
        Ok(())
    }
}
