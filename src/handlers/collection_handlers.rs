//! Read-only access to the collection definitions.

use crate::{
    errors::AppError,
    models::collection::{self, CollectionConfig},
};
use axum::{Json, extract::Path};

/// `GET /api/collections`
pub async fn list_collections() -> Json<Vec<CollectionConfig>> {
    Json(collection::all())
}

/// `GET /api/collections/{slug}`
pub async fn get_collection(Path(slug): Path<String>) -> Result<Json<CollectionConfig>, AppError> {
    collection::by_slug(&slug)
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("collection `{}` not found", slug)))
}
