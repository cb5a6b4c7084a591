//! Core data models for the CMS service.
//!
//! Collections are static declarations; media rows map to the `media` table
//! via `sqlx::FromRow` and serialize as JSON via `serde`.

pub mod collection;
pub mod file;
pub mod media;
pub mod user;
