//! Declarative collection definitions: `users`, `media`, `posts`.
//!
//! These are plain data. They are loaded once at start-up and served
//! read-only; the media upload path also consults them for required fields.

use serde::Serialize;

pub const USERS_SLUG: &str = "users";
pub const MEDIA_SLUG: &str = "media";
pub const POSTS_SLUG: &str = "posts";

/// The storage type of a field.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    Text,
    Textarea,
    Email,
    RichText,
    Date,
    Upload,
    Relationship,
}

/// A single field in a collection.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    pub required: bool,
    /// Target collection slug for `upload` and `relationship` fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relation_to: Option<&'static str>,
}

impl Field {
    fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            relation_to: None,
        }
    }

    fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn relation(mut self, slug: &'static str) -> Self {
        self.relation_to = Some(slug);
        self
    }
}

/// A collection definition.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CollectionConfig {
    pub slug: &'static str,
    /// Field used as the document title in the admin UI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_as_title: Option<&'static str>,
    /// Whether documents can authenticate (email + password).
    pub auth: bool,
    /// Whether documents carry an uploaded file.
    pub upload: bool,
    /// Whether anonymous reads are allowed.
    pub public_read: bool,
    pub fields: Vec<Field>,
}

impl CollectionConfig {
    pub fn required_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.required)
    }
}

pub fn users() -> CollectionConfig {
    CollectionConfig {
        slug: USERS_SLUG,
        use_as_title: Some("email"),
        auth: true,
        upload: false,
        public_read: false,
        fields: vec![Field::new("email", FieldKind::Email).required()],
    }
}

pub fn media() -> CollectionConfig {
    CollectionConfig {
        slug: MEDIA_SLUG,
        use_as_title: None,
        auth: false,
        upload: true,
        public_read: true,
        fields: vec![Field::new("alt", FieldKind::Text).required()],
    }
}

pub fn posts() -> CollectionConfig {
    CollectionConfig {
        slug: POSTS_SLUG,
        use_as_title: Some("title"),
        auth: false,
        upload: false,
        public_read: true,
        fields: vec![
            Field::new("title", FieldKind::Text).required(),
            Field::new("slug", FieldKind::Text).required(),
            Field::new("excerpt", FieldKind::Textarea),
            Field::new("content", FieldKind::RichText).required(),
            Field::new("coverImage", FieldKind::Upload).relation(MEDIA_SLUG),
            Field::new("author", FieldKind::Relationship).relation(USERS_SLUG),
            Field::new("publishedAt", FieldKind::Date),
        ],
    }
}

/// All collections in registration order.
pub fn all() -> Vec<CollectionConfig> {
    vec![users(), media(), posts()]
}

pub fn by_slug(slug: &str) -> Option<CollectionConfig> {
    all().into_iter().find(|c| c.slug == slug)
}
