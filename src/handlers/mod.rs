pub mod collection_handlers;
pub mod health_handlers;
pub mod landing_handlers;
pub mod media_handlers;
