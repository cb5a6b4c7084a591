pub mod cloudinary;
pub mod media_repository;
pub mod session;
pub mod storage_adapter;
