//! Adapters for the hosted services behind the core storage ports.

pub mod cloudinary;
pub mod redis_store;

pub use cloudinary::CloudinaryImageStore;
pub use redis_store::RedisCollectionStore;
