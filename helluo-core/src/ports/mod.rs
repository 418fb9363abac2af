//! Boundaries to the hosted services the site depends on.
//!
//! Services receive these as `Arc<dyn ...>` at construction time; the host
//! process owns the concrete clients.

mod collections;
mod images;

pub use collections::{CollectionKeys, CollectionStore, load_collection, save_collection};
pub use images::{ImageStore, ImageUpload, UploadedImage};
