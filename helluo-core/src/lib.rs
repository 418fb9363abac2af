//! # Helluo Core
//!
//! Domain logic behind the Helluo Somnia portfolio site.
//!
//! - **Carnets**: digitized sketchbooks ingested from batches of uploaded
//!   page images named `C.<carnet>.<page>`.
//! - **Gallery**: portfolio pieces, their categories and the exhibitions
//!   timeline.
//!
//! Persistence and image hosting live behind the [`ports`] traits. The server
//! crate wires Redis and Cloudinary adapters in; [`infra::memory`] provides
//! in-process adapters for development and tests.

pub mod api;
pub mod carnet;
pub mod error;
pub mod gallery;
pub mod infra;
pub mod model;
pub mod ports;

pub use carnet::{
    CarnetCoordinate, CarnetService, FileOutcome, IncomingFile, IngestReport,
    parse_carnet_filename,
};
pub use error::{GalleryError, Result};
pub use gallery::{CategoryService, ExhibitionService, PortfolioService};
pub use model::{
    Carnet, CarnetPage, Category, Exhibition, PortfolioItem,
};
pub use ports::{CollectionKeys, CollectionStore, ImageStore, ImageUpload, UploadedImage};
