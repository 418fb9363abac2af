//! # Helluo Server
//!
//! HTTP API behind the Helluo Somnia portfolio site.
//!
//! Public routes serve the carnets, portfolio, categories and exhibitions
//! collections. Admin routes, guarded by a bearer password, ingest carnet
//! pages, edit the gallery collections and upload images.
//!
//! Collections live in Redis and images in Cloudinary. In dev mode both can
//! be replaced by the in-memory adapters from `helluo-core`.

pub mod auth;
pub mod handlers;
pub mod infra;
pub mod routes;
pub mod storage;

pub use infra::app_state::AppState;
pub use routes::create_app;
