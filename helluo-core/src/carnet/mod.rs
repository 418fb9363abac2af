//! Carnet ingestion: filename parsing, page merging and cascading deletes.

mod filename;
mod service;

pub use filename::{CarnetCoordinate, parse_carnet_filename};
pub use service::{
    CarnetService, FileOutcome, INVALID_FILENAME_MESSAGE, IncomingFile,
    IngestReport, MAX_TITLE_LEN, UPLOAD_FAILED_MESSAGE,
};
