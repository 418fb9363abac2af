use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::filename::parse_carnet_filename;
use crate::model::{Carnet, CarnetPage};
use crate::ports::{
    CollectionKeys, CollectionStore, ImageStore, ImageUpload, load_collection,
    save_collection,
};
use crate::{GalleryError, Result};

pub const MAX_TITLE_LEN: usize = 200;

pub const INVALID_FILENAME_MESSAGE: &str =
    "Invalid filename format. Expected C.X.Y (e.g., C.1.2)";
pub const UPLOAD_FAILED_MESSAGE: &str = "Upload to image store failed";

/// A file received as part of an ingestion batch.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl IncomingFile {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }
}

/// What happened to one file of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileOutcome {
    pub filename: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileOutcome {
    fn ok(filename: &str) -> Self {
        Self {
            filename: filename.to_string(),
            success: true,
            error: None,
        }
    }

    fn failed(filename: &str, error: &str) -> Self {
        Self {
            filename: filename.to_string(),
            success: false,
            error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub uploaded: usize,
    pub total: usize,
    pub results: Vec<FileOutcome>,
    pub carnets: Vec<Carnet>,
}

/// Ingests page images into carnets and maintains the carnet collection.
///
/// Every operation reads the whole collection, mutates it in memory and
/// writes it back once. Nothing is cached between calls.
pub struct CarnetService {
    store: Arc<dyn CollectionStore>,
    images: Arc<dyn ImageStore>,
    folder: String,
}

impl fmt::Debug for CarnetService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CarnetService")
            .field("folder", &self.folder)
            .finish_non_exhaustive()
    }
}

impl CarnetService {
    pub fn new(
        store: Arc<dyn CollectionStore>,
        images: Arc<dyn ImageStore>,
        folder: impl Into<String>,
    ) -> Self {
        Self {
            store,
            images,
            folder: folder.into(),
        }
    }

    /// All carnets, ascending by number.
    pub async fn list_carnets(&self) -> Result<Vec<Carnet>> {
        self.load().await
    }

    /// Uploads each file of the batch and folds it into its carnet.
    ///
    /// Files are handled one at a time in submission order. A file whose name
    /// does not parse or whose upload fails is reported and skipped; later
    /// files of the batch still run. The collection is written once at the
    /// end, so a failing final write loses the whole batch from the
    /// collection while its images stay uploaded.
    pub async fn ingest(&self, files: Vec<IncomingFile>) -> Result<IngestReport> {
        if files.is_empty() {
            return Err(GalleryError::validation("No files provided"));
        }

        let mut shelf: BTreeMap<u32, Carnet> = self
            .load()
            .await?
            .into_iter()
            .map(|carnet| (carnet.number, carnet))
            .collect();

        let total = files.len();
        let mut results = Vec::with_capacity(total);

        for file in &files {
            let Some(coordinate) = parse_carnet_filename(&file.filename) else {
                debug!(filename = %file.filename, "rejected carnet filename");
                results.push(FileOutcome::failed(
                    &file.filename,
                    INVALID_FILENAME_MESSAGE,
                ));
                continue;
            };

            let uploaded = match self
                .images
                .upload(ImageUpload {
                    bytes: &file.bytes,
                    content_type: &file.content_type,
                    folder: &self.folder,
                    filename: Some(&file.filename),
                })
                .await
            {
                Ok(uploaded) => uploaded,
                Err(err) => {
                    warn!(filename = %file.filename, error = %err, "carnet page upload failed");
                    results.push(FileOutcome::failed(
                        &file.filename,
                        UPLOAD_FAILED_MESSAGE,
                    ));
                    continue;
                }
            };

            let page = CarnetPage {
                page_number: coordinate.page_number,
                url: uploaded.url,
                storage_id: uploaded.storage_id,
            };

            match shelf.get_mut(&coordinate.carnet_number) {
                Some(carnet) => carnet.upsert_page(page),
                None => {
                    info!(carnet = coordinate.carnet_number, "creating carnet");
                    shelf.insert(
                        coordinate.carnet_number,
                        Carnet::new(coordinate.carnet_number, page, Utc::now()),
                    );
                }
            }

            results.push(FileOutcome::ok(&file.filename));
        }

        let carnets: Vec<Carnet> = shelf.into_values().collect();
        self.persist(&carnets).await?;

        let uploaded = results.iter().filter(|outcome| outcome.success).count();
        info!(uploaded, total, "carnet batch ingested");

        Ok(IngestReport {
            uploaded,
            total,
            results,
            carnets,
        })
    }

    /// Removes one page, dropping the carnet when it was the last one.
    pub async fn delete_page(&self, carnet_id: &str, page_number: u32) -> Result<()> {
        let mut carnets = self.load().await?;
        let index = Self::position(&carnets, carnet_id)?;

        let storage_id = carnets[index]
            .page(page_number)
            .map(|page| page.storage_id.clone())
            .ok_or_else(|| GalleryError::not_found("Page"))?;

        self.destroy_image(&storage_id).await;

        let carnet = &mut carnets[index];
        carnet.remove_page(page_number);
        if carnet.is_empty() {
            info!(carnet = %carnet_id, "last page removed; deleting carnet");
            carnets.remove(index);
        }

        self.persist(&carnets).await
    }

    /// Removes a carnet and, best-effort, every image it references.
    pub async fn delete_carnet(&self, carnet_id: &str) -> Result<()> {
        let mut carnets = self.load().await?;
        let index = Self::position(&carnets, carnet_id)?;

        let carnet = carnets.remove(index);
        for page in &carnet.pages {
            self.destroy_image(&page.storage_id).await;
        }
        info!(carnet = %carnet_id, pages = carnet.pages.len(), "carnet deleted");

        self.persist(&carnets).await
    }

    pub async fn rename_carnet(&self, carnet_id: &str, title: &str) -> Result<Carnet> {
        let title = title.trim();
        if title.is_empty() {
            return Err(GalleryError::validation("Title is required"));
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(GalleryError::validation(format!(
                "Title must be at most {MAX_TITLE_LEN} characters"
            )));
        }

        let mut carnets = self.load().await?;
        let index = Self::position(&carnets, carnet_id)?;
        carnets[index].title = title.to_string();
        let renamed = carnets[index].clone();

        self.persist(&carnets).await?;
        Ok(renamed)
    }

    async fn load(&self) -> Result<Vec<Carnet>> {
        let mut carnets: Vec<Carnet> =
            load_collection(self.store.as_ref(), CollectionKeys::CARNETS)
                .await?
                .unwrap_or_default();
        carnets.sort_by_key(|carnet| carnet.number);
        Ok(carnets)
    }

    async fn persist(&self, carnets: &[Carnet]) -> Result<()> {
        save_collection(self.store.as_ref(), CollectionKeys::CARNETS, carnets).await
    }

    fn position(carnets: &[Carnet], carnet_id: &str) -> Result<usize> {
        carnets
            .iter()
            .position(|carnet| carnet.id == carnet_id)
            .ok_or_else(|| GalleryError::not_found("Carnet"))
    }

    /// An image left behind at the host is preferred over a failed delete.
    async fn destroy_image(&self, storage_id: &str) {
        if let Err(err) = self.images.delete(storage_id).await {
            warn!(storage_id = %storage_id, error = %err, "failed to delete image; leaving it orphaned");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{InMemoryCollectionStore, InMemoryImageStore};

    struct Fixture {
        store: Arc<InMemoryCollectionStore>,
        images: Arc<InMemoryImageStore>,
        service: CarnetService,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryCollectionStore::new());
        let images = Arc::new(InMemoryImageStore::new());
        let service = CarnetService::new(
            store.clone(),
            images.clone(),
            "helluo-somnia/carnets",
        );
        Fixture {
            store,
            images,
            service,
        }
    }

    fn jpeg(name: &str) -> IncomingFile {
        IncomingFile::new(name, "image/jpeg", name.as_bytes().to_vec())
    }

    fn page_numbers(carnet: &Carnet) -> Vec<u32> {
        carnet.pages.iter().map(|page| page.page_number).collect()
    }

    #[tokio::test]
    async fn empty_batch_is_rejected_before_any_upload() {
        let fx = fixture();
        let err = fx.service.ingest(Vec::new()).await.unwrap_err();
        assert!(matches!(err, GalleryError::Validation(_)));
        assert!(fx.images.stored_ids().await.is_empty());
        assert!(fx.store.raw(CollectionKeys::CARNETS).await.is_none());
    }

    #[tokio::test]
    async fn pages_sort_ascending_regardless_of_upload_order() {
        let fx = fixture();
        let report = fx
            .service
            .ingest(vec![jpeg("C.1.2.jpg"), jpeg("C.1.1.jpg")])
            .await
            .unwrap();

        assert_eq!(report.uploaded, 2);
        let carnet = &report.carnets[0];
        assert_eq!(page_numbers(carnet), vec![1, 2]);
        assert_eq!(carnet.cover_url, carnet.pages[0].url);
    }

    #[tokio::test]
    async fn first_page_need_not_be_page_one() {
        let fx = fixture();
        let report = fx.service.ingest(vec![jpeg("C.4.7.jpg")]).await.unwrap();

        let carnet = &report.carnets[0];
        assert_eq!(carnet.id, "carnet-4");
        assert_eq!(carnet.title, "Carnet 4");
        assert_eq!(page_numbers(carnet), vec![7]);
        assert_eq!(carnet.cover_url, carnet.pages[0].url);
    }

    #[tokio::test]
    async fn reupload_replaces_page_in_place() {
        let fx = fixture();
        fx.service
            .ingest(vec![jpeg("C.1.1.jpg"), jpeg("C.1.2.jpg")])
            .await
            .unwrap();
        let before = fx.service.list_carnets().await.unwrap();

        let report = fx
            .service
            .ingest(vec![IncomingFile::new("C 1 1.png", "image/png", b"fresh".to_vec())])
            .await
            .unwrap();

        let carnet = &report.carnets[0];
        assert_eq!(carnet.pages.len(), 2);
        assert_ne!(carnet.pages[0].storage_id, before[0].pages[0].storage_id);
        assert_eq!(carnet.pages[1], before[0].pages[1]);
        assert_eq!(carnet.cover_url, carnet.pages[0].url);
        assert_eq!(carnet.created_at, before[0].created_at);
    }

    #[tokio::test]
    async fn later_file_wins_within_a_batch() {
        let fx = fixture();
        let report = fx
            .service
            .ingest(vec![
                IncomingFile::new("C.2.1.jpg", "image/jpeg", b"first".to_vec()),
                IncomingFile::new("C.C 2.1.jpg", "image/jpeg", b"second".to_vec()),
            ])
            .await
            .unwrap();

        assert_eq!(report.uploaded, 2);
        let carnet = &report.carnets[0];
        assert_eq!(carnet.pages.len(), 1);
        assert_eq!(carnet.pages[0].storage_id, "helluo-somnia/carnets/image-2");
    }

    #[tokio::test]
    async fn malformed_filename_does_not_block_the_batch() {
        let fx = fixture();
        let report = fx
            .service
            .ingest(vec![jpeg("C.1.1.jpg"), jpeg("holiday.jpg")])
            .await
            .unwrap();

        assert_eq!(report.uploaded, 1);
        assert_eq!(report.total, 2);
        assert!(report.results[0].success);
        assert!(!report.results[1].success);
        assert_eq!(
            report.results[1].error.as_deref(),
            Some(INVALID_FILENAME_MESSAGE)
        );
        assert_eq!(fx.images.stored_ids().await.len(), 1);

        let stored = fx.service.list_carnets().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(page_numbers(&stored[0]), vec![1]);
    }

    #[tokio::test]
    async fn failed_upload_is_reported_and_skipped() {
        let fx = fixture();
        fx.images.reject_payload(b"broken".to_vec()).await;

        let report = fx
            .service
            .ingest(vec![
                IncomingFile::new("C.1.1.jpg", "image/jpeg", b"broken".to_vec()),
                jpeg("C.1.2.jpg"),
            ])
            .await
            .unwrap();

        assert_eq!(report.uploaded, 1);
        assert_eq!(report.results[0].error.as_deref(), Some(UPLOAD_FAILED_MESSAGE));
        assert_eq!(page_numbers(&report.carnets[0]), vec![2]);
    }

    #[tokio::test]
    async fn failed_final_write_fails_the_batch_but_keeps_images() {
        let fx = fixture();
        fx.store.fail_writes(true);

        let err = fx.service.ingest(vec![jpeg("C.1.1.jpg")]).await.unwrap_err();
        assert!(matches!(err, GalleryError::Store(_)));
        assert_eq!(fx.images.stored_ids().await.len(), 1);
    }

    #[tokio::test]
    async fn listing_is_sorted_by_number() {
        let fx = fixture();
        fx.service
            .ingest(vec![jpeg("C.3.1.jpg"), jpeg("C.1.1.jpg"), jpeg("C.2.1.jpg")])
            .await
            .unwrap();
        fx.service.ingest(vec![jpeg("C.0010.1.jpg")]).await.unwrap();

        let numbers: Vec<u32> = fx
            .service
            .list_carnets()
            .await
            .unwrap()
            .iter()
            .map(|carnet| carnet.number)
            .collect();
        assert_eq!(numbers, vec![1, 2, 3, 10]);
    }

    #[tokio::test]
    async fn unsorted_stored_collection_is_listed_sorted() {
        let fx = fixture();
        let now = Utc::now();
        let page = CarnetPage {
            page_number: 1,
            url: "https://img.test/1.jpg".into(),
            storage_id: "c/1".into(),
        };
        let stored = vec![
            Carnet::new(5, page.clone(), now),
            Carnet::new(2, page, now),
        ];
        fx.store
            .insert_raw(
                CollectionKeys::CARNETS,
                serde_json::to_string(&stored).unwrap(),
            )
            .await;

        let listed = fx.service.list_carnets().await.unwrap();
        assert_eq!(listed[0].number, 2);
        assert_eq!(listed[1].number, 5);
    }

    #[tokio::test]
    async fn deleting_only_page_removes_carnet() {
        let fx = fixture();
        fx.service.ingest(vec![jpeg("C.1.1.jpg")]).await.unwrap();
        let storage_id = fx.service.list_carnets().await.unwrap()[0].pages[0]
            .storage_id
            .clone();

        fx.service.delete_page("carnet-1", 1).await.unwrap();

        assert!(fx.service.list_carnets().await.unwrap().is_empty());
        assert_eq!(fx.images.deleted_ids().await, vec![storage_id]);
    }

    #[tokio::test]
    async fn deleting_first_page_moves_cover() {
        let fx = fixture();
        fx.service
            .ingest(vec![jpeg("C.1.1.jpg"), jpeg("C.1.2.jpg"), jpeg("C.1.3.jpg")])
            .await
            .unwrap();

        fx.service.delete_page("carnet-1", 1).await.unwrap();

        let carnet = &fx.service.list_carnets().await.unwrap()[0];
        assert_eq!(page_numbers(carnet), vec![2, 3]);
        assert_eq!(carnet.cover_url, carnet.pages[0].url);
    }

    #[tokio::test]
    async fn page_delete_survives_remote_failure() {
        let fx = fixture();
        fx.service
            .ingest(vec![jpeg("C.1.1.jpg"), jpeg("C.1.2.jpg")])
            .await
            .unwrap();
        fx.images.fail_deletes(true);

        fx.service.delete_page("carnet-1", 2).await.unwrap();

        let carnet = &fx.service.list_carnets().await.unwrap()[0];
        assert_eq!(page_numbers(carnet), vec![1]);
        assert_eq!(fx.images.stored_ids().await.len(), 2);
    }

    #[tokio::test]
    async fn unknown_page_is_not_found_without_side_effects() {
        let fx = fixture();
        fx.service.ingest(vec![jpeg("C.1.1.jpg")]).await.unwrap();
        let before = fx.store.raw(CollectionKeys::CARNETS).await;

        let err = fx.service.delete_page("carnet-1", 9).await.unwrap_err();
        assert!(matches!(err, GalleryError::NotFound(_)));
        assert_eq!(fx.store.raw(CollectionKeys::CARNETS).await, before);
        assert!(fx.images.deleted_ids().await.is_empty());
    }

    #[tokio::test]
    async fn deleting_carnet_destroys_every_page() {
        let fx = fixture();
        fx.service
            .ingest(vec![jpeg("C.1.1.jpg"), jpeg("C.1.2.jpg"), jpeg("C.2.1.jpg")])
            .await
            .unwrap();

        fx.service.delete_carnet("carnet-1").await.unwrap();

        let remaining = fx.service.list_carnets().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, "carnet-2");
        assert_eq!(fx.images.deleted_ids().await.len(), 2);
    }

    #[tokio::test]
    async fn carnet_delete_continues_past_remote_failures() {
        let fx = fixture();
        fx.service
            .ingest(vec![jpeg("C.1.1.jpg"), jpeg("C.1.2.jpg")])
            .await
            .unwrap();
        fx.images.fail_deletes(true);

        fx.service.delete_carnet("carnet-1").await.unwrap();
        assert!(fx.service.list_carnets().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_carnet_leaves_collection_unchanged() {
        let fx = fixture();
        fx.service.ingest(vec![jpeg("C.1.1.jpg")]).await.unwrap();
        let before = fx.store.raw(CollectionKeys::CARNETS).await;

        let err = fx.service.delete_carnet("carnet-99").await.unwrap_err();
        assert!(matches!(err, GalleryError::NotFound(_)));
        let err = fx.service.delete_page("carnet-99", 1).await.unwrap_err();
        assert!(matches!(err, GalleryError::NotFound(_)));

        assert_eq!(fx.store.raw(CollectionKeys::CARNETS).await, before);
    }

    #[tokio::test]
    async fn rename_trims_and_persists_title() {
        let fx = fixture();
        fx.service.ingest(vec![jpeg("C.1.1.jpg")]).await.unwrap();

        let renamed = fx
            .service
            .rename_carnet("carnet-1", "  Voyage en Bretagne ")
            .await
            .unwrap();
        assert_eq!(renamed.title, "Voyage en Bretagne");
        assert_eq!(
            fx.service.list_carnets().await.unwrap()[0].title,
            "Voyage en Bretagne"
        );
    }

    #[tokio::test]
    async fn blank_title_is_rejected_and_title_kept() {
        let fx = fixture();
        fx.service.ingest(vec![jpeg("C.1.1.jpg")]).await.unwrap();

        for title in ["", "   "] {
            let err = fx.service.rename_carnet("carnet-1", title).await.unwrap_err();
            assert!(matches!(err, GalleryError::Validation(_)));
        }
        let too_long = "x".repeat(MAX_TITLE_LEN + 1);
        assert!(fx.service.rename_carnet("carnet-1", &too_long).await.is_err());

        assert_eq!(fx.service.list_carnets().await.unwrap()[0].title, "Carnet 1");
    }

    #[tokio::test]
    async fn rename_unknown_carnet_is_not_found() {
        let fx = fixture();
        let err = fx
            .service
            .rename_carnet("carnet-3", "Nouveau")
            .await
            .unwrap_err();
        assert!(matches!(err, GalleryError::NotFound(_)));
    }
}
