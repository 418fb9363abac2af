use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::validation::{absolute_url, bounded, non_blank};
use crate::model::{NewPortfolioItem, PortfolioItem};
use crate::ports::{CollectionKeys, CollectionStore, load_collection, save_collection};
use crate::{GalleryError, Result};

/// Which portfolio item a delete targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortfolioSelector {
    Id(String),
    /// Zero-based position in the stored order.
    Index(usize),
}

pub struct PortfolioService {
    store: Arc<dyn CollectionStore>,
}

impl fmt::Debug for PortfolioService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortfolioService").finish_non_exhaustive()
    }
}

impl PortfolioService {
    pub fn new(store: Arc<dyn CollectionStore>) -> Self {
        Self { store }
    }

    /// Items in stored order, newest first.
    pub async fn list(&self) -> Result<Vec<PortfolioItem>> {
        self.load().await
    }

    pub async fn add(&self, new_item: NewPortfolioItem) -> Result<PortfolioItem> {
        let item = PortfolioItem {
            id: Uuid::now_v7().to_string(),
            title: bounded("Title", &new_item.title, 1, 200)?,
            category: bounded("Category", &new_item.category, 1, 50)?,
            file: absolute_url("url", &new_item.url)?,
            public_id: non_blank(new_item.public_id),
            created_at: Some(Utc::now()),
        };

        let mut items = self.load().await?;
        items.insert(0, item.clone());
        self.persist(&items).await?;

        info!(id = %item.id, category = %item.category, "portfolio item added");
        Ok(item)
    }

    pub async fn retitle(&self, index: usize, title: &str) -> Result<PortfolioItem> {
        let title = bounded("Title", title, 1, 200)?;

        let mut items = self.load().await?;
        let item = items
            .get_mut(index)
            .ok_or_else(|| GalleryError::validation("Invalid index"))?;
        item.title = title;
        let updated = item.clone();

        self.persist(&items).await?;
        Ok(updated)
    }

    pub async fn delete(&self, selector: PortfolioSelector) -> Result<PortfolioItem> {
        let mut items = self.load().await?;

        let index = match &selector {
            PortfolioSelector::Index(index) if *index < items.len() => *index,
            PortfolioSelector::Index(_) => {
                return Err(GalleryError::validation("Invalid index"));
            }
            PortfolioSelector::Id(id) => items
                .iter()
                .position(|item| &item.id == id)
                .ok_or_else(|| GalleryError::not_found("Item"))?,
        };

        let removed = items.remove(index);
        self.persist(&items).await?;

        info!(id = %removed.id, "portfolio item deleted");
        Ok(removed)
    }

    async fn load(&self) -> Result<Vec<PortfolioItem>> {
        Ok(load_collection(self.store.as_ref(), CollectionKeys::PORTFOLIO)
            .await?
            .unwrap_or_default())
    }

    async fn persist(&self, items: &[PortfolioItem]) -> Result<()> {
        save_collection(self.store.as_ref(), CollectionKeys::PORTFOLIO, items).await
    }
}
