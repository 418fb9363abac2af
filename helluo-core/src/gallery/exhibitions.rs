use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::validation::{absolute_url, bounded, non_blank};
use crate::model::{Exhibition, ExhibitionUpdate, NewExhibition};
use crate::ports::{CollectionKeys, CollectionStore, load_collection, save_collection};
use crate::{GalleryError, Result};

const MAX_DESCRIPTION_LEN: usize = 1000;

pub struct ExhibitionService {
    store: Arc<dyn CollectionStore>,
}

impl fmt::Debug for ExhibitionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExhibitionService").finish_non_exhaustive()
    }
}

impl ExhibitionService {
    pub fn new(store: Arc<dyn CollectionStore>) -> Self {
        Self { store }
    }

    /// Exhibitions by start date, newest first. Undated entries sort last.
    pub async fn list(&self) -> Result<Vec<Exhibition>> {
        let mut items = self.load().await?;
        items.sort_by(|a, b| match (a.start_day(), b.start_day()) {
            (Some(a), Some(b)) => b.cmp(&a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        Ok(items)
    }

    pub async fn add(&self, new_item: NewExhibition) -> Result<Exhibition> {
        let item = Exhibition {
            id: Uuid::now_v7().to_string(),
            title: bounded("Title", &new_item.title, 1, 200)?,
            location: bounded("Location", &new_item.location, 1, 200)?,
            city: bounded("City", &new_item.city, 1, 100)?,
            start_date: bounded("Start date", &new_item.start_date, 1, usize::MAX)?,
            end_date: non_blank(new_item.end_date),
            description: description(new_item.description)?,
            image: image(new_item.image)?,
            public_id: non_blank(new_item.public_id),
            created_at: Utc::now(),
        };

        let mut items = self.load().await?;
        items.push(item.clone());
        self.persist(&items).await?;

        info!(id = %item.id, title = %item.title, "exhibition added");
        Ok(item)
    }

    /// Applies the fields present in `update`; an empty optional field
    /// clears it.
    pub async fn update(&self, id: &str, update: ExhibitionUpdate) -> Result<Exhibition> {
        let mut items = self.load().await?;
        let item = items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| GalleryError::not_found("Exhibition"))?;

        let mut updated = item.clone();
        if let Some(title) = update.title {
            updated.title = bounded("Title", &title, 1, 200)?;
        }
        if let Some(location) = update.location {
            updated.location = bounded("Location", &location, 1, 200)?;
        }
        if let Some(city) = update.city {
            updated.city = bounded("City", &city, 1, 100)?;
        }
        if let Some(start_date) = update.start_date {
            updated.start_date = bounded("Start date", &start_date, 1, usize::MAX)?;
        }
        if update.end_date.is_some() {
            updated.end_date = non_blank(update.end_date);
        }
        if update.description.is_some() {
            updated.description = description(update.description)?;
        }
        if update.image.is_some() {
            updated.image = image(update.image)?;
        }
        if update.public_id.is_some() {
            updated.public_id = non_blank(update.public_id);
        }

        *item = updated.clone();
        self.persist(&items).await?;
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let mut items = self.load().await?;
        let before = items.len();
        items.retain(|item| item.id != id);
        if items.len() == before {
            return Err(GalleryError::not_found("Exhibition"));
        }

        self.persist(&items).await?;
        info!(id, "exhibition deleted");
        Ok(())
    }

    async fn load(&self) -> Result<Vec<Exhibition>> {
        Ok(load_collection(self.store.as_ref(), CollectionKeys::EXHIBITIONS)
            .await?
            .unwrap_or_default())
    }

    async fn persist(&self, items: &[Exhibition]) -> Result<()> {
        save_collection(self.store.as_ref(), CollectionKeys::EXHIBITIONS, items).await
    }
}

fn description(value: Option<String>) -> Result<Option<String>> {
    non_blank(value)
        .map(|text| bounded("Description", &text, 1, MAX_DESCRIPTION_LEN))
        .transpose()
}

fn image(value: Option<String>) -> Result<Option<String>> {
    non_blank(value)
        .map(|url| absolute_url("image", &url))
        .transpose()
}
