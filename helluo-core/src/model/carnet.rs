use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One scanned page of a carnet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarnetPage {
    pub page_number: u32,
    pub url: String,
    /// Identifier used to destroy the image at the image store.
    #[serde(rename = "public_id", alias = "storageId")]
    pub storage_id: String,
}

/// A digitized sketchbook.
///
/// Invariants held by every mutating method:
/// - `pages` is sorted ascending by `page_number`, which is unique;
/// - `cover_url` is the url of `pages[0]` whenever a page exists.
///
/// A carnet with no pages is never persisted; callers drop it instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Carnet {
    pub id: String,
    pub number: u32,
    pub title: String,
    pub cover_url: String,
    #[serde(default)]
    pub pages: Vec<CarnetPage>,
    pub created_at: DateTime<Utc>,
}

impl Carnet {
    pub fn id_for(number: u32) -> String {
        format!("carnet-{number}")
    }

    pub fn default_title(number: u32) -> String {
        format!("Carnet {number}")
    }

    /// Creates a carnet holding the page that introduced it.
    pub fn new(number: u32, first_page: CarnetPage, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Self::id_for(number),
            number,
            title: Self::default_title(number),
            cover_url: first_page.url.clone(),
            pages: vec![first_page],
            created_at,
        }
    }

    /// Inserts `page`, replacing any page with the same number in place.
    pub fn upsert_page(&mut self, page: CarnetPage) {
        match self
            .pages
            .iter_mut()
            .find(|existing| existing.page_number == page.page_number)
        {
            Some(existing) => *existing = page,
            None => self.pages.push(page),
        }
        self.normalize();
    }

    /// Removes the page with `page_number`, returning it when it existed.
    pub fn remove_page(&mut self, page_number: u32) -> Option<CarnetPage> {
        let index = self
            .pages
            .iter()
            .position(|page| page.page_number == page_number)?;
        let removed = self.pages.remove(index);
        self.normalize();
        Some(removed)
    }

    pub fn page(&self, page_number: u32) -> Option<&CarnetPage> {
        self.pages.iter().find(|page| page.page_number == page_number)
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    fn normalize(&mut self) {
        self.pages.sort_by_key(|page| page.page_number);
        if let Some(first) = self.pages.first() {
            self.cover_url = first.url.clone();
        }
    }
}
