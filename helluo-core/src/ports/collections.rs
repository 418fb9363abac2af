use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::Result;

/// Key-value store holding each collection as one JSON document.
///
/// No multi-key transactions are expected. Every mutation rewrites the whole
/// document, so concurrent writers resolve as last-writer-wins.
#[async_trait]
pub trait CollectionStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: String) -> Result<()>;
}

#[derive(Debug, Clone, Copy)]
pub struct CollectionKeys;

impl CollectionKeys {
    pub const CARNETS: &'static str = "carnets:items";
    pub const PORTFOLIO: &'static str = "portfolio:items";
    pub const CATEGORIES: &'static str = "portfolio:categories";
    pub const EXHIBITIONS: &'static str = "exhibitions:items";
}

/// Reads the collection under `key`; an absent key reads as `None`.
pub async fn load_collection<T: DeserializeOwned>(
    store: &dyn CollectionStore,
    key: &str,
) -> Result<Option<Vec<T>>> {
    match store.get(key).await? {
        Some(raw) => {
            let items: Vec<T> = serde_json::from_str(&raw)?;
            debug!(key, count = items.len(), "collection loaded");
            Ok(Some(items))
        }
        None => {
            debug!(key, "collection absent");
            Ok(None)
        }
    }
}

pub async fn save_collection<T: Serialize>(
    store: &dyn CollectionStore,
    key: &str,
    items: &[T],
) -> Result<()> {
    let raw = serde_json::to_string(items)?;
    store.set(key, raw).await?;
    debug!(key, count = items.len(), "collection saved");
    Ok(())
}
