use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;

use super::validation::bounded;
use crate::model::{Category, CategoryUpdate, NewCategory};
use crate::ports::{CollectionKeys, CollectionStore, load_collection, save_collection};
use crate::{GalleryError, Result};

static CATEGORY_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9_-]+$").expect("valid regex"));

pub struct CategoryService {
    store: Arc<dyn CollectionStore>,
}

impl fmt::Debug for CategoryService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CategoryService").finish_non_exhaustive()
    }
}

impl CategoryService {
    pub fn new(store: Arc<dyn CollectionStore>) -> Self {
        Self { store }
    }

    /// Categories by `order`. Seeds the defaults when none are stored.
    pub async fn list(&self) -> Result<Vec<Category>> {
        let mut categories = match self.stored().await? {
            Some(categories) if !categories.is_empty() => categories,
            _ => {
                info!("no categories stored; seeding defaults");
                let defaults = Category::defaults();
                self.persist(&defaults).await?;
                defaults
            }
        };
        categories.sort_by_key(|category| category.order);
        Ok(categories)
    }

    pub async fn add(&self, new_category: NewCategory) -> Result<Category> {
        let id = new_category.id.trim();
        if id.is_empty() {
            return Err(GalleryError::validation("ID is required"));
        }
        if !CATEGORY_ID.is_match(id) {
            return Err(GalleryError::validation(
                "ID must be lowercase with no spaces (use - or _)",
            ));
        }
        let name = bounded("Name", &new_category.name, 1, 100)?;

        let mut categories = self.load_or_defaults().await?;
        if categories.iter().any(|category| category.id == id) {
            return Err(GalleryError::validation("Category ID already exists"));
        }

        let category = Category::new(id, name, categories.len() as u32 + 1);
        categories.push(category.clone());
        self.persist(&categories).await?;

        info!(id = %category.id, "category added");
        Ok(category)
    }

    pub async fn update(&self, id: &str, update: CategoryUpdate) -> Result<Category> {
        let name = update
            .name
            .as_deref()
            .map(|name| bounded("Name", name, 1, 100))
            .transpose()?;
        if update.order == Some(0) {
            return Err(GalleryError::validation("Order must be at least 1"));
        }

        let mut categories = self.load_or_defaults().await?;
        let category = categories
            .iter_mut()
            .find(|category| category.id == id)
            .ok_or_else(|| GalleryError::not_found("Category"))?;

        if let Some(name) = name {
            category.name = name;
        }
        if let Some(order) = update.order {
            category.order = order;
        }
        let updated = category.clone();

        if update.order.is_some() {
            categories.sort_by_key(|category| category.order);
        }
        self.persist(&categories).await?;
        Ok(updated)
    }

    /// Removes a category and renumbers the rest from 1.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let mut categories = self.load_or_defaults().await?;
        let before = categories.len();
        categories.retain(|category| category.id != id);
        if categories.len() == before {
            return Err(GalleryError::not_found("Category"));
        }

        for (position, category) in categories.iter_mut().enumerate() {
            category.order = position as u32 + 1;
        }
        self.persist(&categories).await?;

        info!(id, "category deleted");
        Ok(())
    }

    async fn stored(&self) -> Result<Option<Vec<Category>>> {
        load_collection(self.store.as_ref(), CollectionKeys::CATEGORIES).await
    }

    async fn load_or_defaults(&self) -> Result<Vec<Category>> {
        Ok(self.stored().await?.unwrap_or_else(Category::defaults))
    }

    async fn persist(&self, categories: &[Category]) -> Result<()> {
        save_collection(self.store.as_ref(), CollectionKeys::CATEGORIES, categories).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::InMemoryCollectionStore;

    fn service() -> (Arc<InMemoryCollectionStore>, CategoryService) {
        let store = Arc::new(InMemoryCollectionStore::new());
        (store.clone(), CategoryService::new(store))
    }

    fn new_category(id: &str, name: &str) -> NewCategory {
        NewCategory {
            id: id.into(),
            name: name.into(),
        }
    }

    #[tokio::test]
    async fn listing_seeds_defaults() {
        let (store, service) = service();
        let categories = service.list().await.unwrap();

        assert_eq!(categories, Category::defaults());
        assert!(store.raw(CollectionKeys::CATEGORIES).await.is_some());
    }

    #[tokio::test]
    async fn empty_stored_list_is_reseeded() {
        let (store, service) = service();
        store.insert_raw(CollectionKeys::CATEGORIES, "[]").await;

        assert_eq!(service.list().await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn add_appends_with_next_order() {
        let (_, service) = service();
        let added = service.add(new_category("dessin", "Dessins")).await.unwrap();
        assert_eq!(added.order, 6);

        let err = service.add(new_category("dessin", "Encore")).await.unwrap_err();
        assert!(matches!(err, GalleryError::Validation(_)));
        let err = service.add(new_category("Bad Id", "X")).await.unwrap_err();
        assert!(matches!(err, GalleryError::Validation(_)));
    }

    #[tokio::test]
    async fn delete_renumbers_remaining() {
        let (_, service) = service();
        service.delete("collage").await.unwrap();

        let categories = service.list().await.unwrap();
        let orders: Vec<u32> = categories.iter().map(|c| c.order).collect();
        assert_eq!(orders, vec![1, 2, 3, 4]);
        assert!(categories.iter().all(|c| c.id != "collage"));

        assert!(matches!(
            service.delete("collage").await,
            Err(GalleryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn update_renames_and_reorders() {
        let (_, service) = service();
        let updated = service
            .update(
                "divers",
                CategoryUpdate {
                    name: Some("Autres".into()),
                    order: Some(0),
                },
            )
            .await;
        assert!(updated.is_err());

        let updated = service
            .update(
                "divers",
                CategoryUpdate {
                    name: Some("Autres".into()),
                    order: Some(1),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.id, "divers");
        assert_eq!(updated.name, "Autres");

        let categories = service.list().await.unwrap();
        assert_eq!(categories[0].order, 1);
        assert!(categories.iter().any(|c| c.id == "divers" && c.name == "Autres"));

        assert!(matches!(
            service.update("missing", CategoryUpdate::default()).await,
            Err(GalleryError::NotFound(_))
        ));
    }
}
