use std::{fmt, sync::Arc};

use helluo_core::{
    CarnetService, CategoryService, CollectionStore, ExhibitionService, ImageStore,
    PortfolioService,
};

use crate::auth;
use crate::infra::config::Config;

/// Shared handler state. Clients are built by the host process and injected
/// here; nothing is held in globals.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub images: Arc<dyn ImageStore>,
    pub carnets: Arc<CarnetService>,
    pub portfolio: Arc<PortfolioService>,
    pub categories: Arc<CategoryService>,
    pub exhibitions: Arc<ExhibitionService>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        store: Arc<dyn CollectionStore>,
        images: Arc<dyn ImageStore>,
    ) -> Self {
        let carnets = CarnetService::new(
            Arc::clone(&store),
            Arc::clone(&images),
            config.media.carnets_folder(),
        );

        Self {
            carnets: Arc::new(carnets),
            portfolio: Arc::new(PortfolioService::new(Arc::clone(&store))),
            categories: Arc::new(CategoryService::new(Arc::clone(&store))),
            exhibitions: Arc::new(ExhibitionService::new(store)),
            images,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_admin_token(&self, presented: &str) -> bool {
        auth::password_matches(self.config.auth.admin_password.as_deref(), presented)
    }
}
