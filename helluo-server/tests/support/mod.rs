#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum_test::{TestServer, multipart::Part};
use helluo_core::infra::{InMemoryCollectionStore, InMemoryImageStore};
use helluo_server::{AppState, create_app, infra::config::Config};

pub const ADMIN_PASSWORD: &str = "atelier-secret";

pub struct TestApp {
    pub server: TestServer,
    pub store: Arc<InMemoryCollectionStore>,
    pub images: Arc<InMemoryImageStore>,
}

pub fn build_test_app() -> Result<TestApp> {
    build_test_app_with(Config::development(Some(ADMIN_PASSWORD.to_string())))
}

pub fn build_test_app_with(config: Config) -> Result<TestApp> {
    let store = Arc::new(InMemoryCollectionStore::new());
    let images = Arc::new(InMemoryImageStore::new());
    let state = AppState::new(Arc::new(config), store.clone(), images.clone());

    let server = TestServer::builder()
        .build(create_app(state))
        .map_err(|err| anyhow::anyhow!(err.to_string()))?;

    Ok(TestApp {
        server,
        store,
        images,
    })
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

pub fn admin() -> String {
    bearer(ADMIN_PASSWORD)
}

pub fn jpeg(name: &str) -> Part {
    Part::bytes(name.as_bytes().to_vec())
        .file_name(name)
        .mime_type("image/jpeg")
}
