use std::fmt;

use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};
use tracing::{debug, info};

use helluo_core::{CollectionStore, GalleryError, Result};

/// Collections stored as plain JSON strings, one key per collection.
#[derive(Clone)]
pub struct RedisCollectionStore {
    conn: ConnectionManager,
}

impl fmt::Debug for RedisCollectionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCollectionStore")
            .field("connection", &"ConnectionManager")
            .finish()
    }
}

impl RedisCollectionStore {
    pub async fn connect(redis_url: &str) -> Result<Self> {
        info!("Connecting to Redis collection store");

        let client = redis::Client::open(redis_url)
            .map_err(|e| GalleryError::Store(format!("Failed to create Redis client: {e}")))?;

        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| GalleryError::Store(format!("Failed to connect to Redis: {e}")))?;

        info!("Successfully connected to Redis collection store");

        Ok(Self { conn })
    }
}

#[async_trait]
impl CollectionStore for RedisCollectionStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        debug!("Redis GET: {}", key);

        let mut conn = self.conn.clone();
        conn.get::<_, Option<String>>(key)
            .await
            .map_err(|e| GalleryError::Store(format!("Redis GET failed: {e}")))
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        debug!("Redis SET: {} ({} bytes)", key, value.len());

        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(key, value)
            .await
            .map_err(|e| GalleryError::Store(format!("Redis SET failed: {e}")))
    }
}
