pub mod loader;
pub mod models;
pub mod sources;

pub use loader::{ConfigLoad, ConfigLoadError, ConfigLoader, ConfigLoaderOptions};
pub use models::{
    AuthConfig, CloudinaryConfig, Config, ConfigMetadata, ConfigWarning,
    ConfigWarnings, CorsConfig, MediaConfig, RedisConfig, ServerConfig,
};
pub use sources::EnvConfig;
