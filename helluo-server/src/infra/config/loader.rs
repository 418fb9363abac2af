use once_cell::sync::Lazy;
use std::{fs, path::PathBuf};
use thiserror::Error;
use url::Url;

use super::models::{
    AuthConfig, CloudinaryConfig, Config, ConfigMetadata, ConfigWarnings,
    CorsConfig, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_ROOT_FOLDER, MediaConfig,
    RedisConfig, ServerConfig,
};
use super::sources::{EnvConfig, FileCloudinaryConfig, FileConfig};

static DEFAULT_CONFIG_LOCATIONS: Lazy<Vec<PathBuf>> = Lazy::new(|| {
    vec![
        PathBuf::from("helluo.toml"),
        PathBuf::from("config/helluo.toml"),
    ]
});

#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConfigLoaderOptions) -> Self {
        Self { options }
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    /// Loads `.env`, then layers environment over the TOML file over
    /// defaults.
    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| true).or_else(
                |err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                },
            )?,
            None => {
                dotenvy::dotenv().map(|_| true).or_else(|err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                })?
            }
        };

        let mut load = self.load_with_env(EnvConfig::gather())?;
        load.config.metadata.env_file_loaded = env_file_loaded;
        Ok(load)
    }

    /// Same layering as [`ConfigLoader::load`] against an explicit
    /// environment view, without touching the process environment.
    pub fn load_with_env(&self, env: EnvConfig) -> Result<ConfigLoad, ConfigLoadError> {
        let (file_config, config_path) = self.load_file_config(&env)?;
        let (config, warnings) = compose_config(file_config, env, config_path)?;
        Ok(ConfigLoad { config, warnings })
    }

    fn load_file_config(
        &self,
        env: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let (path, explicit) = match (&self.options.config_path, &env.config_path) {
            (Some(path), _) | (None, Some(path)) => (path.clone(), true),
            (None, None) => match DEFAULT_CONFIG_LOCATIONS
                .iter()
                .find(|candidate| candidate.exists())
            {
                Some(path) => (path.clone(), false),
                None => return Ok((None, None)),
            },
        };

        if !path.exists() {
            if explicit {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            return Ok((None, None));
        }

        let contents = fs::read_to_string(&path).map_err(|source| {
            ConfigLoadError::Io {
                path: path.clone(),
                source,
            }
        })?;
        let file_config: FileConfig =
            toml::from_str(&contents).map_err(|source| ConfigLoadError::Parse {
                path: path.clone(),
                source,
            })?;

        Ok((Some(file_config), Some(path)))
    }
}

fn compose_config(
    file_config: Option<FileConfig>,
    env: EnvConfig,
    config_path: Option<PathBuf>,
) -> Result<(Config, ConfigWarnings), ConfigLoadError> {
    let mut warnings = ConfigWarnings::default();

    if file_config.is_none() {
        warnings.push_with_hint(
            "No helluo.toml detected; falling back to environment variables",
            "Create helluo.toml or pass --config to pin settings in a file",
        );
    }

    let FileConfig {
        server: file_server,
        redis: file_redis,
        cloudinary: file_cloudinary,
        media: file_media,
        cors: file_cors,
        auth: file_auth,
        dev_mode: file_dev_mode,
    } = file_config.unwrap_or_default();

    let server = ServerConfig {
        host: env
            .server_host
            .clone()
            .or(file_server.host)
            .unwrap_or_else(|| "0.0.0.0".to_string()),
        port: env.server_port.or(file_server.port).unwrap_or(3000),
    };

    let redis = env
        .redis_url
        .clone()
        .or_else(|| file_redis.map(|r| r.url))
        .map(|url| {
            Url::parse(&url).map_err(|source| ConfigLoadError::InvalidRedisUrl { source })?;
            Ok::<_, ConfigLoadError>(RedisConfig { url })
        })
        .transpose()?;

    let cloudinary = resolve_cloudinary(&env, file_cloudinary.unwrap_or_default())?;

    let media = MediaConfig {
        root_folder: env
            .root_folder
            .clone()
            .or(file_media.root_folder)
            .map(|folder| folder.trim_matches('/').to_string())
            .filter(|folder| !folder.is_empty())
            .unwrap_or_else(|| DEFAULT_ROOT_FOLDER.to_string()),
        max_upload_bytes: env
            .max_upload_bytes
            .or(file_media.max_upload_bytes)
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
    };
    if media.max_upload_bytes == 0 {
        return Err(ConfigLoadError::InvalidSetting {
            field: "max_upload_bytes",
            reason: "must be greater than zero".into(),
        });
    }

    let cors = CorsConfig {
        allowed_origins: env
            .cors_allowed_origins
            .clone()
            .or(file_cors.allowed_origins)
            .unwrap_or_default(),
    };

    let auth = AuthConfig {
        admin_password: env
            .admin_password
            .clone()
            .or(file_auth.admin_password)
            .filter(|password| !password.is_empty()),
    };
    if auth.admin_password.is_none() {
        warnings.push_with_hint(
            "ADMIN_PASSWORD not configured; every admin request will be rejected",
            "Set ADMIN_PASSWORD or auth.admin_password in helluo.toml",
        );
    }

    let dev_mode = env.dev_mode.or(file_dev_mode).unwrap_or(false);

    if dev_mode {
        if redis.is_none() {
            warnings.push("REDIS_URL not configured; collections are kept in memory");
        }
        if cloudinary.is_none() {
            warnings.push("Cloudinary not configured; images are kept in memory");
        }
    } else {
        if redis.is_none() {
            return Err(ConfigLoadError::MissingService {
                service: "redis",
                hint: "set REDIS_URL, or DEV_MODE=true for in-memory collections",
            });
        }
        if cloudinary.is_none() {
            return Err(ConfigLoadError::MissingService {
                service: "cloudinary",
                hint: "set CLOUDINARY_CLOUD_NAME, CLOUDINARY_API_KEY and CLOUDINARY_API_SECRET, or DEV_MODE=true",
            });
        }
        if cors.allowed_origins.iter().any(|origin| origin == "*") {
            return Err(ConfigLoadError::InvalidSetting {
                field: "cors.allowed_origins",
                reason: "wildcard origins are only allowed when DEV_MODE is true".into(),
            });
        }
    }

    let config = Config {
        server,
        redis,
        cloudinary,
        media,
        cors,
        auth,
        dev_mode,
        metadata: ConfigMetadata {
            config_path,
            env_file_loaded: false,
        },
    };

    Ok((config, warnings))
}

/// Cloudinary needs all three credentials; any subset is a misconfiguration.
fn resolve_cloudinary(
    env: &EnvConfig,
    file: FileCloudinaryConfig,
) -> Result<Option<CloudinaryConfig>, ConfigLoadError> {
    let cloud_name = env.cloudinary_cloud_name.clone().or(file.cloud_name);
    let api_key = env.cloudinary_api_key.clone().or(file.api_key);
    let api_secret = env.cloudinary_api_secret.clone().or(file.api_secret);

    match (cloud_name, api_key, api_secret) {
        (Some(cloud_name), Some(api_key), Some(api_secret)) => Ok(Some(CloudinaryConfig {
            cloud_name,
            api_key,
            api_secret,
        })),
        (None, None, None) => Ok(None),
        _ => Err(ConfigLoadError::InvalidSetting {
            field: "cloudinary",
            reason: "cloud_name, api_key and api_secret must be set together".into(),
        }),
    }
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("configuration file missing: {path}")]
    MissingConfig { path: PathBuf },
    #[error("failed to read configuration {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid redis URL")]
    InvalidRedisUrl {
        #[source]
        source: url::ParseError,
    },
    #[error("invalid setting {field}: {reason}")]
    InvalidSetting { field: &'static str, reason: String },
    #[error("{service} is not configured: {hint}")]
    MissingService {
        service: &'static str,
        hint: &'static str,
    },
    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
}
