use std::path::{Path, PathBuf};
use std::time::Duration;

use color_eyre::eyre::{eyre, Result};
use config::ConfigError;
use secrecy::SecretString;
use serde::Deserialize;

use crate::{
    domain::cursor::{CursorCodec, DEFAULT_OFFSET_HOURS},
    infrastructure::rest::ApiClient,
    model::scroll::ScrollOptions,
    utils,
};

const CONFIG: &str = include_str!("../../.config/config.json5");

const ENV_PREFIX: &str = "SCROLLFEED";

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub _data_dir: PathBuf,
    #[serde(default)]
    pub _config_dir: PathBuf,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "ApiConfig::default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub token: Option<SecretString>,
}

impl ApiConfig {
    fn default_base_url() -> String {
        String::from("http://localhost:8080")
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            token: None,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct CursorConfig {
    #[serde(default = "CursorConfig::default_offset_hours")]
    pub offset_hours: i64,
}

impl CursorConfig {
    fn default_offset_hours() -> i64 {
        DEFAULT_OFFSET_HOURS
    }
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            offset_hours: Self::default_offset_hours(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct HttpConfig {
    /// Request timeout; none when unset
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default, flatten)]
    pub config: AppConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub cursor: CursorConfig,
    #[serde(default)]
    pub scroll: ScrollOptions,
    #[serde(default)]
    pub http: HttpConfig,
}

impl Config {
    /// Load configuration from the config directory and the environment
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_from(&utils::get_config_dir())
    }

    /// The built-in defaults
    pub fn defaults() -> Result<Self, ConfigError> {
        json5::from_str(CONFIG)
            .map_err(|e| ConfigError::Message(format!("Failed to load default config: {e}")))
    }

    /// Layer `config.*` files found in `config_dir` and `SCROLLFEED__*` variables over the
    /// built-in defaults
    ///
    /// A missing file is fine: the defaults are complete.
    pub fn load_from(config_dir: &Path) -> Result<Self, ConfigError> {
        let data_dir = utils::get_data_dir();
        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(CONFIG, config::FileFormat::Json5))
            .set_default("_data_dir", data_dir.to_string_lossy().into_owned())?
            .set_default("_config_dir", config_dir.to_string_lossy().into_owned())?;

        let config_files = [
            ("config.json5", config::FileFormat::Json5),
            ("config.json", config::FileFormat::Json),
            ("config.yaml", config::FileFormat::Yaml),
            ("config.toml", config::FileFormat::Toml),
            ("config.ini", config::FileFormat::Ini),
        ];
        let mut found_config = false;
        for (file, format) in &config_files {
            builder = builder.add_source(
                config::File::from(config_dir.join(file))
                    .format(*format)
                    .required(false),
            );
            if config_dir.join(file).exists() {
                found_config = true
            }
        }
        if !found_config {
            log::info!("No configuration file found, using defaults");
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__"),
        );

        let cfg: Self = builder.build()?.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::NotFound(String::from("api.base_url")));
        }
        if !(0.0..=1.0).contains(&self.scroll.threshold) {
            return Err(ConfigError::Message(format!(
                "scroll.threshold must be within 0..=1, got {}",
                self.scroll.threshold
            )));
        }
        Ok(())
    }

    pub fn cursor_codec(&self) -> Result<CursorCodec> {
        CursorCodec::with_offset_hours(self.cursor.offset_hours)
            .ok_or_else(|| eyre!("cursor.offset_hours out of range: {}", self.cursor.offset_hours))
    }

    pub fn api_client(&self) -> Result<ApiClient> {
        let token = self.api.token.clone();
        let client = match self.http.timeout_secs {
            Some(secs) => ApiClient::with_timeout(&self.api.base_url, token, Duration::from_secs(secs))?,
            None => ApiClient::new(&self.api.base_url, token),
        };
        Ok(client)
    }
}
