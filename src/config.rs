use crate::constant::*;

use anyhow::Result;
use config_parser2::*;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::{path::Path, sync::OnceLock};

static CONFIGS: OnceLock<Configs> = OnceLock::new();

#[derive(Debug)]
pub struct Configs {
    pub app_config: AppConfig,
    pub lastfm_api_key: Option<String>,
}

impl Configs {
    pub fn from_parts(app_config: AppConfig, lastfm_api_key: Option<String>) -> Self {
        Self {
            app_config,
            lastfm_api_key,
        }
    }
}

impl Configs {
    pub fn new<P: AsRef<Path>>(config_folder: P) -> Result<Self> {
        Ok(Self {
            app_config: AppConfig::new(config_folder)?,
            lastfm_api_key: None,
        })
    }

    #[cfg(feature = "env-file")]
    pub fn from_env() -> Result<Self> {
        use std::env::var;
        dotenvy::dotenv().ok();

        let config_path =
            var("PLAYLISTGEN_CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_FOLDER.to_string());
        let mut configs = Self::new(config_path)?;
        configs.lastfm_api_key = var("LASTFM_API_KEY").ok();
        Ok(configs)
    }
}

#[derive(Debug, Deserialize, Serialize, ConfigParse)]
/// Application configurations
pub struct AppConfig {
    pub streaming_api_endpoint: String,
    pub min_request_delay_ms: u64,

    pub proxy: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            streaming_api_endpoint: STREAMING_API_ENDPOINT.to_string(),
            min_request_delay_ms: MIN_REQUEST_DELAY_MS,
            proxy: None,
        }
    }
}

impl AppConfig {
    #[cfg(feature = "file")]
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let mut config = Self::default();
        if !config.parse_config_file(path.as_ref())? {
            config.write_config_file(path.as_ref())?
        }

        Ok(config)
    }

    #[cfg(not(feature = "file"))]
    pub fn new(_: impl AsRef<Path>) -> Result<Self> {
        let config = Self::default();
        Ok(config)
    }

    // parses configurations from an application config file in `path` folder,
    // then updates the current configurations accordingly.
    // returns false if no config file found and true otherwise
    #[cfg(feature = "file")]
    fn parse_config_file<P: AsRef<Path>>(&mut self, path: P) -> Result<bool> {
        let file_path = path.as_ref().join(APP_CONFIG_FILE);
        match std::fs::read_to_string(file_path) {
            Ok(content) => self
                .parse(toml::from_str::<toml::Value>(&content)?)
                .map(|_| true),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(error) => Err(error.into()),
        }
    }

    #[cfg(feature = "file")]
    fn write_config_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        std::fs::create_dir_all(path.as_ref())?;
        toml::to_string_pretty(&self)
            .map_err(From::from)
            .and_then(|content| {
                std::fs::write(path.as_ref().join(APP_CONFIG_FILE), content).map_err(From::from)
            })
    }

    pub fn proxy_url(&self) -> Option<Url> {
        self.proxy.as_ref().and_then(|proxy| match Url::parse(proxy) {
            Err(err) => {
                tracing::warn!("failed to parse proxy url {proxy}: {err:#}");
                None
            }
            Ok(url) => Some(url),
        })
    }
}

/// gets the application's configuration folder path
#[cfg(feature = "file")]
pub fn get_config_folder_path() -> Result<std::path::PathBuf> {
    match dirs_next::home_dir() {
        Some(_) => Ok(format!("./{}", DEFAULT_CONFIG_FOLDER).into()),
        None => Err(anyhow::anyhow!("cannot find the folder")),
    }
}

#[inline(always)]
pub fn get_config() -> &'static Configs {
    CONFIGS.get().expect("configs is already initialized")
}

pub fn set_config(configs: Configs) {
    CONFIGS
        .set(configs)
        .expect("configs should be initialized only once")
}
