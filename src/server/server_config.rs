use std::{fs, path::{Path, PathBuf}};
use serde::{Serialize, Deserialize};
use toml;
use anyhow::{self, Context};
use log::info;

use smokefree::money::DEFAULT_CURRENCY;

#[derive(Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory holding the dashboard and community pages
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig { host: default_host(), port: default_port(), static_dir: default_static_dir() }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_store_path")]
    pub path: PathBuf
}

fn default_store_path() -> PathBuf {
    PathBuf::from("data/ledger.json")
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig { path: default_store_path() }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_currency")]
    pub currency: String
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig { currency: default_currency() }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub display: DisplayConfig
}

impl AppConfig {
    pub fn read(filepath: impl AsRef<Path>) -> anyhow::Result<Self> {
        let file_content = fs::read_to_string(filepath)
            .with_context(|| "failed to read config file")?;
        let config = toml::from_str(&file_content)
            .with_context(|| "failed to parse config file")?;
        return Ok(config);
    }

    /// Like `read`, but a missing file means all defaults.
    pub fn read_or_default(filepath: impl AsRef<Path>) -> anyhow::Result<Self> {
        let filepath = filepath.as_ref();
        if !filepath.exists() {
            info!("no config at {}, using defaults", filepath.display());
            return Ok(AppConfig::default());
        }
        return AppConfig::read(filepath);
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
