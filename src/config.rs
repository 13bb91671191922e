//! `config.toml` loading and saving.
//!
//! Config keys: `catalog`, `asset_base`, `card_backgrounds`, `app_background`,
//! `volume`. Relative paths resolve against the `.voicedeck` directory.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::app_dirs;
use crate::voices::{AssetBase, CatalogSource};

/// Name of the settings file inside the app directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";
const DEFAULT_CATALOG: &str = "voices.json";

/// Errors that may occur while loading or saving app configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unable to create config directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config at {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to serialize config to TOML at {path}: {source}")]
    SerializeToml {
        path: PathBuf,
        source: toml::ser::Error,
    },
    #[error("No suitable config directory found")]
    NoConfigDir,
}

/// User-editable settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Catalog location: a path or an http(s)/file URL.
    #[serde(default = "default_catalog")]
    pub catalog: String,
    /// Base that relative `audioSrc` values resolve against. Defaults to the
    /// catalog's own location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_base: Option<String>,
    #[serde(default)]
    pub card_backgrounds: Vec<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_background: Option<PathBuf>,
    #[serde(default = "default_volume")]
    pub volume: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog: default_catalog(),
            asset_base: None,
            card_backgrounds: Vec::new(),
            app_background: None,
            volume: default_volume(),
        }
    }
}

impl AppConfig {
    pub fn normalized(mut self) -> Self {
        self.volume = clamp_volume(self.volume);
        self.catalog = self.catalog.trim().to_string();
        if self.catalog.is_empty() {
            self.catalog = default_catalog();
        }
        self.asset_base = self
            .asset_base
            .map(|base| base.trim().to_string())
            .filter(|base| !base.is_empty());
        self
    }

    pub fn catalog_source(&self, root: &Path) -> CatalogSource {
        CatalogSource::parse(&self.catalog, root)
    }

    pub fn asset_base(&self, root: &Path) -> Option<AssetBase> {
        self.asset_base
            .as_deref()
            .map(|base| AssetBase::parse(base, root))
    }

    pub fn card_background_paths(&self, root: &Path) -> Vec<PathBuf> {
        self.card_backgrounds
            .iter()
            .map(|path| resolve_path(root, path))
            .collect()
    }

    pub fn app_background_path(&self, root: &Path) -> Option<PathBuf> {
        self.app_background
            .as_deref()
            .map(|path| resolve_path(root, path))
    }
}

fn resolve_path(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

fn default_catalog() -> String {
    DEFAULT_CATALOG.to_string()
}

fn default_volume() -> f32 {
    1.0
}

fn clamp_volume(volume: f32) -> f32 {
    if volume.is_finite() {
        volume.clamp(0.0, 1.0)
    } else {
        default_volume()
    }
}

/// Resolve the configuration file path, ensuring the parent directory exists.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let dir = app_dirs::app_root_dir().map_err(map_app_dir_error)?;
    Ok(dir.join(CONFIG_FILE_NAME))
}

/// Load `config.toml`, writing a default file first if there is none.
pub fn load_or_default() -> Result<AppConfig, ConfigError> {
    let path = config_path()?;
    if !path.exists() {
        let config = AppConfig::default();
        save_to_path(&config, &path)?;
        info!("Wrote default config to {}", path.display());
        return Ok(config);
    }
    load_from(&path)
}

pub fn load_from(path: &Path) -> Result<AppConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str::<AppConfig>(&text)
        .map(AppConfig::normalized)
        .map_err(|source| ConfigError::ParseToml {
            path: path.to_path_buf(),
            source,
        })
}

/// Save configuration to a specific path, creating parent directories as needed.
pub fn save_to_path(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    let dir = path.parent().unwrap_or(Path::new("."));
    std::fs::create_dir_all(dir).map_err(|source| ConfigError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;
    let data = toml::to_string_pretty(config).map_err(|source| ConfigError::SerializeToml {
        path: path.to_path_buf(),
        source,
    })?;
    atomic_write(dir, path, data.as_bytes())
}

/// Write through a sibling temp file so a crash never leaves a torn config.
fn atomic_write(dir: &Path, path: &Path, data: &[u8]) -> Result<(), ConfigError> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| CONFIG_FILE_NAME.to_string());
    let tmp_path = dir.join(format!("{file_name}.tmp-{:08x}", rand::random::<u32>()));
    let write = |tmp: &Path| -> std::io::Result<()> {
        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(tmp)?;
        file.write_all(data)?;
        file.sync_all()
    };
    if let Err(source) = write(&tmp_path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(ConfigError::Write {
            path: tmp_path,
            source,
        });
    }
    std::fs::rename(&tmp_path, path).map_err(|source| {
        let _ = std::fs::remove_file(&tmp_path);
        ConfigError::Write {
            path: path.to_path_buf(),
            source,
        }
    })
}

fn map_app_dir_error(error: app_dirs::AppDirError) -> ConfigError {
    match error {
        app_dirs::AppDirError::NoBaseDir => ConfigError::NoConfigDir,
        app_dirs::AppDirError::CreateDir { path, source } => {
            ConfigError::CreateDir { path, source }
        }
    }
}
