//! Loading the static voice list and normalizing it into [`Catalog`] entries.
//!
//! Records are accepted leniently: every field is optional and malformed
//! values fall back to placeholders instead of failing the whole load. Only an
//! unreachable source, invalid JSON, or a top-level value that is not a list
//! is treated as a [`LoadError`].

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use super::{Catalog, Gender, Voice, VoiceId, VoiceStatus};
use crate::http_client;

/// Upper bound for a catalog download.
const MAX_CATALOG_BYTES: usize = 8 * 1024 * 1024;

/// Errors raised while fetching or parsing a catalog.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The catalog file could not be read.
    #[error("Failed to read catalog {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The catalog URL could not be fetched.
    #[error("Failed to fetch catalog {url}: {source}")]
    Fetch {
        url: String,
        source: Box<ureq::Error>,
    },
    /// The response body could not be read or was too large.
    #[error("Failed to read catalog response from {url}: {source}")]
    Body {
        url: String,
        source: std::io::Error,
    },
    /// The payload was not valid JSON.
    #[error("Catalog {origin} is not valid JSON: {source}")]
    Parse {
        origin: String,
        source: serde_json::Error,
    },
    /// The payload was JSON but not a list of records.
    #[error("Catalog {origin} is not a list of voices")]
    NotAList { origin: String },
}

/// Where the catalog is read from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CatalogSource {
    File(PathBuf),
    Remote(Url),
}

impl CatalogSource {
    /// Interpret a configured location; relative paths resolve against `base_dir`.
    pub fn parse(raw: &str, base_dir: &Path) -> Self {
        let trimmed = raw.trim();
        if let Some(url) = parse_absolute_url(trimmed) {
            if url.scheme() == "file" {
                if let Ok(path) = url.to_file_path() {
                    return CatalogSource::File(path);
                }
            } else {
                return CatalogSource::Remote(url);
            }
        }
        CatalogSource::File(base_dir.join(trimmed))
    }

    /// Asset base used when the configuration does not name one.
    pub fn default_asset_base(&self) -> AssetBase {
        match self {
            CatalogSource::File(path) => AssetBase::Dir(
                path.parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from(".")),
            ),
            CatalogSource::Remote(url) => AssetBase::Url(url.clone()),
        }
    }
}

impl fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogSource::File(path) => write!(f, "{}", path.display()),
            CatalogSource::Remote(url) => write!(f, "{url}"),
        }
    }
}

/// Root that relative audio references are resolved against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssetBase {
    Dir(PathBuf),
    Url(Url),
}

impl AssetBase {
    /// Interpret a configured asset base; relative paths resolve against `base_dir`.
    pub fn parse(raw: &str, base_dir: &Path) -> Self {
        let trimmed = raw.trim();
        if let Some(mut url) = parse_absolute_url(trimmed) {
            if url.scheme() == "file" {
                if let Ok(path) = url.to_file_path() {
                    return AssetBase::Dir(path);
                }
            } else {
                if !url.path().ends_with('/') {
                    let path = format!("{}/", url.path());
                    url.set_path(&path);
                }
                return AssetBase::Url(url);
            }
        }
        AssetBase::Dir(base_dir.join(trimmed))
    }

    /// Resolve an audio reference from the catalog into a playable location.
    ///
    /// Absolute URLs pass through untouched; a leading `/` is treated as
    /// relative to the base rather than the filesystem root.
    pub fn resolve(&self, reference: &str) -> String {
        if parse_absolute_url(reference).is_some() {
            return reference.to_string();
        }
        let clean = reference.strip_prefix('/').unwrap_or(reference);
        match self {
            AssetBase::Dir(dir) => dir.join(clean).to_string_lossy().into_owned(),
            AssetBase::Url(base) => base
                .join(clean)
                .map(|url| url.to_string())
                .unwrap_or_else(|_| clean.to_string()),
        }
    }
}

fn parse_absolute_url(raw: &str) -> Option<Url> {
    let lower = raw.to_ascii_lowercase();
    if ["http://", "https://", "file://"]
        .iter()
        .any(|prefix| lower.starts_with(prefix))
    {
        Url::parse(raw).ok()
    } else {
        None
    }
}

/// Fetch and normalize the catalog.
///
/// `asset_base` overrides where relative audio references point; by default
/// they resolve next to the catalog itself.
pub fn load(source: &CatalogSource, asset_base: Option<&AssetBase>) -> Result<Catalog, LoadError> {
    let bytes = read_source(source)?;
    let base = asset_base
        .cloned()
        .unwrap_or_else(|| source.default_asset_base());
    let catalog = parse_catalog(&bytes, &source.to_string(), &base)?;
    info!("Loaded {} voices from {source}", catalog.len());
    Ok(catalog)
}

fn read_source(source: &CatalogSource) -> Result<Vec<u8>, LoadError> {
    match source {
        CatalogSource::File(path) => std::fs::read(path).map_err(|source| LoadError::Read {
            path: path.clone(),
            source,
        }),
        CatalogSource::Remote(url) => {
            let response = http_client::agent()
                .get(url.as_str())
                .call()
                .map_err(|source| LoadError::Fetch {
                    url: url.to_string(),
                    source: Box::new(source),
                })?;
            http_client::read_response_bytes(response, MAX_CATALOG_BYTES).map_err(|source| {
                LoadError::Body {
                    url: url.to_string(),
                    source,
                }
            })
        }
    }
}

/// Parse raw catalog bytes; `origin` only feeds error messages.
pub fn parse_catalog(bytes: &[u8], origin: &str, base: &AssetBase) -> Result<Catalog, LoadError> {
    let data: Value = serde_json::from_slice(bytes).map_err(|source| LoadError::Parse {
        origin: origin.to_string(),
        source,
    })?;
    let Value::Array(records) = data else {
        return Err(LoadError::NotAList {
            origin: origin.to_string(),
        });
    };
    let mut seen = HashSet::with_capacity(records.len());
    let voices = records
        .iter()
        .enumerate()
        .map(|(index, record)| normalize_record(index, record, base, &mut seen))
        .collect();
    Ok(Catalog::new(voices))
}

fn normalize_record(
    index: usize,
    record: &Value,
    base: &AssetBase,
    seen: &mut HashSet<VoiceId>,
) -> Voice {
    if !record.is_object() {
        debug!("Catalog entry {index} is not an object; using placeholders");
    }
    let id = match scalar_text(record.get("id")) {
        Some(id) if !seen.contains(&VoiceId::new(id.clone())) => VoiceId::new(id),
        Some(duplicate) => {
            warn!("Duplicate voice id {duplicate:?} at position {index}; assigning a new id");
            synthesize_id(index, seen)
        }
        None => synthesize_id(index, seen),
    };
    seen.insert(id.clone());

    let label = scalar_text(record.get("label")).unwrap_or_else(|| format!("Voice {}", index + 1));
    let audio_src = record
        .get("audioSrc")
        .and_then(Value::as_str)
        .filter(|src| !src.trim().is_empty())
        .map(|src| base.resolve(src));
    let gender = record
        .get("gender")
        .and_then(Value::as_str)
        .and_then(Gender::parse);
    let provider = record
        .get("provider")
        .and_then(Value::as_str)
        .map(str::to_lowercase)
        .filter(|provider| !provider.is_empty());

    Voice {
        id,
        label,
        audio_src,
        bg_index: index,
        gender,
        provider,
        status: VoiceStatus::None,
    }
}

fn scalar_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn synthesize_id(index: usize, seen: &HashSet<VoiceId>) -> VoiceId {
    loop {
        let suffix: u32 = rand::random();
        let candidate = VoiceId::new(format!("v{:03}-{suffix:x}", index + 1));
        if !seen.contains(&candidate) {
            return candidate;
        }
    }
}
