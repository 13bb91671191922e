use std::fmt;
use std::path::PathBuf;

use url::Url;

use super::PlaybackError;
use crate::http_client;

/// Upper bound for a single preview download.
const MAX_AUDIO_BYTES: usize = 64 * 1024 * 1024;

/// Resolved place to read preview audio from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AudioLocation {
    File(PathBuf),
    Remote(Url),
}

impl AudioLocation {
    /// Interpret a resolved audio reference from the catalog.
    pub fn parse(raw: &str) -> Result<Self, PlaybackError> {
        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            let url = Url::parse(raw).map_err(|_| PlaybackError::InvalidLocation(raw.into()))?;
            return Ok(AudioLocation::Remote(url));
        }
        if lower.starts_with("file://") {
            let path = Url::parse(raw)
                .ok()
                .and_then(|url| url.to_file_path().ok())
                .ok_or_else(|| PlaybackError::InvalidLocation(raw.into()))?;
            return Ok(AudioLocation::File(path));
        }
        if raw.trim().is_empty() {
            return Err(PlaybackError::InvalidLocation(raw.into()));
        }
        Ok(AudioLocation::File(PathBuf::from(raw)))
    }
}

impl fmt::Display for AudioLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioLocation::File(path) => write!(f, "{}", path.display()),
            AudioLocation::Remote(url) => write!(f, "{url}"),
        }
    }
}

/// Read the full encoded audio into memory.
pub fn read_audio_bytes(location: &AudioLocation) -> Result<Vec<u8>, PlaybackError> {
    match location {
        AudioLocation::File(path) => std::fs::read(path).map_err(|source| PlaybackError::Read {
            location: location.to_string(),
            source,
        }),
        AudioLocation::Remote(url) => {
            let response = http_client::agent()
                .get(url.as_str())
                .call()
                .map_err(|source| PlaybackError::Fetch {
                    location: location.to_string(),
                    source: Box::new(source),
                })?;
            http_client::read_response_bytes(response, MAX_AUDIO_BYTES).map_err(|source| {
                PlaybackError::Read {
                    location: location.to_string(),
                    source,
                }
            })
        }
    }
}
