//! Audio playback capability used to preview voices.
//!
//! The session only ever talks to an [`AudioHandle`]; [`AudioPlayer`] is the
//! rodio-backed implementation used by the desktop app.

use thiserror::Error;

mod fetch;
mod player;
mod source;

pub use player::AudioPlayer;

/// Errors raised while starting playback.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// No output device could be opened.
    #[error("Audio output unavailable: {0}")]
    Output(String),
    /// The audio reference is not a usable path or URL.
    #[error("Unsupported audio location: {0}")]
    InvalidLocation(String),
    /// A local audio file could not be read.
    #[error("Failed to read audio {location}: {source}")]
    Read {
        location: String,
        source: std::io::Error,
    },
    /// A remote audio file could not be fetched.
    #[error("Failed to fetch audio {location}: {source}")]
    Fetch {
        location: String,
        source: Box<ureq::Error>,
    },
    /// The bytes could not be decoded.
    #[error("Audio decode failed for {location}: {reason}")]
    Decode { location: String, reason: String },
}

/// Something that happened to the current source since the last poll.
#[derive(Debug)]
pub enum PlaybackEvent {
    /// The source played to its end.
    Ended,
    /// The source could not be fetched or decoded after `start` returned.
    Failed(PlaybackError),
}

/// Single shared playback resource.
///
/// Implementations hold at most one loaded source; starting a new one
/// replaces whatever was playing or still loading.
pub trait AudioHandle {
    /// Begin playing `source` from the beginning.
    ///
    /// Loading may continue in the background; failures found there are
    /// reported later through [`AudioHandle::poll`].
    fn start(&mut self, source: &str) -> Result<(), PlaybackError>;
    /// Halt playback and rewind, abandoning any pending load. Idle is a no-op.
    fn stop(&mut self);
    /// Drive background loading and report the end or late failure of the
    /// current source. Call once per frame.
    fn poll(&mut self) -> Option<PlaybackEvent>;
}
