//! voicedeck: browse a deck of synthetic voice samples, triage them into a
//! shortlist and rank the keepers.
//!
//! The browsing rules live in [`session`] and are independent of the UI; the
//! egui front end in [`egui_app`] only calls into it.

/// Application directory helpers.
pub mod app_dirs;
/// Audio playback through rodio.
pub mod audio;
/// `config.toml` handling.
pub mod config;
/// egui front end.
pub mod egui_app;
mod http_client;
/// Tracing setup.
pub mod logging;
/// Deck state machine: cursor, filter, triage, ranking and playback.
pub mod session;
/// Voice records, catalog loading and filtering.
pub mod voices;
