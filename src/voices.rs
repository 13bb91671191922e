//! Voice records and the catalog they are browsed from.

use std::collections::HashMap;
use std::fmt;

/// Catalog loading and record normalization.
pub mod catalog;
/// Gender/provider filtering of the catalog.
pub mod filter;

pub use catalog::{AssetBase, CatalogSource, LoadError, load, parse_catalog};
pub use filter::{FilterOptions, VoiceFilter, provider_label, visible};

/// Unique identifier of a voice inside a catalog.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoiceId(String);

impl VoiceId {
    /// Wrap a raw identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VoiceId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Gender tag carried by a voice record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// All known genders in menu order.
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    /// Parse a gender case-insensitively; anything but male/female is rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_lowercase().as_str() {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            _ => None,
        }
    }

    /// Lowercase wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    /// Label used by the filter menu.
    pub fn menu_label(self) -> &'static str {
        match self {
            Gender::Male => "Male Voices",
            Gender::Female => "Female Voices",
        }
    }
}

/// Triage state of a single voice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum VoiceStatus {
    #[default]
    None,
    Skipped,
    Shortlisted,
}

impl VoiceStatus {
    /// Pill text shown on the card, `None` for untouched voices.
    pub fn pill_label(self) -> Option<&'static str> {
        match self {
            VoiceStatus::None => None,
            VoiceStatus::Skipped => Some("Skipped"),
            VoiceStatus::Shortlisted => Some("Shortlisted"),
        }
    }
}

/// A single browsable voice sample.
#[derive(Clone, Debug, PartialEq)]
pub struct Voice {
    pub id: VoiceId,
    pub label: String,
    /// Resolved audio reference (path or URL); `None` disables playback.
    pub audio_src: Option<String>,
    /// Source position, used only to pick a decorative background.
    pub bg_index: usize,
    pub gender: Option<Gender>,
    /// Lowercase provider name, e.g. `elevenlabs`.
    pub provider: Option<String>,
    pub status: VoiceStatus,
}

impl Voice {
    /// Create an untagged voice with no audio, gender or provider.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: VoiceId::new(id),
            label: label.into(),
            audio_src: None,
            bg_index: 0,
            gender: None,
            provider: None,
            status: VoiceStatus::None,
        }
    }

    pub fn with_audio(mut self, src: impl Into<String>) -> Self {
        self.audio_src = Some(src.into());
        self
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into().to_lowercase());
        self
    }

    pub fn with_status(mut self, status: VoiceStatus) -> Self {
        self.status = status;
        self
    }

    /// True when the voice has something to play.
    pub fn has_audio(&self) -> bool {
        self.audio_src.is_some()
    }
}

/// Ordered set of voices as loaded from the source, with id lookup.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    voices: Vec<Voice>,
    lookup: HashMap<VoiceId, usize>,
}

impl Catalog {
    /// Build a catalog, keeping the first voice when ids collide.
    pub fn new(voices: Vec<Voice>) -> Self {
        let mut lookup = HashMap::with_capacity(voices.len());
        for (index, voice) in voices.iter().enumerate() {
            lookup.entry(voice.id.clone()).or_insert(index);
        }
        Self { voices, lookup }
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    pub fn get(&self, id: &VoiceId) -> Option<&Voice> {
        self.lookup.get(id).and_then(|&index| self.voices.get(index))
    }

    pub(crate) fn get_mut(&mut self, id: &VoiceId) -> Option<&mut Voice> {
        let index = *self.lookup.get(id)?;
        self.voices.get_mut(index)
    }

    pub fn contains(&self, id: &VoiceId) -> bool {
        self.lookup.contains_key(id)
    }

    pub fn has_gender(&self, gender: Gender) -> bool {
        self.voices.iter().any(|voice| voice.gender == Some(gender))
    }

    pub fn has_provider(&self, provider: &str) -> bool {
        self.voices
            .iter()
            .any(|voice| voice.provider.as_deref() == Some(provider))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gender_parse_is_case_insensitive_and_strict() {
        assert_eq!(Gender::parse("MALE"), Some(Gender::Male));
        assert_eq!(Gender::parse("Female"), Some(Gender::Female));
        assert_eq!(Gender::parse("nonbinary"), None);
        assert_eq!(Gender::parse(""), None);
    }

    #[test]
    fn catalog_lookup_keeps_first_duplicate() {
        let catalog = Catalog::new(vec![
            Voice::new("a", "First"),
            Voice::new("a", "Second"),
            Voice::new("b", "Third"),
        ]);
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.get(&VoiceId::from("a")).unwrap().label, "First");
        assert!(catalog.contains(&VoiceId::from("b")));
        assert!(!catalog.contains(&VoiceId::from("c")));
    }

    #[test]
    fn provider_builder_lowercases() {
        let voice = Voice::new("a", "A").with_provider("Azure");
        assert_eq!(voice.provider.as_deref(), Some("azure"));
    }
}
