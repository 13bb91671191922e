use std::collections::BTreeSet;

use super::{Catalog, Gender, Voice};

/// Active "show only" selection: OR within a category, AND across categories.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VoiceFilter {
    genders: BTreeSet<Gender>,
    providers: BTreeSet<String>,
}

impl VoiceFilter {
    pub fn genders(&self) -> &BTreeSet<Gender> {
        &self.genders
    }

    pub fn providers(&self) -> &BTreeSet<String> {
        &self.providers
    }

    /// True when no category constrains the catalog.
    pub fn is_unconstrained(&self) -> bool {
        self.genders.is_empty() && self.providers.is_empty()
    }

    /// Number of selected values across both categories.
    pub fn active_count(&self) -> usize {
        self.genders.len() + self.providers.len()
    }

    pub fn matches(&self, voice: &Voice) -> bool {
        let gender_match = self.genders.is_empty()
            || voice
                .gender
                .is_some_and(|gender| self.genders.contains(&gender));
        let provider_match = self.providers.is_empty()
            || voice
                .provider
                .as_ref()
                .is_some_and(|provider| self.providers.contains(provider));
        gender_match && provider_match
    }

    /// Flip a gender in or out of the selection, returning whether it is now selected.
    pub fn toggle_gender(&mut self, gender: Gender) -> bool {
        if self.genders.remove(&gender) {
            false
        } else {
            self.genders.insert(gender);
            true
        }
    }

    /// Flip a provider in or out of the selection, returning whether it is now selected.
    pub fn toggle_provider(&mut self, provider: &str) -> bool {
        let provider = provider.to_lowercase();
        if self.providers.remove(&provider) {
            false
        } else {
            self.providers.insert(provider);
            true
        }
    }

    pub fn clear(&mut self) {
        self.genders.clear();
        self.providers.clear();
    }

    /// Text for the menu button: `Show only…` or `Filtered (n)`.
    pub fn menu_label(&self) -> String {
        match self.active_count() {
            0 => "Show only…".to_string(),
            count => format!("Filtered ({count})"),
        }
    }
}

/// Voices passing `filter`, in catalog order.
pub fn visible<'a>(
    catalog: &'a Catalog,
    filter: &'a VoiceFilter,
) -> impl Iterator<Item = &'a Voice> + 'a {
    catalog
        .voices()
        .iter()
        .filter(move |voice| filter.matches(voice))
}

/// Filter values actually present in a catalog, with how many voices carry each.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub genders: Vec<(Gender, usize)>,
    /// Providers in first-seen catalog order.
    pub providers: Vec<(String, usize)>,
}

impl FilterOptions {
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let mut genders: Vec<(Gender, usize)> = Gender::ALL.iter().map(|&g| (g, 0)).collect();
        let mut providers: Vec<(String, usize)> = Vec::new();
        for voice in catalog.voices() {
            if let Some(gender) = voice.gender
                && let Some(entry) = genders.iter_mut().find(|(g, _)| *g == gender)
            {
                entry.1 += 1;
            }
            if let Some(provider) = voice.provider.as_deref() {
                match providers.iter_mut().find(|(p, _)| p == provider) {
                    Some(entry) => entry.1 += 1,
                    None => providers.push((provider.to_string(), 1)),
                }
            }
        }
        genders.retain(|(_, count)| *count > 0);
        Self { genders, providers }
    }

    pub fn has_gender_data(&self) -> bool {
        !self.genders.is_empty()
    }

    pub fn has_provider_data(&self) -> bool {
        !self.providers.is_empty()
    }

    /// False when the menu would have nothing to offer.
    pub fn any(&self) -> bool {
        self.has_gender_data() || self.has_provider_data()
    }
}

/// Menu label for a provider, e.g. `ElevenLabs voices`.
pub fn provider_label(provider: &str) -> String {
    let name = match provider {
        "elevenlabs" => "ElevenLabs".to_string(),
        "azure" => "Azure".to_string(),
        "openai" => "OpenAI".to_string(),
        other => {
            let mut chars = other.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
    };
    format!("{name} voices")
}
