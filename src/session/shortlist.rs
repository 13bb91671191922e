use std::collections::HashSet;

use crate::voices::{Catalog, Voice, VoiceId, VoiceStatus};

/// User-ranked sequence of shortlisted ids, kept apart from the status flags
/// so manual ordering survives status changes elsewhere.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShortlistOrder {
    ids: Vec<VoiceId>,
}

impl ShortlistOrder {
    pub fn ids(&self) -> &[VoiceId] {
        &self.ids
    }

    pub fn contains(&self, id: &VoiceId) -> bool {
        self.ids.contains(id)
    }

    /// Append `id` unless present; the first-added position wins.
    pub fn insert(&mut self, id: VoiceId) -> bool {
        if self.contains(&id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    pub fn remove(&mut self, id: &VoiceId) -> bool {
        let before = self.ids.len();
        self.ids.retain(|existing| existing != id);
        self.ids.len() != before
    }

    /// Replace the whole order. Repeated ids keep their first position.
    pub fn replace(&mut self, ids: impl IntoIterator<Item = VoiceId>) {
        let mut seen = HashSet::new();
        self.ids = ids
            .into_iter()
            .filter(|id| seen.insert(id.clone()))
            .collect();
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Ordered voices followed by any shortlisted voice the order does not
    /// know about, in catalog order.
    pub fn effective<'a>(&self, catalog: &'a Catalog) -> Vec<&'a Voice> {
        let mut voices: Vec<&Voice> = self.ids.iter().filter_map(|id| catalog.get(id)).collect();
        voices.extend(
            catalog
                .voices()
                .iter()
                .filter(|voice| voice.status == VoiceStatus::Shortlisted && !self.contains(&voice.id)),
        );
        voices
    }
}

/// Move `dragged` to the slot held by `target`, shifting the items between.
///
/// Returns `None` for a drop onto itself or when either id is not in `items`.
pub fn move_onto(items: &[VoiceId], dragged: &VoiceId, target: &VoiceId) -> Option<Vec<VoiceId>> {
    if dragged == target {
        return None;
    }
    let from = items.iter().position(|id| id == dragged)?;
    let to = items.iter().position(|id| id == target)?;
    let mut next = items.to_vec();
    let moved = next.remove(from);
    next.insert(to, moved);
    Some(next)
}
