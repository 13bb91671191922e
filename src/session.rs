//! Browsing session: deck navigation, filtering, triage status, the ranked
//! shortlist and the shared playback handle, behind one mutation surface.
//!
//! Derived views (the visible set, the effective shortlist) are recomputed on
//! every read so they can never drift from the catalog and filter.

use tracing::{debug, info};

use crate::audio::{AudioHandle, PlaybackError};
use crate::voices::{self, Catalog, FilterOptions, Gender, Voice, VoiceFilter, VoiceId, VoiceStatus};

/// Deck position tracking.
pub mod cursor;
/// Single-voice playback state machine.
pub mod playback;
/// Ranked shortlist bookkeeping.
pub mod shortlist;
#[cfg(test)]
pub(crate) mod test_support;

pub use cursor::Cursor;
pub use playback::{PlaybackController, PlaybackState};
pub use shortlist::{ShortlistOrder, move_onto};

/// Which screen the session is on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Stage {
    /// One card at a time with triage controls.
    #[default]
    Browse,
    /// Drag-to-rank list of the shortlist.
    Rank,
}

/// Why the browse stage has no card to show.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmptyState {
    NoVoicesLoaded,
    NoMatches,
}

impl EmptyState {
    pub fn message(self) -> &'static str {
        match self {
            EmptyState::NoVoicesLoaded => "No voices loaded",
            EmptyState::NoMatches => "No voices match these filters",
        }
    }
}

/// All mutable state of one browsing session.
pub struct Session {
    catalog: Catalog,
    filter: VoiceFilter,
    cursor: Cursor,
    shortlist: ShortlistOrder,
    stage: Stage,
    playback: PlaybackController,
}

impl Session {
    /// Start an empty session that plays through `audio`.
    pub fn new(audio: Box<dyn AudioHandle>) -> Self {
        Self {
            catalog: Catalog::default(),
            filter: VoiceFilter::default(),
            cursor: Cursor::default(),
            shortlist: ShortlistOrder::default(),
            stage: Stage::Browse,
            playback: PlaybackController::new(audio),
        }
    }

    /// Start a session over an already loaded catalog.
    pub fn with_catalog(catalog: Catalog, audio: Box<dyn AudioHandle>) -> Self {
        let mut session = Self::new(audio);
        session.apply_catalog(catalog);
        session
    }

    /// Replace the catalog and reset everything that depended on the old one.
    pub fn apply_catalog(&mut self, catalog: Catalog) {
        self.playback.stop();
        self.catalog = catalog;
        self.cursor.reset();
        self.stage = Stage::Browse;
        self.shortlist.clear();
        self.filter.clear();
        info!("Session reset with {} voices", self.catalog.len());
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn filter(&self) -> &VoiceFilter {
        &self.filter
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn cursor(&self) -> usize {
        self.cursor.index()
    }

    pub fn shortlist_order(&self) -> &[VoiceId] {
        self.shortlist.ids()
    }

    pub fn playback_state(&self) -> &PlaybackState {
        self.playback.state()
    }

    pub fn is_playing(&self, id: &VoiceId) -> bool {
        self.playback.is_playing(id)
    }

    pub fn visible_len(&self) -> usize {
        voices::visible(&self.catalog, &self.filter).count()
    }

    /// Voice under the cursor, if any is visible.
    pub fn current(&self) -> Option<&Voice> {
        voices::visible(&self.catalog, &self.filter).nth(self.cursor.index())
    }

    /// One-based `(position, total)` for the card counter.
    pub fn counter(&self) -> Option<(usize, usize)> {
        self.cursor.counter(self.visible_len())
    }

    pub fn can_prev(&self) -> bool {
        self.cursor.can_prev()
    }

    pub fn can_next(&self) -> bool {
        self.cursor.can_next(self.visible_len())
    }

    pub fn empty_state(&self) -> Option<EmptyState> {
        if self.catalog.is_empty() {
            Some(EmptyState::NoVoicesLoaded)
        } else if self.visible_len() == 0 {
            Some(EmptyState::NoMatches)
        } else {
            None
        }
    }

    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions::from_catalog(&self.catalog)
    }

    /// Toggle a gender filter; values absent from the catalog are refused.
    pub fn toggle_gender(&mut self, gender: Gender) -> bool {
        if !self.catalog.has_gender(gender) {
            debug!("Ignoring gender filter {}: not in catalog", gender.as_str());
            return false;
        }
        self.filter.toggle_gender(gender);
        self.clamp_cursor();
        true
    }

    /// Toggle a provider filter; values absent from the catalog are refused.
    pub fn toggle_provider(&mut self, provider: &str) -> bool {
        let provider = provider.to_lowercase();
        if !self.catalog.has_provider(&provider) {
            debug!("Ignoring provider filter {provider}: not in catalog");
            return false;
        }
        self.filter.toggle_provider(&provider);
        self.clamp_cursor();
        true
    }

    pub fn clear_filters(&mut self) {
        self.filter.clear();
        self.clamp_cursor();
    }

    fn clamp_cursor(&mut self) {
        let len = self.visible_len();
        self.cursor.clamp(len);
    }

    pub fn prev(&mut self) {
        self.playback.stop();
        self.cursor.step_back();
    }

    pub fn next(&mut self) {
        self.playback.stop();
        let len = self.visible_len();
        self.cursor.step_forward(len);
    }

    /// Advance without touching playback.
    pub fn auto_advance(&mut self) {
        let len = self.visible_len();
        self.cursor.step_forward(len);
    }

    /// Tag a voice and keep the shortlist order in step with it.
    ///
    /// Stops playback, then advances unless the cursor already sits on the
    /// last visible voice. Unknown ids are ignored and return false.
    pub fn set_status(&mut self, id: &VoiceId, status: VoiceStatus) -> bool {
        let Some(voice) = self.catalog.get_mut(id) else {
            return false;
        };
        voice.status = status;
        match status {
            VoiceStatus::Shortlisted => {
                self.shortlist.insert(id.clone());
            }
            VoiceStatus::None | VoiceStatus::Skipped => {
                self.shortlist.remove(id);
            }
        }
        debug!("Voice {id} marked {status:?}");
        self.playback.stop();
        if self.cursor.can_next(self.visible_len()) {
            self.auto_advance();
        }
        true
    }

    /// Flip the current voice between skipped and untagged.
    pub fn toggle_skip(&mut self) -> bool {
        self.toggle_current(VoiceStatus::Skipped)
    }

    /// Flip the current voice between shortlisted and untagged.
    pub fn toggle_shortlist(&mut self) -> bool {
        self.toggle_current(VoiceStatus::Shortlisted)
    }

    fn toggle_current(&mut self, status: VoiceStatus) -> bool {
        let Some(current) = self.current() else {
            return false;
        };
        let next = if current.status == status {
            VoiceStatus::None
        } else {
            status
        };
        let id = current.id.clone();
        self.set_status(&id, next)
    }

    /// Ranked shortlist, including shortlisted voices the order never saw.
    pub fn effective_shortlist(&self) -> Vec<&Voice> {
        self.shortlist.effective(&self.catalog)
    }

    pub fn has_shortlist(&self) -> bool {
        !self.effective_shortlist().is_empty()
    }

    /// Replace the ranked order wholesale.
    pub fn reorder_shortlist(&mut self, ids: impl IntoIterator<Item = VoiceId>) {
        self.shortlist.replace(ids);
    }

    /// Drop `dragged` onto `target` in the ranked list.
    pub fn move_shortlist_item(&mut self, dragged: &VoiceId, target: &VoiceId) -> bool {
        let items: Vec<VoiceId> = self
            .effective_shortlist()
            .into_iter()
            .map(|voice| voice.id.clone())
            .collect();
        match move_onto(&items, dragged, target) {
            Some(next) => {
                self.reorder_shortlist(next);
                true
            }
            None => false,
        }
    }

    /// Play or stop the given voice.
    pub fn toggle_playback(&mut self, id: &VoiceId) -> Result<(), PlaybackError> {
        let Some(voice) = self.catalog.get(id) else {
            return Ok(());
        };
        self.playback.toggle(voice)
    }

    pub fn toggle_current_playback(&mut self) -> Result<(), PlaybackError> {
        let Some(voice) = self.current() else {
            return Ok(());
        };
        let id = voice.id.clone();
        self.toggle_playback(&id)
    }

    /// Pick up end-of-audio from the handle; call once per frame.
    pub fn poll_playback(&mut self) -> Option<VoiceId> {
        self.playback.poll()
    }

    /// Switch to the rank stage when there is something to rank.
    pub fn open_shortlist(&mut self) -> bool {
        if !self.has_shortlist() {
            return false;
        }
        self.playback.stop();
        self.stage = Stage::Rank;
        true
    }

    pub fn return_to_browse(&mut self) {
        self.playback.stop();
        self.stage = Stage::Browse;
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.playback.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{HandleCall, HandleProbe, RecordingHandle};
    use super::*;

    fn session_with(voices: Vec<Voice>) -> (Session, HandleProbe) {
        let (handle, probe) = RecordingHandle::new();
        (Session::with_catalog(Catalog::new(voices), Box::new(handle)), probe)
    }

    fn three_voices() -> Vec<Voice> {
        vec![
            Voice::new("v1", "Voice 1").with_audio("v1.wav"),
            Voice::new("v2", "Voice 2").with_audio("v2.wav"),
            Voice::new("v3", "Voice 3").with_audio("v3.wav"),
        ]
    }

    fn mixed_voices() -> Vec<Voice> {
        vec![
            Voice::new("m1", "M1")
                .with_gender(Gender::Male)
                .with_provider("azure")
                .with_audio("m1.wav"),
            Voice::new("f1", "F1")
                .with_gender(Gender::Female)
                .with_provider("elevenlabs"),
            Voice::new("m2", "M2")
                .with_gender(Gender::Male)
                .with_provider("elevenlabs"),
            Voice::new("f2", "F2").with_gender(Gender::Female),
        ]
    }

    fn effective_ids(session: &Session) -> Vec<&str> {
        session
            .effective_shortlist()
            .iter()
            .map(|voice| voice.id.as_str())
            .collect()
    }

    fn assert_cursor_invariant(session: &Session) {
        let len = session.visible_len();
        assert!(session.cursor() < len.max(1), "cursor {} len {len}", session.cursor());
    }

    #[test]
    fn triage_scenario_builds_ordered_shortlist() {
        let (mut session, _) = session_with(three_voices());
        assert!(session.toggle_shortlist());
        assert_eq!(session.cursor(), 1);
        assert!(session.toggle_skip());
        assert_eq!(session.cursor(), 2);
        assert!(session.toggle_shortlist());

        assert_eq!(effective_ids(&session), vec!["v1", "v3"]);
        assert_eq!(
            session.catalog().get(&"v2".into()).unwrap().status,
            VoiceStatus::Skipped
        );
        assert_eq!(session.cursor(), 2);
        assert_eq!(session.visible_len(), 3);
    }

    #[test]
    fn shortlisting_twice_records_id_once() {
        let (mut session, _) = session_with(three_voices());
        let id = VoiceId::from("v2");
        session.set_status(&id, VoiceStatus::Shortlisted);
        session.set_status(&id, VoiceStatus::Shortlisted);
        assert_eq!(session.shortlist_order(), &[id]);
    }

    #[test]
    fn unshortlisting_preserves_others_order() {
        let (mut session, _) = session_with(three_voices());
        for id in ["v3", "v1", "v2"] {
            session.set_status(&id.into(), VoiceStatus::Shortlisted);
        }
        session.set_status(&"v1".into(), VoiceStatus::None);
        let order: Vec<_> = session.shortlist_order().iter().map(VoiceId::as_str).collect();
        assert_eq!(order, vec!["v3", "v2"]);
        session.set_status(&"v3".into(), VoiceStatus::Skipped);
        assert_eq!(effective_ids(&session), vec!["v2"]);
    }

    #[test]
    fn toggle_shortlist_twice_on_last_card_clears_status() {
        let (mut session, _) = session_with(three_voices());
        session.next();
        session.next();
        session.toggle_shortlist();
        assert_eq!(session.cursor(), 2);
        session.toggle_shortlist();
        assert_eq!(session.current().unwrap().status, VoiceStatus::None);
        assert!(session.shortlist_order().is_empty());
    }

    #[test]
    fn toggles_only_touch_the_current_voice() {
        let (mut session, _) = session_with(three_voices());
        session.toggle_skip();
        let statuses: Vec<_> = session.catalog().voices().iter().map(|v| v.status).collect();
        assert_eq!(
            statuses,
            vec![VoiceStatus::Skipped, VoiceStatus::None, VoiceStatus::None]
        );
    }

    #[test]
    fn set_status_for_unknown_id_is_ignored() {
        let (mut session, _) = session_with(three_voices());
        assert!(!session.set_status(&"nope".into(), VoiceStatus::Shortlisted));
        assert_eq!(session.cursor(), 0);
        assert!(session.shortlist_order().is_empty());
    }

    #[test]
    fn navigation_clamps_at_bounds_and_stops_audio() {
        let (mut session, probe) = session_with(three_voices());
        session.prev();
        assert_eq!(session.cursor(), 0);
        session.toggle_current_playback().unwrap();
        session.next();
        assert_eq!(session.playback_state(), &PlaybackState::Idle);
        session.next();
        session.next();
        assert_eq!(session.cursor(), 2);
        assert!(!session.can_next());
        assert!(session.can_prev());
        assert_eq!(probe.calls(), vec![HandleCall::Start("v1.wav".into()), HandleCall::Stop]);
    }

    #[test]
    fn auto_advance_keeps_playing() {
        let (mut session, _) = session_with(three_voices());
        session.toggle_current_playback().unwrap();
        session.auto_advance();
        assert_eq!(session.cursor(), 1);
        assert!(session.is_playing(&"v1".into()));
    }

    #[test]
    fn status_change_stops_playback() {
        let (mut session, _) = session_with(three_voices());
        session.toggle_current_playback().unwrap();
        session.toggle_shortlist();
        assert_eq!(session.playback_state(), &PlaybackState::Idle);
    }

    #[test]
    fn filter_excluding_current_clamps_cursor() {
        let (mut session, _) = session_with(mixed_voices());
        session.next();
        session.next();
        session.next();
        assert_eq!(session.current().unwrap().id.as_str(), "f2");

        assert!(session.toggle_provider("azure"));
        assert_eq!(session.cursor(), 0);
        assert_eq!(session.current().unwrap().id.as_str(), "m1");

        assert!(session.toggle_gender(Gender::Female));
        assert_eq!(session.visible_len(), 0);
        assert_eq!(session.cursor(), 0);
        assert!(session.current().is_none());
        assert_eq!(session.empty_state(), Some(EmptyState::NoMatches));
        assert_eq!(session.counter(), None);
        assert!(!session.toggle_skip());

        session.clear_filters();
        assert_eq!(session.visible_len(), 4);
        assert!(session.empty_state().is_none());
    }

    #[test]
    fn cursor_invariant_survives_mutation_sequences() {
        let (mut session, _) = session_with(mixed_voices());
        let steps: Vec<Box<dyn Fn(&mut Session)>> = vec![
            Box::new(|s: &mut Session| s.next()),
            Box::new(|s: &mut Session| {
                s.toggle_gender(Gender::Male);
            }),
            Box::new(|s: &mut Session| s.next()),
            Box::new(|s: &mut Session| {
                s.toggle_provider("elevenlabs");
            }),
            Box::new(|s: &mut Session| {
                s.toggle_gender(Gender::Female);
            }),
            Box::new(|s: &mut Session| s.prev()),
            Box::new(|s: &mut Session| {
                s.toggle_gender(Gender::Male);
            }),
            Box::new(|s: &mut Session| {
                s.toggle_skip();
            }),
            Box::new(|s: &mut Session| s.clear_filters()),
            Box::new(|s: &mut Session| s.apply_catalog(Catalog::new(three_voices()))),
            Box::new(|s: &mut Session| s.next()),
            Box::new(|s: &mut Session| s.apply_catalog(Catalog::default())),
            Box::new(|s: &mut Session| s.next()),
        ];
        for step in steps.iter().cycle().take(steps.len() * 3) {
            step(&mut session);
            assert_cursor_invariant(&session);
        }
    }

    #[test]
    fn filters_reject_values_missing_from_catalog() {
        let (mut session, _) = session_with(three_voices());
        assert!(!session.toggle_gender(Gender::Male));
        assert!(!session.toggle_provider("azure"));
        assert!(session.filter().is_unconstrained());
        assert_eq!(session.filter_options(), FilterOptions::default());
    }

    #[test]
    fn empty_catalog_reports_nothing_loaded() {
        let (session, _) = session_with(Vec::new());
        assert_eq!(session.empty_state(), Some(EmptyState::NoVoicesLoaded));
        assert_eq!(
            EmptyState::NoVoicesLoaded.message(),
            "No voices loaded"
        );
    }

    #[test]
    fn applying_catalog_resets_session() {
        let (mut session, probe) = session_with(mixed_voices());
        session.toggle_gender(Gender::Male);
        session.toggle_shortlist();
        session.open_shortlist();
        session.toggle_playback(&"m1".into()).unwrap();
        probe.clear();

        session.apply_catalog(Catalog::new(three_voices()));
        assert_eq!(session.stage(), Stage::Browse);
        assert_eq!(session.cursor(), 0);
        assert!(session.shortlist_order().is_empty());
        assert!(session.filter().is_unconstrained());
        assert_eq!(session.playback_state(), &PlaybackState::Idle);
        assert_eq!(probe.calls(), vec![HandleCall::Stop]);
    }

    #[test]
    fn reorder_replaces_sequence() {
        let (mut session, _) = session_with(three_voices());
        for id in ["v1", "v2", "v3"] {
            session.set_status(&id.into(), VoiceStatus::Shortlisted);
        }
        session.reorder_shortlist(["v3", "v1", "v2"].map(VoiceId::from));
        assert_eq!(effective_ids(&session), vec!["v3", "v1", "v2"]);
    }

    #[test]
    fn dropping_onto_self_leaves_order() {
        let (mut session, _) = session_with(three_voices());
        for id in ["v1", "v2", "v3"] {
            session.set_status(&id.into(), VoiceStatus::Shortlisted);
        }
        assert!(!session.move_shortlist_item(&"v2".into(), &"v2".into()));
        assert!(!session.move_shortlist_item(&"v2".into(), &"ghost".into()));
        assert_eq!(effective_ids(&session), vec!["v1", "v2", "v3"]);

        assert!(session.move_shortlist_item(&"v3".into(), &"v1".into()));
        assert_eq!(effective_ids(&session), vec!["v3", "v1", "v2"]);
    }

    #[test]
    fn untracked_shortlisted_voices_append_in_catalog_order() {
        let (mut session, _) = session_with(vec![
            Voice::new("a", "A").with_status(VoiceStatus::Shortlisted),
            Voice::new("b", "B"),
            Voice::new("c", "C").with_status(VoiceStatus::Shortlisted),
        ]);
        session.set_status(&"b".into(), VoiceStatus::Shortlisted);
        assert_eq!(effective_ids(&session), vec!["b", "a", "c"]);

        assert!(session.move_shortlist_item(&"c".into(), &"b".into()));
        let order: Vec<_> = session.shortlist_order().iter().map(VoiceId::as_str).collect();
        assert_eq!(order, vec!["c", "b", "a"]);
    }

    #[test]
    fn stage_transitions_require_shortlist_and_stop_audio() {
        let (mut session, _) = session_with(three_voices());
        assert!(!session.open_shortlist());
        assert_eq!(session.stage(), Stage::Browse);

        session.set_status(&"v1".into(), VoiceStatus::Shortlisted);
        session.toggle_playback(&"v1".into()).unwrap();
        assert!(session.open_shortlist());
        assert_eq!(session.stage(), Stage::Rank);
        assert_eq!(session.playback_state(), &PlaybackState::Idle);

        session.toggle_playback(&"v1".into()).unwrap();
        session.return_to_browse();
        assert_eq!(session.stage(), Stage::Browse);
        assert_eq!(session.playback_state(), &PlaybackState::Idle);
    }

    #[test]
    fn playback_failure_leaves_session_idle() {
        let (mut session, probe) = session_with(three_voices());
        probe.fail_next_start();
        assert!(session.toggle_current_playback().is_err());
        assert_eq!(session.playback_state(), &PlaybackState::Idle);
    }

    #[test]
    fn poll_reports_finished_voice() {
        let (mut session, probe) = session_with(three_voices());
        session.toggle_current_playback().unwrap();
        probe.finish_playback();
        assert_eq!(session.poll_playback(), Some("v1".into()));
        assert_eq!(session.playback_state(), &PlaybackState::Idle);
    }

    #[test]
    fn dropping_session_stops_audio() {
        let (mut session, probe) = session_with(three_voices());
        session.toggle_current_playback().unwrap();
        drop(session);
        assert_eq!(probe.calls().last(), Some(&HandleCall::Stop));
    }
}
