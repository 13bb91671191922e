//! Bridges the browsing session, configuration and background work to the egui UI.

use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::app_dirs::{self, AppDirError};
use crate::audio::AudioHandle;
use crate::config::{self, AppConfig};
use crate::egui_app::state::UiState;
use crate::egui_app::ui::style::StatusTone;
use crate::session::{Session, Stage};
use crate::voices::{Catalog, Gender, Voice, VoiceId, provider_label};

mod catalog_loader;

use catalog_loader::{CatalogLoadResult, CatalogLoader};

/// Pick the background image for a voice: `backgrounds[bg_index % len]`.
pub fn background_for(backgrounds: &[PathBuf], bg_index: usize) -> Option<&Path> {
    if backgrounds.is_empty() {
        return None;
    }
    backgrounds
        .get(bg_index % backgrounds.len())
        .map(PathBuf::as_path)
}

/// Maintains app state and bridges core logic to the egui UI.
pub struct EguiController {
    pub ui: UiState,
    session: Session,
    config: AppConfig,
    app_root: PathBuf,
    card_backgrounds: Vec<PathBuf>,
    loader: CatalogLoader,
}

impl EguiController {
    pub fn new(config: AppConfig, app_root: PathBuf, audio: Box<dyn AudioHandle>) -> Self {
        let card_backgrounds = config.card_background_paths(&app_root);
        Self {
            ui: UiState::default(),
            session: Session::new(audio),
            config,
            app_root,
            card_backgrounds,
            loader: CatalogLoader::spawn(),
        }
    }

    /// Build a controller from the on-disk config.
    ///
    /// A broken config degrades to defaults with a warning; only a missing
    /// app directory is fatal. `make_audio` sees the loaded config so the
    /// output can honor its volume.
    pub fn from_disk(
        make_audio: impl FnOnce(&AppConfig) -> Box<dyn AudioHandle>,
    ) -> Result<Self, AppDirError> {
        let app_root = app_dirs::app_root_dir()?;
        let (config, config_error) = match config::load_or_default() {
            Ok(config) => (config, None),
            Err(err) => {
                warn!("Using default config: {err}");
                (AppConfig::default(), Some(err))
            }
        };
        let audio = make_audio(&config);
        let mut controller = Self::new(config, app_root, audio);
        if let Some(err) = config_error {
            controller.set_status(format!("Using default settings: {err}"), StatusTone::Warning);
        }
        Ok(controller)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn app_background(&self) -> Option<PathBuf> {
        self.config.app_background_path(&self.app_root)
    }

    pub fn card_background(&self, voice: &Voice) -> Option<&Path> {
        background_for(&self.card_backgrounds, voice.bg_index)
    }

    pub fn is_loading(&self) -> bool {
        self.loader.is_loading()
    }

    /// Start fetching the configured catalog; the current deck stays up meanwhile.
    pub fn reload_catalog(&mut self) {
        let source = self.config.catalog_source(&self.app_root);
        let asset_base = self.config.asset_base(&self.app_root);
        info!("Loading voices from {source}");
        self.set_status(format!("Loading voices from {source}"), StatusTone::Busy);
        self.loader.request(source, asset_base);
        self.ui.loading = self.loader.is_loading();
    }

    /// Drain background results and end-of-audio events. Call once per frame.
    pub fn poll_background(&mut self) {
        if let Some(result) = self.loader.poll() {
            self.apply_load_result(result);
        }
        self.ui.loading = self.loader.is_loading();
        if let Some(stopped) = self.session.poll_playback() {
            debug!("Playback of {stopped} stopped");
        }
    }

    fn apply_load_result(&mut self, result: CatalogLoadResult) {
        self.ui.dragging = None;
        match result.result {
            Ok(catalog) => {
                let count = catalog.len();
                self.session.apply_catalog(catalog);
                let tone = if count == 0 {
                    StatusTone::Warning
                } else {
                    StatusTone::Info
                };
                self.set_status(format!("Loaded {count} voices from {}", result.source), tone);
            }
            Err(err) => {
                error!("Catalog load failed: {err}");
                self.session.apply_catalog(Catalog::default());
                self.set_status(format!("Couldn't load voices: {err}"), StatusTone::Error);
            }
        }
    }

    pub fn prev(&mut self) {
        self.session.prev();
    }

    pub fn next(&mut self) {
        self.session.next();
    }

    pub fn toggle_skip(&mut self) {
        self.session.toggle_skip();
    }

    pub fn toggle_shortlist(&mut self) {
        self.session.toggle_shortlist();
    }

    /// Play or stop the voice on the card. A failed start is logged by the
    /// playback controller and the play control simply shows idle again.
    pub fn toggle_current_playback(&mut self) {
        let _ = self.session.toggle_current_playback();
    }

    pub fn toggle_playback(&mut self, id: &VoiceId) {
        let _ = self.session.toggle_playback(id);
    }

    pub fn toggle_gender_filter(&mut self, gender: Gender) {
        if self.session.toggle_gender(gender) {
            self.announce_filter(gender.menu_label());
        }
    }

    pub fn toggle_provider_filter(&mut self, provider: &str) {
        if self.session.toggle_provider(provider) {
            self.announce_filter(&provider_label(&provider.to_lowercase()));
        }
    }

    fn announce_filter(&mut self, changed: &str) {
        let shown = self.session.visible_len();
        let total = self.session.catalog().len();
        self.set_status(
            format!("{changed}: showing {shown} of {total} voices"),
            StatusTone::Info,
        );
    }

    pub fn clear_filters(&mut self) {
        self.session.clear_filters();
        let total = self.session.catalog().len();
        self.set_status(format!("Showing all {total} voices"), StatusTone::Info);
    }

    pub fn open_shortlist(&mut self) {
        if self.session.open_shortlist() {
            let count = self.session.effective_shortlist().len();
            self.set_status(format!("Ranking {count} shortlisted voices"), StatusTone::Info);
        }
    }

    pub fn return_to_browse(&mut self) {
        self.ui.dragging = None;
        self.session.return_to_browse();
    }

    pub fn stage(&self) -> Stage {
        self.session.stage()
    }

    /// Remember which rank row is being dragged.
    pub fn begin_drag(&mut self, id: VoiceId) {
        self.ui.dragging = Some(id);
    }

    /// Drop the dragged row onto `target`; self-drops and stale ids are ignored.
    pub fn drop_on(&mut self, target: &VoiceId) {
        if let Some(dragged) = self.ui.dragging.take() {
            self.session.move_shortlist_item(&dragged, target);
        }
    }

    pub fn cancel_drag(&mut self) {
        self.ui.dragging = None;
    }

    pub(crate) fn set_status(&mut self, text: impl Into<String>, tone: StatusTone) {
        self.ui.status.set(text.into(), tone);
    }
}
