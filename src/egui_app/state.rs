//! Presentation state owned by the controller and read by the renderer.

use egui::Color32;

use crate::egui_app::ui::style::{self, StatusTone};
use crate::voices::VoiceId;

/// Status entries kept for the footer tooltip.
pub const STATUS_LOG_LIMIT: usize = 200;

/// Top-level UI state that is not part of the browsing session itself.
#[derive(Clone, Debug)]
pub struct UiState {
    pub status: StatusBarState,
    /// Row currently being dragged in the rank list.
    pub dragging: Option<VoiceId>,
    /// True while a catalog load is in flight.
    pub loading: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            status: StatusBarState::idle(),
            dragging: None,
            loading: false,
        }
    }
}

/// Status badge + text shown in the footer.
#[derive(Clone, Debug, PartialEq)]
pub struct StatusBarState {
    pub text: String,
    pub badge_label: String,
    pub badge_color: Color32,
    /// Rolling status log entries, oldest first.
    pub log: Vec<String>,
}

impl StatusBarState {
    pub fn idle() -> Self {
        Self {
            text: "No voices loaded".into(),
            badge_label: style::status_badge_label(StatusTone::Idle).into(),
            badge_color: style::status_badge_color(StatusTone::Idle),
            log: Vec::new(),
        }
    }

    /// Replace the visible message and append it to the log.
    pub fn set(&mut self, text: String, tone: StatusTone) {
        self.badge_label = style::status_badge_label(tone).into();
        self.badge_color = style::status_badge_color(tone);
        self.log.push(format!("[{}] {text}", self.badge_label));
        if self.log.len() > STATUS_LOG_LIMIT {
            let excess = self.log.len() - STATUS_LOG_LIMIT;
            self.log.drain(..excess);
        }
        self.text = text;
    }

    /// Concatenate log entries into a single displayable string.
    pub fn log_text(&self) -> String {
        self.log.join("\n")
    }
}
