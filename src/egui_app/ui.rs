//! egui renderer for the voice deck.

use std::time::Duration;

use eframe::egui::{self, Frame, Key, Margin, RichText, StrokeKind};

use crate::egui_app::controller::EguiController;
use crate::session::{PlaybackState, Stage};

mod backgrounds;
mod card;
mod filter_menu;
mod rank_list;
pub mod style;

use backgrounds::BackgroundCache;

/// Smallest window that still fits a card and its controls.
pub const MIN_VIEWPORT_SIZE: egui::Vec2 = egui::vec2(560.0, 520.0);
const CARD_WIDTH: f32 = 520.0;
const CARD_HEIGHT: f32 = 380.0;
const RANK_WIDTH: f32 = 760.0;
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Renders the egui UI using the shared controller state.
pub struct EguiApp {
    controller: EguiController,
    visuals_set: bool,
    backgrounds: BackgroundCache,
}

impl EguiApp {
    /// Wrap a controller and kick off the first catalog load.
    pub fn new(mut controller: EguiController) -> Self {
        controller.reload_catalog();
        Self {
            controller,
            visuals_set: false,
            backgrounds: BackgroundCache::default(),
        }
    }

    fn apply_visuals(&mut self, ctx: &egui::Context) {
        if self.visuals_set {
            return;
        }
        let mut visuals = egui::Visuals::dark();
        style::apply_visuals(&mut visuals);
        ctx.set_visuals(visuals);
        self.visuals_set = true;
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let pressed = |key| ctx.input(|i| i.key_pressed(key));
        match self.controller.stage() {
            Stage::Browse => {
                if pressed(Key::ArrowLeft) {
                    self.controller.prev();
                }
                if pressed(Key::ArrowRight) {
                    self.controller.next();
                }
                if pressed(Key::Space) {
                    self.controller.toggle_current_playback();
                }
                if pressed(Key::X) {
                    self.controller.toggle_skip();
                }
                if pressed(Key::S) {
                    self.controller.toggle_shortlist();
                }
                if pressed(Key::Enter) {
                    self.controller.open_shortlist();
                }
            }
            Stage::Rank => {
                if pressed(Key::Escape) {
                    self.controller.return_to_browse();
                }
            }
        }
        if ctx.input(|i| i.modifiers.command && i.key_pressed(Key::R)) {
            self.controller.reload_catalog();
        }
    }

    fn render_status(&mut self, ctx: &egui::Context) {
        let palette = style::palette();
        egui::TopBottomPanel::bottom("status_bar")
            .frame(
                Frame::new()
                    .fill(palette.bg_primary)
                    .stroke(style::inner_border())
                    .inner_margin(Margin::symmetric(8, 4)),
            )
            .show(ctx, |ui| {
                let status = &self.controller.ui.status;
                ui.horizontal(|ui| {
                    let (badge_rect, _) =
                        ui.allocate_exact_size(egui::vec2(14.0, 14.0), egui::Sense::hover());
                    ui.painter().rect_filled(badge_rect, 3.0, status.badge_color);
                    ui.painter().rect_stroke(
                        badge_rect,
                        3.0,
                        style::inner_border(),
                        StrokeKind::Inside,
                    );
                    ui.label(RichText::new(&status.badge_label).color(palette.text_primary));
                    ui.separator();
                    let text = ui.label(RichText::new(&status.text).color(palette.text_primary));
                    if !status.log.is_empty() {
                        let _ = text.on_hover_text(status.log_text());
                    }
                    if self.controller.ui.loading {
                        ui.spinner();
                    }
                });
            });
    }

    fn render_center(&mut self, ctx: &egui::Context) {
        let palette = style::palette();
        egui::CentralPanel::default()
            .frame(Frame::new().fill(palette.bg_primary))
            .show(ctx, |ui| {
                let app_background = self.controller.app_background();
                let full = ui.max_rect();
                self.backgrounds
                    .paint_cover(ui, app_background.as_deref(), full, 0);
                match self.controller.stage() {
                    Stage::Browse => self.render_browse(ui),
                    Stage::Rank => self.render_rank(ui),
                }
            });
    }
}

impl eframe::App for EguiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.apply_visuals(ctx);
        self.controller.poll_background();
        self.handle_keys(ctx);
        self.render_status(ctx);
        self.render_center(ctx);
        let playing = matches!(
            self.controller.session().playback_state(),
            PlaybackState::Playing(_)
        );
        if self.controller.ui.loading || playing {
            ctx.request_repaint_after(POLL_INTERVAL);
        }
    }
}
