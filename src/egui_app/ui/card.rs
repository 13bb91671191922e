use eframe::egui::{self, Align, Frame, Layout, Margin, RichText, StrokeKind, Ui};

use super::style;
use super::{CARD_HEIGHT, CARD_WIDTH, EguiApp};
use crate::session::EmptyState;
use crate::voices::VoiceStatus;

/// Everything the card needs, copied out so the controller can be mutated
/// while the card is drawn.
struct CardView {
    label: String,
    status: VoiceStatus,
    has_audio: bool,
    is_playing: bool,
    counter: Option<(usize, usize)>,
    can_prev: bool,
    can_next: bool,
    background: Option<std::path::PathBuf>,
}

impl EguiApp {
    pub(super) fn render_browse(&mut self, ui: &mut Ui) {
        let width = CARD_WIDTH.min(ui.available_width() * 0.92);
        ui.vertical_centered(|ui| {
            ui.add_space(((ui.available_height() - CARD_HEIGHT) / 2.0 - 40.0).max(12.0));
            ui.allocate_ui(egui::vec2(width, 40.0), |ui| {
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    self.render_shortlist_button(ui);
                    self.render_filter_menu(ui);
                });
            });
            ui.add_space(10.0);
            match self.controller.session().empty_state() {
                Some(empty) => self.render_empty_state(ui, empty, width),
                None => self.render_card(ui, width),
            }
        });
    }

    fn render_shortlist_button(&mut self, ui: &mut Ui) {
        let palette = style::palette();
        let has_shortlist = self.controller.session().has_shortlist();
        let text = RichText::new("The Shortlist →").color(if has_shortlist {
            palette.success
        } else {
            palette.text_muted
        });
        let response = ui
            .add_enabled(has_shortlist, egui::Button::new(text))
            .on_hover_text("Go to stack ranking")
            .on_disabled_hover_text("Shortlist at least one voice first");
        if response.clicked() {
            self.controller.open_shortlist();
        }
    }

    fn card_view(&self) -> Option<CardView> {
        let session = self.controller.session();
        let voice = session.current()?;
        Some(CardView {
            label: voice.label.clone(),
            status: voice.status,
            has_audio: voice.has_audio(),
            is_playing: session.is_playing(&voice.id),
            counter: session.counter(),
            can_prev: session.can_prev(),
            can_next: session.can_next(),
            background: self.controller.card_background(voice).map(|p| p.to_path_buf()),
        })
    }

    fn render_card(&mut self, ui: &mut Ui, width: f32) {
        let Some(view) = self.card_view() else {
            return;
        };
        let palette = style::palette();
        let (rect, _) =
            ui.allocate_exact_size(egui::vec2(width, CARD_HEIGHT - 40.0), egui::Sense::hover());
        ui.painter().rect_filled(rect, 24.0, style::card_fill());
        self.backgrounds
            .paint_cover(ui, view.background.as_deref(), rect, 24);
        ui.painter()
            .rect_stroke(rect, 24.0, style::card_stroke(), StrokeKind::Inside);

        let mut content = ui.new_child(
            egui::UiBuilder::new()
                .max_rect(rect.shrink(18.0))
                .layout(Layout::top_down(Align::Min)),
        );
        let ui = &mut content;

        ui.horizontal(|ui| {
            status_pill(ui, view.status);
            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                if let Some((position, total)) = view.counter {
                    Frame::new()
                        .fill(egui::Color32::from_black_alpha(64))
                        .corner_radius(12)
                        .inner_margin(Margin::symmetric(10, 4))
                        .show(ui, |ui| {
                            ui.label(RichText::new(format!("{position} / {total}")).strong());
                        });
                }
            });
        });

        ui.add_space(30.0);
        ui.horizontal(|ui| {
            let title = egui::Label::new(
                RichText::new(&view.label)
                    .size(26.0)
                    .strong()
                    .color(palette.text_primary),
            )
            .truncate();
            let _ = ui.add(title).on_hover_text(&view.label);
            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                let (text, hover) = if view.is_playing {
                    ("⏹ Stop", "Stop")
                } else {
                    ("▶ Play", "Play")
                };
                let play = ui
                    .add_enabled(view.has_audio, egui::Button::new(text))
                    .on_hover_text(hover)
                    .on_disabled_hover_text("No audio for this voice");
                if play.clicked() {
                    self.controller.toggle_current_playback();
                }
            });
        });

        ui.with_layout(Layout::bottom_up(Align::Min), |ui| {
            ui.horizontal(|ui| {
                if ui
                    .add_enabled(view.can_prev, egui::Button::new("← Prev"))
                    .on_hover_text("Previous")
                    .clicked()
                {
                    self.controller.prev();
                }
                if ui
                    .add_enabled(view.can_next, egui::Button::new("Next →"))
                    .on_hover_text("Next")
                    .clicked()
                {
                    self.controller.next();
                }
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    let shortlisted = view.status == VoiceStatus::Shortlisted;
                    let (text, hover) = if shortlisted {
                        ("Shortlisted", "Remove from shortlist")
                    } else {
                        ("Shortlist", "Shortlist")
                    };
                    let color = if shortlisted {
                        palette.text_primary
                    } else {
                        palette.success
                    };
                    if ui
                        .add(egui::Button::new(RichText::new(text).color(color)))
                        .on_hover_text(hover)
                        .clicked()
                    {
                        self.controller.toggle_shortlist();
                    }
                    let skip_hover = if view.status == VoiceStatus::Skipped {
                        "Undo skip"
                    } else {
                        "Skip"
                    };
                    if ui
                        .add(egui::Button::new(
                            RichText::new("✕").strong().color(palette.destructive),
                        ))
                        .on_hover_text(skip_hover)
                        .clicked()
                    {
                        self.controller.toggle_skip();
                    }
                });
            });
        });
    }

    fn render_empty_state(&mut self, ui: &mut Ui, empty: EmptyState, width: f32) {
        let palette = style::palette();
        Frame::new()
            .fill(style::card_fill())
            .stroke(style::card_stroke())
            .corner_radius(24)
            .inner_margin(Margin::same(18))
            .show(ui, |ui| {
                ui.set_width(width - 36.0);
                ui.vertical_centered(|ui| {
                    ui.label(RichText::new(empty.message()).size(20.0).strong());
                    ui.add_space(8.0);
                    let hint = match empty {
                        EmptyState::NoMatches => "Change “Show only…” to Show all voices.",
                        EmptyState::NoVoicesLoaded => {
                            "Check the catalog and asset paths in config.toml, then press Ctrl+R."
                        }
                    };
                    ui.label(RichText::new(hint).color(palette.text_muted));
                    if empty == EmptyState::NoMatches {
                        ui.add_space(12.0);
                        if ui
                            .button("Show all voices")
                            .on_hover_text("Clear filters")
                            .clicked()
                        {
                            self.controller.clear_filters();
                        }
                    }
                });
            });
    }
}

fn status_pill(ui: &mut Ui, status: VoiceStatus) {
    let Some(label) = status.pill_label() else {
        return;
    };
    Frame::new()
        .fill(style::status_pill_color(status))
        .corner_radius(12)
        .inner_margin(Margin::symmetric(10, 4))
        .show(ui, |ui| {
            ui.label(RichText::new(label).small().strong().color(egui::Color32::WHITE));
        });
}
