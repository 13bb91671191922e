use std::path::PathBuf;

use eframe::egui::{self, Align, Frame, Id, Layout, Margin, RichText, Sense, StrokeKind, Ui};

use super::style;
use super::{EguiApp, RANK_WIDTH};
use crate::voices::VoiceId;

const ROW_HEIGHT: f32 = 58.0;

struct RankRow {
    id: VoiceId,
    label: String,
    has_audio: bool,
    is_playing: bool,
    background: Option<PathBuf>,
}

impl EguiApp {
    pub(super) fn render_rank(&mut self, ui: &mut Ui) {
        let palette = style::palette();
        let width = RANK_WIDTH.min(ui.available_width() * 0.92);
        let rows = self.rank_rows();
        ui.vertical_centered(|ui| {
            ui.add_space(24.0);
            Frame::new()
                .fill(style::card_fill())
                .stroke(style::card_stroke())
                .corner_radius(24)
                .inner_margin(Margin::same(18))
                .show(ui, |ui| {
                    ui.set_width(width - 36.0);
                    ui.columns(3, |columns| {
                        if columns[0]
                            .button("← Return to all voices")
                            .on_hover_text("Return to all voices")
                            .clicked()
                        {
                            self.controller.return_to_browse();
                        }
                        columns[1].vertical_centered(|ui| {
                            ui.label(RichText::new("The Shortlist").size(24.0).strong());
                        });
                    });
                    ui.add_space(14.0);
                    if rows.is_empty() {
                        ui.label(
                            RichText::new("No shortlisted voices yet.").color(palette.text_muted),
                        );
                        return;
                    }
                    egui::ScrollArea::vertical()
                        .id_salt("rank_scroll")
                        .auto_shrink([false, true])
                        .show(ui, |ui| {
                            for (index, row) in rows.iter().enumerate() {
                                self.render_rank_row(ui, index, row);
                                ui.add_space(10.0);
                            }
                        });
                    ui.label(
                        RichText::new("Drag to reorder your shortlist by preference.")
                            .color(palette.text_muted),
                    );
                });
        });
        if self.controller.ui.dragging.is_some()
            && !egui::DragAndDrop::has_any_payload(ui.ctx())
            && !ui.input(|i| i.pointer.any_down())
        {
            self.controller.cancel_drag();
        }
    }

    fn rank_rows(&self) -> Vec<RankRow> {
        let session = self.controller.session();
        session
            .effective_shortlist()
            .into_iter()
            .map(|voice| RankRow {
                id: voice.id.clone(),
                label: voice.label.clone(),
                has_audio: voice.has_audio(),
                is_playing: session.is_playing(&voice.id),
                background: self
                    .controller
                    .card_background(voice)
                    .map(|path| path.to_path_buf()),
            })
            .collect()
    }

    fn render_rank_row(&mut self, ui: &mut Ui, index: usize, row: &RankRow) {
        let palette = style::palette();
        let drag_id = Id::new(("rank_row", row.id.as_str()));
        let drag = ui.dnd_drag_source(drag_id, row.id.clone(), |ui| {
            let (rect, _) =
                ui.allocate_exact_size(egui::vec2(ui.available_width(), ROW_HEIGHT), Sense::hover());
            ui.painter().rect_filled(rect, 18.0, style::row_fill());
            self.backgrounds
                .paint_cover(ui, row.background.as_deref(), rect, 18);
            ui.painter()
                .rect_stroke(rect, 18.0, style::card_stroke(), StrokeKind::Inside);
            let mut content = ui.new_child(
                egui::UiBuilder::new()
                    .max_rect(rect.shrink2(egui::vec2(14.0, 12.0)))
                    .layout(Layout::left_to_right(Align::Center)),
            );
            let _ = Frame::new()
                .fill(egui::Color32::from_white_alpha(24))
                .corner_radius(12)
                .inner_margin(Margin::symmetric(10, 6))
                .show(&mut content, |ui| {
                    ui.label(RichText::new(format!("{}", index + 1)).strong());
                })
                .response
                .on_hover_text("Drag to reorder");
            content.add_space(12.0);
            let _ = content
                .add(
                    egui::Label::new(
                        RichText::new(&row.label)
                            .strong()
                            .color(palette.text_primary),
                    )
                    .truncate(),
                )
                .on_hover_text(&row.label);
            content.with_layout(Layout::right_to_left(Align::Center), |ui| {
                let (text, hover) = if row.is_playing {
                    ("⏹ Stop", "Stop")
                } else {
                    ("▶ Play", "Play")
                };
                ui.add_enabled(row.has_audio, egui::Button::new(text))
                    .on_hover_text(hover)
                    .clicked()
            })
            .inner
        });
        if drag.inner {
            self.controller.toggle_playback(&row.id);
        }

        let response = drag.response;
        if response.drag_started() {
            self.controller.begin_drag(row.id.clone());
        }
        if let Some(hovered) = response.dnd_hover_payload::<VoiceId>()
            && *hovered != row.id
        {
            ui.painter().rect_stroke(
                response.rect,
                18.0,
                style::drop_target_stroke(),
                StrokeKind::Outside,
            );
        }
        if response.dnd_release_payload::<VoiceId>().is_some() {
            self.controller.drop_on(&row.id);
        }
    }
}
