use eframe::egui::{RichText, Ui};

use super::EguiApp;
use super::style;
use crate::voices::provider_label;

impl EguiApp {
    /// "Show only…" dropdown; disabled when the catalog has nothing to filter on.
    pub(super) fn render_filter_menu(&mut self, ui: &mut Ui) {
        let palette = style::palette();
        let session = self.controller.session();
        let options = session.filter_options();
        let label = session.filter().menu_label();
        let selected_genders = session.filter().genders().clone();
        let selected_providers = session.filter().providers().clone();

        ui.add_enabled_ui(options.any(), |ui| {
            let response = ui.menu_button(label, |ui| {
                ui.set_min_width(220.0);
                let mut close_menu = false;

                ui.label(RichText::new("Gender").small().color(palette.text_muted));
                if options.has_gender_data() {
                    for (gender, count) in &options.genders {
                        let active = selected_genders.contains(gender);
                        if filter_item(ui, gender.menu_label(), *count, active) {
                            self.controller.toggle_gender_filter(*gender);
                        }
                    }
                } else {
                    missing_field_hint(ui, "gender");
                }

                ui.separator();
                ui.label(RichText::new("Provider").small().color(palette.text_muted));
                if options.has_provider_data() {
                    for (provider, count) in &options.providers {
                        let active = selected_providers.contains(provider);
                        if filter_item(ui, &provider_label(provider), *count, active) {
                            self.controller.toggle_provider_filter(provider);
                        }
                    }
                } else {
                    missing_field_hint(ui, "provider");
                }

                ui.separator();
                if ui.button("Show all voices").clicked() {
                    self.controller.clear_filters();
                    close_menu = true;
                }
                if close_menu {
                    ui.close();
                }
            });
            let _ = response
                .response
                .on_hover_text("Filter voices")
                .on_disabled_hover_text("Add gender or provider to the catalog to filter");
        });
    }
}

fn filter_item(ui: &mut Ui, label: &str, count: usize, active: bool) -> bool {
    let text = format!("{} {label}  ({count})", if active { "✔" } else { "  " });
    ui.selectable_label(active, text).clicked()
}

fn missing_field_hint(ui: &mut Ui, field: &str) {
    let palette = style::palette();
    ui.label(
        RichText::new(format!("Add `{field}` to the catalog to enable."))
            .small()
            .color(palette.text_muted),
    );
}
