//! Reusable UI components
//!
//! Standalone widgets shared by the form, result and status views.

use crate::theme;
use eframe::egui;

/// Section heading with a leading Phosphor icon
pub fn section_header(ui: &mut egui::Ui, icon: &str, title: &str) {
    ui.label(
        egui::RichText::new(format!("{}  {}", icon, title))
            .size(theme::FONT_HEADING)
            .strong()
            .color(theme::TEXT_PRIMARY),
    );
}

/// Label above a full-width number field. Returns true when the value changed.
pub fn number_field(ui: &mut egui::Ui, label: &str, value: &mut f64, speed: f64) -> bool {
    ui.label(
        egui::RichText::new(label)
            .size(theme::FONT_LABEL)
            .color(theme::TEXT_MUTED),
    );
    let response = ui.add_sized(
        [ui.available_width(), 0.0],
        egui::DragValue::new(value).speed(speed).max_decimals(4),
    );
    ui.add_space(theme::SPACING_SM);
    response.changed()
}

/// Colored message card with an icon, used for success and error outcomes
pub fn message_card(ui: &mut egui::Ui, color: egui::Color32, icon: &str, text: &str) {
    theme::status_frame(color).show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.horizontal_wrapped(|ui| {
            ui.label(egui::RichText::new(icon).size(theme::FONT_HEADING).color(color));
            ui.label(egui::RichText::new(text).size(theme::FONT_BODY).color(color));
        });
    });
}

/// Bullet list of static text
pub fn bullet_list(ui: &mut egui::Ui, items: &[&str]) {
    for item in items {
        ui.horizontal_wrapped(|ui| {
            ui.label(egui::RichText::new("•").color(theme::ACCENT));
            ui.label(
                egui::RichText::new(*item)
                    .size(theme::FONT_BODY)
                    .color(theme::TEXT_SECONDARY),
            );
        });
    }
}
