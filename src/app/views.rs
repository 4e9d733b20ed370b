//! Main panel rendering (title, result, instructions, fatal error)

use super::App;
use crate::constants::{INSTRUCTIONS, INTRO_TEXT, WINDOW_TITLE};
use crate::theme;
use crate::types::{ModelState, Outcome};
use crate::ui::components::{bullet_list, message_card, section_header};
use eframe::egui;
use egui_phosphor::regular as icons;

impl App {
    pub(crate) fn render_main_panel(&self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(theme::central_frame())
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.render_title(ui);
                    ui.add_space(theme::SPACING_XL);

                    if let Some(outcome) = self.session.outcome() {
                        section_header(ui, icons::CHART_LINE_UP, "Prediction Result");
                        ui.add_space(theme::SPACING_SM);
                        render_outcome(ui, outcome);
                        ui.add_space(theme::SPACING_XL);
                    }

                    ui.separator();
                    ui.add_space(theme::SPACING_MD);
                    section_header(ui, icons::PUSH_PIN, "Instructions");
                    ui.add_space(theme::SPACING_SM);
                    bullet_list(ui, INSTRUCTIONS);

                    ui.add_space(theme::SPACING_XL);
                    self.render_model_status(ui);
                });
            });
    }

    /// Shown instead of the form when the model could not be loaded.
    pub(crate) fn render_fatal(&self, ctx: &egui::Context) {
        let ModelState::Unavailable { path, reason } = self.session.state() else {
            return;
        };
        egui::CentralPanel::default()
            .frame(theme::central_frame())
            .show(ctx, |ui| {
                self.render_title(ui);
                ui.add_space(theme::SPACING_XL);
                message_card(ui, theme::STATUS_ERROR, icons::X_CIRCLE, reason);
                ui.add_space(theme::SPACING_MD);
                ui.label(
                    egui::RichText::new(format!(
                        "Place the exported model at {} (relative to {}) and restart the application.",
                        path.display(),
                        std::env::current_dir()
                            .map(|d| d.display().to_string())
                            .unwrap_or_else(|_| ".".to_string()),
                    ))
                    .size(theme::FONT_BODY)
                    .color(theme::TEXT_MUTED),
                );
            });
    }

    fn render_title(&self, ui: &mut egui::Ui) {
        ui.label(
            egui::RichText::new(format!("{}  {}", icons::FLASK, WINDOW_TITLE))
                .size(theme::FONT_TITLE)
                .strong()
                .color(theme::TEXT_PRIMARY),
        );
        ui.add_space(theme::SPACING_SM);
        ui.label(
            egui::RichText::new(INTRO_TEXT)
                .size(theme::FONT_BODY)
                .color(theme::TEXT_MUTED),
        );
    }

    fn render_model_status(&self, ui: &mut egui::Ui) {
        if let ModelState::Ready { info: Some(info), .. } = self.session.state() {
            theme::card_frame().show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.label(
                    egui::RichText::new(format!("{}  {}", icons::CUBE, info.summary()))
                        .size(theme::FONT_SMALL)
                        .color(theme::TEXT_DIM),
                );
                ui.label(
                    egui::RichText::new(info.path.display().to_string())
                        .size(theme::FONT_SMALL)
                        .color(theme::TEXT_DIM),
                );
            });
        }
    }
}

fn render_outcome(ui: &mut egui::Ui, outcome: &Outcome) {
    match outcome {
        Outcome::Success(p) => {
            theme::status_frame(theme::STATUS_SUCCESS).show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.horizontal(|ui| {
                    ui.label(
                        egui::RichText::new(format!("{}  Predicted result:", icons::MAGNIFYING_GLASS))
                            .size(theme::FONT_HEADING)
                            .color(theme::STATUS_SUCCESS),
                    );
                    ui.label(
                        egui::RichText::new(p.formatted())
                            .size(theme::FONT_RESULT)
                            .strong()
                            .color(theme::STATUS_SUCCESS),
                    );
                });
            });
        }
        Outcome::Failed(reason) => {
            message_card(
                ui,
                theme::STATUS_ERROR,
                icons::WARNING,
                &format!("An error occurred during prediction: {}", reason),
            );
        }
    }
}
