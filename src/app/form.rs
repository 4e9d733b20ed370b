//! Sidebar input form

use super::App;
use crate::features::Feature;
use crate::theme;
use crate::ui::components::{number_field, section_header};
use eframe::egui;
use egui_phosphor::regular as icons;

impl App {
    /// Six parameter fields plus the Predict and Reset actions.
    pub(crate) fn render_input_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("input_panel")
            .resizable(false)
            .exact_width(theme::SIDEBAR_WIDTH)
            .frame(theme::sidebar_frame())
            .show(ctx, |ui| {
                section_header(ui, icons::SLIDERS_HORIZONTAL, "Input Experimental Parameters");
                ui.label(
                    egui::RichText::new("Please adjust the parameters below (units: mL, h, mM, etc.):")
                        .size(theme::FONT_SMALL)
                        .color(theme::TEXT_DIM),
                );
                ui.add_space(theme::SPACING_MD);

                for feature in Feature::ALL {
                    number_field(
                        ui,
                        feature.label(),
                        self.session.input_mut(feature),
                        feature.drag_speed(),
                    );
                }

                ui.add_space(theme::SPACING_LG);
                let full = egui::vec2(ui.available_width(), theme::BUTTON_HEIGHT_LARGE);
                let predict = ui.add_sized(
                    full,
                    theme::button_accent(format!("{}  Predict", icons::ROCKET_LAUNCH)),
                );
                if predict.clicked() {
                    self.session.submit();
                }

                let reset = ui.add_enabled(
                    !self.session.inputs().is_default() || self.session.outcome().is_some(),
                    theme::button(format!("{}  Reset", icons::ARROW_COUNTER_CLOCKWISE))
                        .min_size(full),
                );
                if reset.clicked() {
                    self.session.reset();
                }
            });
    }
}
