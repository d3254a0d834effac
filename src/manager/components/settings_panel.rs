use crate::common::color::{HexColor, Opacity};
use crate::config::Settings;
use crate::constants::gui::*;
use crate::constants::limits::{MAX_OFFSET_RATIO, MIN_THICKNESS};
use crate::manager::utils::preview_color;
use eframe::egui;

/// State for the settings panel UI
#[derive(Default)]
pub struct SettingsPanelState {
    hex_input: String,
    hex_invalid: bool,
}

/// Crosshair controls. Returns true when any value changed.
pub fn ui(ui: &mut egui::Ui, settings: &mut Settings, state: &mut SettingsPanelState) -> bool {
    let mut changed = false;

    ui.group(|ui| {
        ui.set_min_width(ui.available_width());
        ui.label(egui::RichText::new("Line").strong());
        ui.add_space(ITEM_SPACING);

        ui.horizontal(|ui| {
            ui.label("Thickness:");
            changed |= ui
                .add(
                    egui::Slider::new(&mut settings.thickness, MIN_THICKNESS..=THICKNESS_MAX)
                        .suffix(" px"),
                )
                .changed();
        });

        ui.add_space(ITEM_SPACING);

        ui.horizontal(|ui| {
            ui.label("Vertical offset:");
            changed |= offset_slider(ui, &mut settings.vert_offset);
        });
        ui.label(
            egui::RichText::new("Inset of the vertical line from the top and bottom edges")
                .small()
                .weak(),
        );

        ui.add_space(ITEM_SPACING);

        ui.horizontal(|ui| {
            ui.label("Horizontal offset:");
            changed |= offset_slider(ui, &mut settings.horiz_offset);
        });
        ui.label(
            egui::RichText::new("Inset of the horizontal line from the left and right edges")
                .small()
                .weak(),
        );
    });

    ui.add_space(SECTION_SPACING);

    ui.group(|ui| {
        ui.set_min_width(ui.available_width());
        ui.label(egui::RichText::new("Color").strong());
        ui.add_space(ITEM_SPACING);

        for (label, channel) in [
            ("Red:", &mut settings.r),
            ("Green:", &mut settings.g),
            ("Blue:", &mut settings.b),
        ] {
            ui.horizontal(|ui| {
                ui.label(label);
                changed |= ui.add(egui::Slider::new(channel, 0..=255)).changed();
            });
        }

        ui.add_space(ITEM_SPACING);

        let mut percent = settings.alpha_percent();
        ui.horizontal(|ui| {
            ui.label("Opacity:");
            if ui
                .add(egui::Slider::new(&mut percent, 0..=100).suffix("%"))
                .changed()
            {
                settings.alpha = Opacity::from_percent(f64::from(percent)).alpha();
                changed = true;
            }
        });

        ui.add_space(ITEM_SPACING);

        let (rect, _) = ui.allocate_exact_size(
            egui::vec2(ui.available_width(), PREVIEW_HEIGHT),
            egui::Sense::hover(),
        );
        ui.painter().rect_filled(
            rect,
            4.0,
            preview_color(settings.r, settings.g, settings.b, settings.alpha),
        );

        ui.add_space(ITEM_SPACING);
        changed |= hex_input(ui, settings, state);
    });

    ui.add_space(SECTION_SPACING);

    changed |= ui.checkbox(&mut settings.show, "Show Crosshair").changed();

    changed
}

/// Hex entry that sets R/G/B once it parses; follows the sliders while unfocused
fn hex_input(ui: &mut egui::Ui, settings: &mut Settings, state: &mut SettingsPanelState) -> bool {
    let mut changed = false;

    ui.horizontal(|ui| {
        ui.label("Hex:");
        let response = ui.add(
            egui::TextEdit::singleline(&mut state.hex_input)
                .desired_width(80.0)
                .font(egui::TextStyle::Monospace),
        );

        if response.changed() {
            match HexColor::parse(&state.hex_input) {
                Some(color) => {
                    state.hex_invalid = false;
                    if (settings.r, settings.g, settings.b) != (color.r, color.g, color.b) {
                        settings.r = color.r;
                        settings.g = color.g;
                        settings.b = color.b;
                        changed = true;
                    }
                }
                None => state.hex_invalid = true,
            }
        }

        if !response.has_focus() {
            state.hex_input = settings.color().to_string();
            state.hex_invalid = false;
        }

        if state.hex_invalid {
            ui.colored_label(COLOR_ERROR, "Expected #rrggbb");
        }
    });

    changed
}

fn offset_slider(ui: &mut egui::Ui, value: &mut f64) -> bool {
    ui.add(
        egui::Slider::new(value, 0.0..=MAX_OFFSET_RATIO)
            .step_by(OFFSET_STEP)
            .fixed_decimals(2),
    )
    .changed()
}
