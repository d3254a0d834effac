use crate::constants::gui::*;
use crate::manager::state::SharedState;
use eframe::egui;

/// Overlay status line, restart button and the latest status message
pub fn render(ui: &mut egui::Ui, state: &mut SharedState) {
    ui.add_space(ITEM_SPACING);
    ui.horizontal(|ui| {
        ui.heading(WINDOW_TITLE);
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if state.daemon_status.is_down() && ui.button("Restart overlay").clicked() {
                state.restart_daemon();
            }
            ui.colored_label(state.daemon_status.color(), state.daemon_status.label());
        });
    });

    if let Some(message) = &state.status_message {
        ui.colored_label(message.color, &message.text);
    }
    ui.add_space(ITEM_SPACING);
}
