#[cfg(target_os = "linux")]
use eframe::egui;
#[cfg(target_os = "linux")]
use std::sync::{Arc, Mutex};

#[cfg(target_os = "linux")]
use crate::constants::gui::WINDOW_TITLE;
#[cfg(target_os = "linux")]
use crate::manager::{state::SharedState, utils::load_tray_icon_pixmap};

/// System tray icon with the visibility toggle and quit
#[cfg(target_os = "linux")]
pub struct AppTray {
    pub state: Arc<Mutex<SharedState>>,
    pub ctx: egui::Context,
}

#[cfg(target_os = "linux")]
impl ksni::Tray for AppTray {
    fn id(&self) -> String {
        "screen-crosshair".into()
    }

    fn icon_name(&self) -> String {
        "screen-crosshair".into()
    }

    fn title(&self) -> String {
        WINDOW_TITLE.into()
    }

    fn icon_pixmap(&self) -> Vec<ksni::Icon> {
        vec![load_tray_icon_pixmap()]
    }

    fn menu(&self) -> Vec<ksni::MenuItem<Self>> {
        use ksni::menu::*;

        let shown = self
            .state
            .lock()
            .map(|state| state.draft.show)
            .unwrap_or(true);

        vec![
            CheckmarkItem {
                label: "Show Crosshair".into(),
                checked: shown,
                activate: Box::new(|this: &mut AppTray| {
                    if let Ok(mut state) = this.state.lock() {
                        state.toggle_show();
                    }
                    // The UI thread runs the debounced save
                    this.ctx.request_repaint();
                }),
                ..Default::default()
            }
            .into(),
            MenuItem::Separator,
            StandardItem {
                label: "Quit".into(),
                activate: Box::new(|this: &mut AppTray| {
                    if let Ok(mut state) = this.state.lock() {
                        state.should_quit = true;
                    }
                    this.ctx.request_repaint();
                }),
                ..Default::default()
            }
            .into(),
        ]
    }
}
