//! Settings window implemented with egui/eframe and ksni system tray support

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Result, anyhow};
use eframe::{NativeOptions, egui};
use tracing::{error, info};

#[cfg(target_os = "linux")]
use ksni::TrayMethods;

use super::components;
#[cfg(target_os = "linux")]
use super::components::tray::AppTray;
use super::state::{SharedState, StatusMessage};
use super::utils::load_window_icon;
use crate::config::ConfigStore;
use crate::constants::daemon::CHECK_INTERVAL_MS;
use crate::constants::gui::*;

struct ManagerApp {
    state: Arc<Mutex<SharedState>>,
    panel_state: components::settings_panel::SettingsPanelState,
    #[cfg(target_os = "linux")]
    shutdown_signal: Arc<tokio::sync::Notify>,
    #[cfg(target_os = "linux")]
    update_signal: Arc<tokio::sync::Notify>,
    /// Visibility last shown by the tray checkmark
    #[cfg(target_os = "linux")]
    tray_shown: bool,
}

impl ManagerApp {
    fn new(cc: &eframe::CreationContext<'_>, store: ConfigStore, debug: bool) -> Self {
        info!(path = %store.path().display(), "Initializing settings window");

        let mut state = SharedState::new(store, debug);
        if let Err(err) = state.start_daemon() {
            error!(error = ?err, "Failed to start overlay daemon");
            state.status_message = Some(StatusMessage::error(format!(
                "Failed to start overlay: {err}"
            )));
        }

        #[cfg(target_os = "linux")]
        let tray_shown = state.draft.show;
        let state = Arc::new(Mutex::new(state));

        #[cfg(target_os = "linux")]
        {
            let shutdown_signal = Arc::new(tokio::sync::Notify::new());
            let update_signal = Arc::new(tokio::sync::Notify::new());
            spawn_tray(
                state.clone(),
                cc.egui_ctx.clone(),
                shutdown_signal.clone(),
                update_signal.clone(),
            );

            Self {
                state,
                panel_state: Default::default(),
                shutdown_signal,
                update_signal,
                tray_shown,
            }
        }

        #[cfg(not(target_os = "linux"))]
        {
            let _ = cc;
            Self {
                state,
                panel_state: Default::default(),
            }
        }
    }
}

/// Run the tray on its own thread with a small runtime for ksni's D-Bus service
#[cfg(target_os = "linux")]
fn spawn_tray(
    state: Arc<Mutex<SharedState>>,
    ctx: egui::Context,
    shutdown: Arc<tokio::sync::Notify>,
    update: Arc<tokio::sync::Notify>,
) {
    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(e) => {
                error!(error = ?e, "Failed to build Tokio runtime for tray");
                return;
            }
        };

        runtime.block_on(async move {
            let tray = AppTray { state, ctx };
            match tray.spawn().await {
                Ok(handle) => {
                    info!("Tray icon created via ksni/D-Bus");
                    loop {
                        tokio::select! {
                            _ = shutdown.notified() => {
                                handle.shutdown().await;
                                break;
                            }
                            _ = update.notified() => {
                                // Makes the tray re-read the menu
                                handle.update(|_| {}).await;
                            }
                        }
                    }
                }
                Err(e) => {
                    error!(error = ?e, "Failed to create tray icon (D-Bus unavailable?)");
                }
            }
        });
    });
}

impl eframe::App for ManagerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let state_arc = self.state.clone();
        let mut state_guard = match state_arc.lock() {
            Ok(s) => s,
            Err(e) => {
                error!("Failed to lock shared state: {:?}", e);
                return;
            }
        };
        let state = &mut *state_guard;

        state.poll_daemon();

        if state.should_quit {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }

        egui::TopBottomPanel::top("status_header").show(ctx, |ui| {
            components::header::render(ui, state);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                if components::settings_panel::ui(ui, &mut state.draft, &mut self.panel_state) {
                    state.mark_dirty();
                }
            });
        });

        let next_save = state.poll_pending_save();

        #[cfg(target_os = "linux")]
        if state.draft.show != self.tray_shown {
            self.tray_shown = state.draft.show;
            self.update_signal.notify_one();
        }

        let mut wait = Duration::from_millis(CHECK_INTERVAL_MS);
        if let Some(remaining) = next_save {
            wait = wait.min(remaining);
        }
        ctx.request_repaint_after(wait);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let Ok(mut state) = self.state.lock() {
            state.flush_pending_save();
            if let Err(err) = state.stop_daemon() {
                error!(error = ?err, "Failed to stop daemon during shutdown");
            }
        }

        #[cfg(target_os = "linux")]
        {
            self.shutdown_signal.notify_one();
            info!("Signaled tray thread to shutdown");
        }

        info!("Manager exiting");
    }
}

pub fn run_gui(config_path: PathBuf, debug: bool) -> Result<()> {
    let store = ConfigStore::open(config_path);

    let viewport_builder = egui::ViewportBuilder::default()
        .with_inner_size([WINDOW_WIDTH, WINDOW_HEIGHT])
        .with_resizable(false)
        .with_title(WINDOW_TITLE)
        .with_icon(load_window_icon());

    let options = NativeOptions {
        viewport: viewport_builder,
        ..Default::default()
    };

    eframe::run_native(
        WINDOW_TITLE,
        options,
        Box::new(move |cc| Ok(Box::new(ManagerApp::new(cc, store, debug)))),
    )
    .map_err(|err| anyhow!("Failed to launch settings window: {err}"))
}
