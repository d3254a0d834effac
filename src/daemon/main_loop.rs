//! Overlay daemon main loop and initialization

use anyhow::{Context, Result};
use std::os::fd::{AsFd, BorrowedFd};
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::unix::AsyncFd;
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};
use x11rb::connection::Connection;
use x11rb::protocol::xproto::*;
use x11rb::rust_connection::RustConnection;

use crate::common::ipc::{BootstrapMessage, ConfigMessage, DaemonMessage};
use crate::common::types::Dimensions;
use crate::config::{ConfigStore, OverlayStyle};
use crate::constants::daemon;
use crate::x11::{AppContext, CachedAtoms, CachedFormats};
use ipc_channel::ipc::{self, IpcReceiver, IpcSender};

use super::dispatcher::{EventContext, handle_event};
use super::renderer::CrosshairRenderer;

/// Where the daemon gets its settings from
enum StyleSource {
    /// Spawned by the manager; settings arrive over IPC
    Manager {
        updates: mpsc::Receiver<ConfigMessage>,
        status_tx: IpcSender<DaemonMessage>,
    },
    /// Run by hand; settings come from the config file, reloaded on SIGUSR1
    File(ConfigStore),
}

impl StyleSource {
    fn status_tx(&self) -> Option<&IpcSender<DaemonMessage>> {
        match self {
            Self::Manager { status_tx, .. } => Some(status_tx),
            Self::File(_) => None,
        }
    }

    fn report(&self, message: DaemonMessage) {
        if let Some(tx) = self.status_tx()
            && let Err(e) = tx.send(message)
        {
            debug!(error = %e, "Failed to send status to manager");
        }
    }

    /// Next IPC update; never resolves for file-backed daemons
    async fn next_update(&mut self) -> Option<ConfigMessage> {
        match self {
            Self::Manager { updates, .. } => updates.recv().await,
            Self::File(_) => std::future::pending().await,
        }
    }
}

fn initialize_x11() -> Result<(RustConnection, usize, CachedAtoms, CachedFormats)> {
    let (conn, screen_num) = x11rb::connect(None)
        .context("Failed to connect to X11 server. Is DISPLAY set correctly?")?;

    let screen = &conn.setup().roots[screen_num];
    info!(
        screen = screen_num,
        width = screen.width_in_pixels,
        height = screen.height_in_pixels,
        "Connected to X11 server"
    );

    crate::x11::check_extensions(&conn)?;

    let atoms = CachedAtoms::new(&conn).context("Failed to cache X11 atoms at startup")?;
    let formats = CachedFormats::new(&conn, screen)
        .context("Failed to cache picture formats at startup")?;

    // Root ConfigureNotify tells us when the screen is resized
    conn.change_window_attributes(
        screen.root,
        &ChangeWindowAttributesAux::new().event_mask(EventMask::STRUCTURE_NOTIFY),
    )
    .context("Failed to set event mask on root window")?;

    Ok((conn, screen_num, atoms, formats))
}

/// Handshake with the manager and wait for the first style
fn connect_manager(server_name: String) -> Result<(StyleSource, OverlayStyle)> {
    info!(server = %server_name, "Connecting to IPC server");
    let bootstrap_sender: IpcSender<BootstrapMessage> =
        IpcSender::connect(server_name).context("Failed to connect to IPC server")?;

    let (config_tx, config_rx) =
        ipc::channel::<ConfigMessage>().context("Failed to create config IPC channel")?;
    let (status_tx, status_rx) =
        ipc::channel::<DaemonMessage>().context("Failed to create status IPC channel")?;

    bootstrap_sender
        .send((config_tx, status_rx))
        .context("Failed to send bootstrap message")?;

    info!("Waiting for initial configuration...");
    let initial = match config_rx.recv() {
        Ok(ConfigMessage::Apply(style)) => style,
        Err(e) => return Err(anyhow::anyhow!("Failed to receive initial config: {e}")),
    };
    info!("Received initial configuration");

    Ok((
        StyleSource::Manager {
            updates: bridge_ipc(config_rx),
            status_tx,
        },
        initial,
    ))
}

/// IpcReceiver blocks, so a thread forwards its messages into a tokio channel.
/// The tokio side closes once the manager drops its sender.
fn bridge_ipc(config_rx: IpcReceiver<ConfigMessage>) -> mpsc::Receiver<ConfigMessage> {
    let (tx, rx) = mpsc::channel(8);
    std::thread::spawn(move || {
        while let Ok(msg) = config_rx.recv() {
            if tx.blocking_send(msg).is_err() {
                break;
            }
        }
        debug!("IPC bridge thread exiting");
    });
    rx
}

/// Readiness watcher over a borrowed fd; `source` must outlive the watcher
fn watch_readable<S: AsFd>(source: &S) -> std::io::Result<AsyncFd<BorrowedFd<'_>>> {
    AsyncFd::new(source.as_fd())
}

fn apply_style(renderer: &mut CrosshairRenderer, source: &StyleSource, style: OverlayStyle) {
    if let Err(e) = renderer.apply(style) {
        error!(error = ?e, "Failed to apply overlay style");
        source.report(DaemonMessage::Error(format!("{e:#}")));
    }
}

pub async fn run_overlay_daemon(ipc_server: Option<String>, config_path: PathBuf) -> Result<()> {
    let (conn, screen_num, atoms, formats) =
        initialize_x11().context("Failed to initialize X11")?;
    let screen = &conn.setup().roots[screen_num];

    let (mut source, initial) = match ipc_server {
        Some(server_name) => connect_manager(server_name)?,
        None => {
            let store = ConfigStore::open(config_path);
            info!(path = %store.path().display(), "Running standalone from config file");
            let style = store.settings().overlay_style();
            (StyleSource::File(store), style)
        }
    };

    let ctx = AppContext {
        conn: &conn,
        screen,
        atoms: &atoms,
        formats: &formats,
    };

    let viewport = Dimensions::new(screen.width_in_pixels, screen.height_in_pixels);
    let mut renderer = match CrosshairRenderer::new(&ctx, viewport, initial) {
        Ok(renderer) => renderer,
        Err(e) => {
            source.report(DaemonMessage::Error(format!("{e:#}")));
            return Err(e.context("Failed to create crosshair overlay"));
        }
    };
    conn.flush().context("Failed to flush X11 connection")?;

    source.report(DaemonMessage::Ready {
        width: viewport.width,
        height: viewport.height,
    });

    let mut sigusr1 =
        signal(SignalKind::user_defined1()).context("Failed to register SIGUSR1 handler")?;
    let mut sigterm =
        signal(SignalKind::terminate()).context("Failed to register SIGTERM handler")?;
    let mut sigint =
        signal(SignalKind::interrupt()).context("Failed to register SIGINT handler")?;

    let mut heartbeat = tokio::time::interval(Duration::from_secs(daemon::HEARTBEAT_INTERVAL_SECS));
    heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // Wake exactly when X11 has data instead of busy polling
    let x11_fd =
        watch_readable(conn.stream()).context("Failed to create AsyncFd for X11 connection")?;

    info!("Overlay daemon running");

    loop {
        // Drain everything already queued before sleeping again
        while let Some(event) = conn
            .poll_for_event()
            .context("Failed to poll for X11 event")?
        {
            let mut context = EventContext {
                app_ctx: &ctx,
                renderer: &mut renderer,
            };
            if let Err(e) = handle_event(&mut context, event) {
                error!(error = ?e, "Event handling error");
                source.report(DaemonMessage::Error(format!("{e:#}")));
            }
        }
        let _ = conn.flush();

        tokio::select! {
            _ = sigterm.recv() => {
                info!("SIGTERM received, shutting down overlay");
                break;
            }

            _ = sigint.recv() => {
                info!("SIGINT received, shutting down overlay");
                break;
            }

            _ = sigusr1.recv() => {
                match &mut source {
                    StyleSource::File(store) => {
                        info!("SIGUSR1 received, reloading config file");
                        let style = store.load().overlay_style();
                        apply_style(&mut renderer, &source, style);
                    }
                    StyleSource::Manager { .. } => {
                        info!("SIGUSR1 ignored, settings are managed by the manager over IPC");
                    }
                }
            }

            update = source.next_update() => {
                match update {
                    Some(ConfigMessage::Apply(style)) => {
                        debug!("Received style update via IPC");
                        apply_style(&mut renderer, &source, style);
                    }
                    None => {
                        info!("Manager closed the config channel, shutting down overlay");
                        break;
                    }
                }
            }

            _ = heartbeat.tick() => {
                if let Some(tx) = source.status_tx()
                    && tx.send(DaemonMessage::Heartbeat).is_err()
                {
                    warn!("Manager is gone, shutting down overlay");
                    break;
                }
            }

            ready = x11_fd.readable() => {
                match ready {
                    // Level-triggered: without clearing, readable() fires again immediately
                    Ok(mut guard) => guard.clear_ready(),
                    Err(e) => error!(error = ?e, "Failed to poll X11 fd readiness"),
                }
            }
        }
    }

    drop(renderer);
    info!("Overlay daemon stopped");
    Ok(())
}
