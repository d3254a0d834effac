use anyhow::{Context, Result};
use ipc_channel::ipc::IpcOneShotServer;
use std::process::Child;
use std::sync::mpsc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::common::ipc::{BootstrapMessage, ConfigMessage, DaemonMessage};
use crate::constants::daemon::*;
use crate::manager::utils::spawn_daemon;

use super::{DaemonStatus, SharedState, StatusMessage};

impl SharedState {
    pub fn start_daemon(&mut self) -> Result<()> {
        if self.daemon.is_some() {
            return Ok(());
        }

        let (server, server_name) =
            IpcOneShotServer::<BootstrapMessage>::new().context("Failed to create IPC server")?;

        let child = spawn_daemon(&server_name, self.store.path(), self.debug_mode)?;
        debug!(pid = child.id(), server_name = %server_name, "Started overlay daemon");

        // Accept on a thread so the UI never blocks on a daemon that fails to connect
        let (tx, rx) = mpsc::channel();
        self.bootstrap_rx = Some(rx);

        std::thread::spawn(move || {
            debug!("Waiting for daemon IPC connection...");
            match server.accept() {
                Ok((_, bootstrap_msg)) => {
                    info!("Daemon connected via IPC");
                    let _ = tx.send(bootstrap_msg);
                }
                Err(e) => {
                    error!(error = %e, "Failed to accept IPC connection");
                }
            }
        });

        self.daemon = Some(child);
        self.daemon_status = DaemonStatus::Starting;
        self.last_heartbeat = Instant::now();
        Ok(())
    }

    pub fn stop_daemon(&mut self) -> Result<()> {
        // Dropping the sender first lets the daemon notice the closed channel too
        self.clear_ipc();

        if let Some(mut child) = self.daemon.take() {
            let pid = child.id();
            info!(pid, "Stopping overlay daemon");

            terminate(&mut child);
            let status = wait_with_timeout(&mut child, Duration::from_millis(STOP_TIMEOUT_MS))?;

            let status = match status {
                Some(status) => status,
                None => {
                    warn!(pid, "Daemon ignored SIGTERM, killing it");
                    child.kill().context("Failed to kill overlay daemon")?;
                    child.wait().context("Failed to wait for overlay daemon")?
                }
            };

            info!(pid, status = ?status, "Daemon exited");
            self.daemon_status = DaemonStatus::Stopped;
        }
        Ok(())
    }

    pub fn restart_daemon(&mut self) {
        info!("Restart requested");
        if let Err(err) = self.stop_daemon().and_then(|_| self.start_daemon()) {
            error!(error = ?err, "Failed to restart daemon");
            self.status_message = Some(StatusMessage::error(format!("Restart failed: {err}")));
        }
    }

    /// Push the current settings to the overlay, if one is connected
    pub fn sync_to_daemon(&mut self) {
        let Some(tx) = self.ipc_config_tx.as_ref() else {
            return;
        };
        let style = self.store.settings().overlay_style();
        if let Err(e) = tx.send(ConfigMessage::Apply(style)) {
            warn!(error = %e, "Failed to send settings to daemon");
            self.ipc_config_tx = None;
        }
    }

    pub fn poll_daemon(&mut self) {
        // 1. Bootstrap handshake
        if let Some(ref rx) = self.bootstrap_rx
            && let Ok((config_tx, status_rx)) = rx.try_recv()
        {
            debug!("Received IPC channels from daemon");
            self.ipc_config_tx = Some(config_tx);

            let (manager_tx, manager_rx) = mpsc::channel();
            self.daemon_status_rx = Some(manager_rx);

            std::thread::spawn(move || {
                while let Ok(msg) = status_rx.recv() {
                    if manager_tx.send(msg).is_err() {
                        break;
                    }
                }
            });

            // The daemon waits for this before creating its window
            self.sync_to_daemon();

            self.bootstrap_rx = None;
            self.last_heartbeat = Instant::now();
        }

        // 2. Status messages
        let messages: Vec<DaemonMessage> = self
            .daemon_status_rx
            .as_ref()
            .map(|rx| rx.try_iter().collect())
            .unwrap_or_default();

        for msg in messages {
            self.handle_daemon_message(msg);
        }

        // 3. Heartbeat watchdog
        if self.daemon.is_some()
            && self.daemon_status == DaemonStatus::Running
            && self.last_heartbeat.elapsed() > Duration::from_secs(HEARTBEAT_TIMEOUT_SECS)
        {
            warn!(
                timeout_secs = HEARTBEAT_TIMEOUT_SECS,
                "No heartbeat from daemon, restarting it"
            );
            self.restart_daemon();
            return;
        }

        // 4. Process liveness
        if self.last_health_check.elapsed() < Duration::from_millis(CHECK_INTERVAL_MS) {
            return;
        }
        self.last_health_check = Instant::now();

        if let Some(child) = self.daemon.as_mut() {
            match child.try_wait() {
                Ok(Some(status)) => {
                    warn!(pid = child.id(), exit = ?status.code(), "Daemon exited unexpectedly");
                    self.daemon = None;
                    self.daemon_status = if status.success() {
                        DaemonStatus::Stopped
                    } else {
                        DaemonStatus::Crashed(status.code())
                    };
                    self.clear_ipc();
                }
                Ok(None) => {}
                Err(err) => {
                    error!(error = ?err, "Failed to query daemon status");
                }
            }
        }
    }

    fn handle_daemon_message(&mut self, msg: DaemonMessage) {
        match msg {
            DaemonMessage::Ready { width, height } => {
                info!(width, height, "Overlay ready");
                self.daemon_status = DaemonStatus::Running;
                self.last_heartbeat = Instant::now();
            }
            DaemonMessage::Error(e) => {
                error!("Daemon error: {}", e);
                self.status_message = Some(StatusMessage::error(format!("Overlay error: {e}")));
            }
            DaemonMessage::Heartbeat => {
                self.last_heartbeat = Instant::now();
            }
        }
    }

    fn clear_ipc(&mut self) {
        self.ipc_config_tx = None;
        self.bootstrap_rx = None;
        self.daemon_status_rx = None;
    }
}

#[cfg(unix)]
fn terminate(child: &mut Child) {
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    if let Err(e) = kill(Pid::from_raw(child.id() as i32), Signal::SIGTERM) {
        warn!(pid = child.id(), error = %e, "Failed to send SIGTERM to daemon");
    }
}

#[cfg(not(unix))]
fn terminate(child: &mut Child) {
    if let Err(e) = child.kill() {
        warn!(pid = child.id(), error = %e, "Failed to kill daemon");
    }
}

/// Poll the child until it exits or `timeout` passes
fn wait_with_timeout(
    child: &mut Child,
    timeout: Duration,
) -> Result<Option<std::process::ExitStatus>> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child
            .try_wait()
            .context("Failed to query overlay daemon status")?
        {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        std::thread::sleep(Duration::from_millis(20));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigStore;
    use std::process::Command;
    use tempfile::TempDir;

    fn state_in(dir: &TempDir) -> SharedState {
        SharedState::new(ConfigStore::open(dir.path().join("crosshair_config.json")), false)
    }

    #[test]
    fn test_ready_and_error_messages_update_status() {
        let dir = TempDir::new().unwrap();
        let mut state = state_in(&dir);
        state.daemon_status = DaemonStatus::Starting;

        state.handle_daemon_message(DaemonMessage::Ready {
            width: 1920,
            height: 1080,
        });
        assert_eq!(state.daemon_status, DaemonStatus::Running);

        state.handle_daemon_message(DaemonMessage::Error("boom".to_string()));
        let message = state.status_message.as_ref().unwrap();
        assert!(message.text.contains("boom"));
    }

    #[test]
    fn test_sync_without_daemon_is_noop() {
        let dir = TempDir::new().unwrap();
        let mut state = state_in(&dir);
        state.sync_to_daemon();
        assert!(state.ipc_config_tx.is_none());
    }

    #[test]
    fn test_sync_sends_current_style() {
        let dir = TempDir::new().unwrap();
        let mut state = state_in(&dir);
        let (tx, rx) = ipc_channel::ipc::channel().unwrap();
        state.ipc_config_tx = Some(tx);

        state.sync_to_daemon();

        match rx.recv().unwrap() {
            ConfigMessage::Apply(style) => {
                assert_eq!(style, state.store.settings().overlay_style())
            }
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_wait_with_timeout_reports_exit() {
        let mut child = Command::new("true").spawn().unwrap();
        let status = wait_with_timeout(&mut child, Duration::from_secs(5)).unwrap();
        assert!(status.unwrap().success());
    }

    #[cfg(unix)]
    #[test]
    fn test_terminate_stops_sleeping_child() {
        let mut child = Command::new("sleep").arg("30").spawn().unwrap();
        terminate(&mut child);
        let status = wait_with_timeout(&mut child, Duration::from_secs(5)).unwrap();
        assert!(status.is_some());
    }
}
