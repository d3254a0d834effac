use std::process::Child;
use std::sync::mpsc::Receiver;
use std::time::Instant;

use crate::common::ipc::{BootstrapMessage, ConfigMessage, DaemonMessage};
use crate::config::{ConfigStore, Settings};
use ipc_channel::ipc::IpcSender;

pub mod daemon;
pub mod settings;
pub mod types;

pub use types::*;

// Core application state shared between Manager and Tray
pub struct SharedState {
    pub store: ConfigStore,
    /// Working copy edited by the panel and the tray; persisted by the debounced save
    pub draft: Settings,
    pub debug_mode: bool,
    pub daemon: Option<Child>,
    pub daemon_status: DaemonStatus,
    pub last_health_check: Instant,
    pub status_message: Option<StatusMessage>,
    /// Time of the most recent unsaved edit
    pub pending_save: Option<Instant>,
    pub should_quit: bool,

    // IPC
    pub ipc_config_tx: Option<IpcSender<ConfigMessage>>,
    pub bootstrap_rx: Option<Receiver<BootstrapMessage>>,
    pub daemon_status_rx: Option<Receiver<DaemonMessage>>,
    pub last_heartbeat: Instant,
}

impl SharedState {
    pub fn new(store: ConfigStore, debug_mode: bool) -> Self {
        let draft = store.settings().clone();
        Self {
            store,
            draft,
            debug_mode,
            daemon: None,
            daemon_status: DaemonStatus::Stopped,
            last_health_check: Instant::now(),
            status_message: None,
            pending_save: None,
            should_quit: false,

            ipc_config_tx: None,
            bootstrap_rx: None,
            daemon_status_rx: None,
            last_heartbeat: Instant::now(),
        }
    }
}
