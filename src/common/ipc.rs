use ipc_channel::ipc::{IpcReceiver, IpcSender};
use serde::{Deserialize, Serialize};

use crate::config::OverlayStyle;

/// Messages sent from Manager to Daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ConfigMessage {
    /// Redraw the crosshair with these settings
    Apply(OverlayStyle),
}

/// Messages sent from Daemon to Manager
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum DaemonMessage {
    /// Overlay window created and mapped
    Ready { width: u16, height: u16 },
    /// Daemon encountered a non-fatal error
    Error(String),
    /// Periodic liveness signal
    Heartbeat,
}

/// The bootstrap payload sent over the initial server channel.
/// Contains the channel for receiving config updates and the channel for sending status updates.
pub type BootstrapMessage = (IpcSender<ConfigMessage>, IpcReceiver<DaemonMessage>);
