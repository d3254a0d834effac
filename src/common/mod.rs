//! Types shared by the manager and the overlay daemon

pub mod color;
pub mod ipc;
pub mod types;
