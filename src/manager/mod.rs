//! Manager - egui settings window with system tray control of the overlay

mod app;
pub mod components;
pub mod state;
pub mod utils;

pub use app::run_gui;
