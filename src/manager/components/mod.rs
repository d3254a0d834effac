pub mod header;
pub mod settings_panel;
pub mod tray;
