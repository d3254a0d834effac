//! Configuration management
//!
//! Handles the crosshair settings record and its JSON persistence.
//! Nothing in this module depends on a windowing toolkit.

pub mod settings;
pub mod store;

pub use settings::{OverlayStyle, Settings, SettingsPatch};
pub use store::{ConfigStore, default_path};
