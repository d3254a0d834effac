//! Application-wide constants
//!
//! This module contains all magic numbers and string literals used throughout
//! the application, providing a single source of truth for constant values.

/// X11 protocol and rendering constants
pub mod x11 {
    /// Standard 32-bit color depth required for translucent windows
    pub const ARGB_DEPTH: u8 = 32;

    /// Override redirect flag for unmanaged windows
    pub const OVERRIDE_REDIRECT: u32 = 1;

    /// WM_CLASS value (instance\0class\0) for the overlay window
    pub const WM_CLASS: &[u8] = b"screen-crosshair\0screen-crosshair\0";
}

/// Configuration paths and filenames
pub mod config {
    /// Directory name under XDG config, used only when the executable directory is unknown
    pub const APP_DIR: &str = "screen-crosshair";

    /// Configuration filename
    pub const FILENAME: &str = "crosshair_config.json";

    /// Indentation used when writing the config file
    pub const JSON_INDENT: &[u8] = b"    ";
}

/// IPC and daemon supervision
pub mod daemon {
    /// Interval between heartbeats sent by the overlay daemon
    pub const HEARTBEAT_INTERVAL_SECS: u64 = 5;

    /// Manager restarts the daemon after this long without a heartbeat
    pub const HEARTBEAT_TIMEOUT_SECS: u64 = 15;

    /// How often the manager checks whether the daemon process is still alive
    pub const CHECK_INTERVAL_MS: u64 = 500;

    /// Grace period between SIGTERM and SIGKILL when stopping the daemon
    pub const STOP_TIMEOUT_MS: u64 = 2000;
}

/// GUI-specific constants (egui manager window)
pub mod gui {
    use egui;

    /// Window title and application id
    pub const WINDOW_TITLE: &str = "Screen Crosshair";

    /// Fixed settings window size
    pub const WINDOW_WIDTH: f32 = 400.0;
    pub const WINDOW_HEIGHT: f32 = 700.0;

    /// Layout spacing
    pub const SECTION_SPACING: f32 = 15.0;
    pub const ITEM_SPACING: f32 = 8.0;

    /// Height of the color preview swatch
    pub const PREVIEW_HEIGHT: f32 = 50.0;

    /// Delay between the last edit and the auto-save
    pub const AUTO_SAVE_DELAY_MS: u64 = 100;

    /// Slider ranges
    pub const THICKNESS_MAX: u32 = 20;
    pub const OFFSET_STEP: f64 = 0.01;

    /// Status colors
    pub const STATUS_RUNNING: egui::Color32 = egui::Color32::from_rgb(100, 200, 100);
    pub const STATUS_STARTING: egui::Color32 = egui::Color32::from_rgb(255, 200, 0);
    pub const STATUS_STOPPED: egui::Color32 = egui::Color32::from_rgb(200, 0, 0);

    /// Error status color
    pub const COLOR_ERROR: egui::Color32 = egui::Color32::from_rgb(200, 100, 100);

    /// Side length of the generated window/tray icon
    pub const ICON_SIZE: u16 = 64;

    /// Inset ratio of the crosshair drawn in the icon
    pub const ICON_INSET: f64 = 0.1;
}

/// Default configuration values
/// These are used when the config file is missing or a key is absent
pub mod defaults {
    /// Line appearance
    pub mod line {
        /// Default line thickness in pixels
        pub const THICKNESS: u32 = 1;

        /// Default inset of the vertical line from the top/bottom edges
        pub const VERT_OFFSET: f64 = 0.0;

        /// Default inset of the horizontal line from the left/right edges
        pub const HORIZ_OFFSET: f64 = 0.0;

        /// Whether the crosshair is shown
        pub const SHOW: bool = true;
    }

    /// Line color
    pub mod color {
        pub const R: u8 = 89;
        pub const G: u8 = 247;
        pub const B: u8 = 255;
        pub const ALPHA: u8 = 255;
    }
}

/// Hard limits applied to every settings value
pub mod limits {
    /// Minimum line thickness in pixels
    pub const MIN_THICKNESS: u32 = 1;

    /// Largest inset ratio; beyond it the line endpoints would cross
    pub const MAX_OFFSET_RATIO: f64 = 0.5;
}
