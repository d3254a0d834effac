//! X11 utilities and cached state
//!
//! Provides helper functions for creating and managing the transparent,
//! input-transparent overlay window.

mod context;
mod window;

pub use context::{AppContext, CachedAtoms, CachedFormats};
pub use window::{
    check_extensions,
    create_overlay_window,
    resize_window,
    set_input_passthrough,
    set_window_mapped,
    setup_window_properties,
};
