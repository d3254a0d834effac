//! Overlay daemon - draws the crosshair on a click-through window

mod dispatcher;
mod main_loop;
mod renderer;

pub use main_loop::run_overlay_daemon;
