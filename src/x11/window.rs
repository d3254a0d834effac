//! Overlay window creation and configuration

use anyhow::{Context, Result};
use tracing::{debug, info};
use x11rb::connection::Connection;
use x11rb::protocol::render::ConnectionExt as RenderExt;
use x11rb::protocol::shape::{self, ConnectionExt as ShapeExt};
use x11rb::protocol::xproto::*;
use x11rb::rust_connection::RustConnection;
use x11rb::wrapper::ConnectionExt as WrapperExt;

use crate::common::types::Dimensions;
use crate::constants::x11;

use super::AppContext;

/// Fail early if the server lacks the extensions the overlay relies on
pub fn check_extensions(conn: &RustConnection) -> Result<()> {
    let shape = conn
        .shape_query_version()
        .context("Failed to query SHAPE extension version. Is SHAPE available?")?
        .reply()
        .context("SHAPE extension not available")?;
    let render = conn
        .render_query_version(0, 11)
        .context("Failed to query RENDER extension version. Is RENDER available?")?
        .reply()
        .context("RENDER extension not available")?;

    debug!(
        shape = %format!("{}.{}", shape.major_version, shape.minor_version),
        render = %format!("{}.{}", render.major_version, render.minor_version),
        "X11 extensions available"
    );
    Ok(())
}

/// Create the unmanaged, fully transparent overlay window covering `dimensions`.
///
/// Returns the window and the colormap created for its 32-bit visual; both
/// belong to the caller.
pub fn create_overlay_window(
    ctx: &AppContext,
    dimensions: Dimensions,
) -> Result<(Window, Colormap)> {
    let colormap = ctx
        .conn
        .generate_id()
        .context("Failed to generate X11 colormap ID")?;
    ctx.conn
        .create_colormap(
            ColormapAlloc::NONE,
            colormap,
            ctx.screen.root,
            ctx.formats.argb_visual,
        )
        .context("Failed to create colormap for ARGB visual")?;

    let window = ctx
        .conn
        .generate_id()
        .context("Failed to generate X11 window ID")?;
    ctx.conn
        .create_window(
            x11::ARGB_DEPTH,
            window,
            ctx.screen.root,
            0,
            0,
            dimensions.width,
            dimensions.height,
            0,
            WindowClass::INPUT_OUTPUT,
            ctx.formats.argb_visual,
            &CreateWindowAux::new()
                .background_pixel(0)
                .border_pixel(0)
                .colormap(colormap)
                .override_redirect(x11::OVERRIDE_REDIRECT)
                .event_mask(EventMask::EXPOSURE | EventMask::STRUCTURE_NOTIFY),
        )
        .context("Failed to create overlay window")?;

    info!(
        window = window,
        width = dimensions.width,
        height = dimensions.height,
        "Created overlay window"
    );
    Ok((window, colormap))
}

/// Setup window properties (PID, WM_CLASS, dock type, always-on-top)
pub fn setup_window_properties(ctx: &AppContext, window: Window) -> Result<()> {
    let pid = std::process::id();
    ctx.conn
        .change_property32(
            PropMode::REPLACE,
            window,
            ctx.atoms.net_wm_pid,
            AtomEnum::CARDINAL,
            &[pid],
        )
        .context("Failed to set _NET_WM_PID on overlay")?;

    ctx.conn
        .change_property8(
            PropMode::REPLACE,
            window,
            ctx.atoms.wm_class,
            AtomEnum::STRING,
            x11::WM_CLASS,
        )
        .context("Failed to set WM_CLASS on overlay")?;

    ctx.conn
        .change_property32(
            PropMode::REPLACE,
            window,
            ctx.atoms.net_wm_window_type,
            AtomEnum::ATOM,
            &[ctx.atoms.net_wm_window_type_dock],
        )
        .context("Failed to set _NET_WM_WINDOW_TYPE on overlay")?;

    ctx.conn
        .change_property32(
            PropMode::REPLACE,
            window,
            ctx.atoms.net_wm_state,
            AtomEnum::ATOM,
            &[
                ctx.atoms.net_wm_state_above,
                ctx.atoms.net_wm_state_skip_taskbar,
                ctx.atoms.net_wm_state_skip_pager,
            ],
        )
        .context("Failed to set _NET_WM_STATE on overlay")?;

    Ok(())
}

/// Empty the input region so every pointer event reaches the windows below
pub fn set_input_passthrough(conn: &RustConnection, window: Window) -> Result<()> {
    conn.shape_rectangles(
        shape::SO::SET,
        shape::SK::INPUT,
        ClipOrdering::UNSORTED,
        window,
        0,
        0,
        &[],
    )
    .context("Failed to clear overlay input shape")?;
    Ok(())
}

/// Keep the overlay on top after resizing it to `dimensions`
pub fn resize_window(conn: &RustConnection, window: Window, dimensions: Dimensions) -> Result<()> {
    conn.configure_window(
        window,
        &ConfigureWindowAux::new()
            .x(0)
            .y(0)
            .width(dimensions.width as u32)
            .height(dimensions.height as u32)
            .stack_mode(StackMode::ABOVE),
    )
    .context("Failed to resize overlay window")?;
    Ok(())
}

/// Raise and map, or unmap, the overlay
pub fn set_window_mapped(conn: &RustConnection, window: Window, mapped: bool) -> Result<()> {
    if mapped {
        conn.configure_window(
            window,
            &ConfigureWindowAux::new().stack_mode(StackMode::ABOVE),
        )
        .context("Failed to raise overlay window")?;
        conn.map_window(window)
            .context("Failed to map overlay window")?;
    } else {
        conn.unmap_window(window)
            .context("Failed to unmap overlay window")?;
    }
    conn.flush().context("Failed to flush X11 connection")?;
    debug!(window = window, mapped, "Overlay visibility changed");
    Ok(())
}
