//! Application context and cached X11 state

use anyhow::{Context, Result};
use x11rb::protocol::render::{ConnectionExt as RenderExt, Pictformat};
use x11rb::protocol::xproto::*;
use x11rb::rust_connection::RustConnection;

use crate::constants::x11;

/// Application context holding immutable shared state
pub struct AppContext<'a> {
    pub conn: &'a RustConnection,
    pub screen: &'a Screen,
    pub atoms: &'a CachedAtoms,
    pub formats: &'a CachedFormats,
}

/// Pre-cached X11 atoms to avoid repeated roundtrips
#[derive(Debug)]
pub struct CachedAtoms {
    pub net_wm_pid: Atom,
    pub net_wm_state: Atom,
    pub net_wm_state_above: Atom,
    pub net_wm_state_skip_taskbar: Atom,
    pub net_wm_state_skip_pager: Atom,
    pub net_wm_window_type: Atom,
    pub net_wm_window_type_dock: Atom,
    pub wm_class: Atom,
}

fn intern(conn: &RustConnection, name: &str) -> Result<Atom> {
    Ok(conn
        .intern_atom(false, name.as_bytes())
        .with_context(|| format!("Failed to intern {name} atom"))?
        .reply()
        .with_context(|| format!("Failed to get reply for {name} atom"))?
        .atom)
}

impl CachedAtoms {
    pub fn new(conn: &RustConnection) -> Result<Self> {
        Ok(Self {
            net_wm_pid: intern(conn, "_NET_WM_PID")?,
            net_wm_state: intern(conn, "_NET_WM_STATE")?,
            net_wm_state_above: intern(conn, "_NET_WM_STATE_ABOVE")?,
            net_wm_state_skip_taskbar: intern(conn, "_NET_WM_STATE_SKIP_TASKBAR")?,
            net_wm_state_skip_pager: intern(conn, "_NET_WM_STATE_SKIP_PAGER")?,
            net_wm_window_type: intern(conn, "_NET_WM_WINDOW_TYPE")?,
            net_wm_window_type_dock: intern(conn, "_NET_WM_WINDOW_TYPE_DOCK")?,
            wm_class: intern(conn, "WM_CLASS")?,
        })
    }
}

/// Pre-cached picture format and visual for translucent drawing
#[derive(Debug)]
pub struct CachedFormats {
    pub argb: Pictformat,
    pub argb_visual: Visualid,
}

impl CachedFormats {
    pub fn new(conn: &RustConnection, screen: &Screen) -> Result<Self> {
        let formats_reply = conn
            .render_query_pict_formats()
            .context("Failed to query RENDER picture formats")?
            .reply()
            .context("Failed to get RENDER formats reply")?;

        let argb = formats_reply
            .formats
            .iter()
            .find(|f| f.depth == x11::ARGB_DEPTH && f.direct.alpha_mask != 0)
            .ok_or_else(|| anyhow::anyhow!("No ARGB format found for depth {}", x11::ARGB_DEPTH))?
            .id;

        let argb_visual = find_argb_visual(screen).ok_or_else(|| {
            anyhow::anyhow!(
                "No {}-bit TrueColor visual available (is a compositor running?)",
                x11::ARGB_DEPTH
            )
        })?;

        Ok(Self { argb, argb_visual })
    }
}

/// First 32-bit TrueColor visual of the screen
fn find_argb_visual(screen: &Screen) -> Option<Visualid> {
    screen
        .allowed_depths
        .iter()
        .filter(|depth| depth.depth == x11::ARGB_DEPTH)
        .flat_map(|depth| depth.visuals.iter())
        .find(|visual| visual.class == VisualClass::TRUE_COLOR)
        .map(|visual| visual.visual_id)
}
