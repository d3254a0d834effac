//! Crosshair rendering onto the overlay window

use anyhow::{Context, Result};
use tracing::{debug, error, info};
use x11rb::connection::Connection;
use x11rb::protocol::render::{
    Color, ConnectionExt as RenderExt, CreatePictureAux, PictOp, Picture,
};
use x11rb::protocol::xproto::*;
use x11rb::rust_connection::RustConnection;

use crate::common::types::{Dimensions, Rect};
use crate::config::OverlayStyle;
use crate::x11::{self as x11_utils, AppContext};

const TRANSPARENT: Color = Color {
    red: 0,
    green: 0,
    blue: 0,
    alpha: 0,
};

/// Owns the overlay window and its RENDER picture
pub struct CrosshairRenderer<'a> {
    conn: &'a RustConnection,
    window: Window,
    colormap: Colormap,
    picture: Picture,
    dimensions: Dimensions,
    style: OverlayStyle,
    mapped: bool,
}

impl<'a> CrosshairRenderer<'a> {
    pub fn new(ctx: &AppContext<'a>, dimensions: Dimensions, style: OverlayStyle) -> Result<Self> {
        let (window, colormap) = x11_utils::create_overlay_window(ctx, dimensions)?;

        // Free the window if anything below fails before Self exists
        struct WindowGuard<'c> {
            conn: &'c RustConnection,
            window: Window,
            colormap: Colormap,
            armed: bool,
        }
        impl Drop for WindowGuard<'_> {
            fn drop(&mut self) {
                if self.armed {
                    if let Err(e) = self.conn.destroy_window(self.window) {
                        error!(window = self.window, error = %e, "Failed to cleanup overlay window after initialization failure");
                    }
                    let _ = self.conn.free_colormap(self.colormap);
                    let _ = self.conn.flush();
                }
            }
        }
        let mut guard = WindowGuard {
            conn: ctx.conn,
            window,
            colormap,
            armed: true,
        };

        x11_utils::setup_window_properties(ctx, window)?;
        x11_utils::set_input_passthrough(ctx.conn, window)?;

        let picture = ctx
            .conn
            .generate_id()
            .context("Failed to generate ID for overlay picture")?;
        ctx.conn
            .render_create_picture(picture, window, ctx.formats.argb, &CreatePictureAux::new())
            .context("Failed to create overlay picture")?;

        guard.armed = false;

        let mut renderer = Self {
            conn: ctx.conn,
            window,
            colormap,
            picture,
            dimensions,
            style,
            mapped: false,
        };
        renderer.sync_visibility()?;
        Ok(renderer)
    }

    pub fn window(&self) -> Window {
        self.window
    }

    /// Take a new style, repainting or changing visibility as needed
    pub fn apply(&mut self, style: OverlayStyle) -> Result<()> {
        let changed = self.style != style;
        self.style = style;
        debug!(?style, changed, "Applying overlay style");

        let was_mapped = self.mapped;
        self.sync_visibility()?;

        // A fresh map paints on its Expose event
        if changed && was_mapped && self.mapped {
            self.paint()?;
        }
        Ok(())
    }

    /// Follow a change of the root window size
    pub fn resize(&mut self, dimensions: Dimensions) -> Result<()> {
        if dimensions == self.dimensions || dimensions.is_empty() {
            return Ok(());
        }
        info!(
            width = dimensions.width,
            height = dimensions.height,
            "Resizing overlay to new screen size"
        );
        self.dimensions = dimensions;
        x11_utils::resize_window(self.conn, self.window, dimensions)?;
        if self.mapped {
            self.paint()?;
        }
        Ok(())
    }

    /// Clear the window and draw both crosshair lines
    pub fn paint(&self) -> Result<()> {
        if !self.mapped {
            return Ok(());
        }

        let full = Rectangle {
            x: 0,
            y: 0,
            width: self.dimensions.width,
            height: self.dimensions.height,
        };
        self.conn
            .render_fill_rectangles(PictOp::SRC, self.picture, TRANSPARENT, &[full])
            .context("Failed to clear overlay")?;

        let rects = crosshair_rects(&self.style, self.dimensions);
        if !rects.is_empty() && self.style.alpha > 0 {
            self.conn
                .render_fill_rectangles(
                    PictOp::OVER,
                    self.picture,
                    premultiplied_color(&self.style),
                    &rects,
                )
                .context("Failed to draw crosshair lines")?;
        }

        self.conn
            .flush()
            .context("Failed to flush X11 connection after paint")?;
        Ok(())
    }

    fn sync_visibility(&mut self) -> Result<()> {
        if self.style.visible != self.mapped {
            x11_utils::set_window_mapped(self.conn, self.window, self.style.visible)?;
            self.mapped = self.style.visible;
            info!(visible = self.mapped, "Crosshair visibility changed");
        }
        Ok(())
    }
}

impl Drop for CrosshairRenderer<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.conn.render_free_picture(self.picture) {
            error!(picture = self.picture, error = %e, "Failed to free overlay picture");
        }
        if let Err(e) = self.conn.destroy_window(self.window) {
            error!(window = self.window, error = %e, "Failed to destroy overlay window");
        }
        if let Err(e) = self.conn.free_colormap(self.colormap) {
            error!(colormap = self.colormap, error = %e, "Failed to free overlay colormap");
        }
        let _ = self.conn.flush();
    }
}

/// Both crosshair lines as X11 rectangles, skipping degenerate lines
fn crosshair_rects(style: &OverlayStyle, viewport: Dimensions) -> Vec<Rectangle> {
    let (vertical, horizontal) = style.lines(viewport);
    [vertical, horizontal]
        .iter()
        .filter(|line| line.length() > 0)
        .map(|line| to_x11_rect(line.to_rect(style.thickness)))
        .collect()
}

fn to_x11_rect(rect: Rect) -> Rectangle {
    let clamp_pos = |v: i32| v.clamp(i16::MIN as i32, i16::MAX as i32) as i16;
    let clamp_len = |v: u32| v.min(u16::MAX as u32) as u16;
    Rectangle {
        x: clamp_pos(rect.x),
        y: clamp_pos(rect.y),
        width: clamp_len(rect.width),
        height: clamp_len(rect.height),
    }
}

/// RENDER expects 16-bit channels premultiplied by alpha
fn premultiplied_color(style: &OverlayStyle) -> Color {
    let alpha = u64::from(style.alpha) * 257;
    let premultiply = |channel: u8| ((u64::from(channel) * 257 * alpha + 32_767) / 65_535) as u16;
    Color {
        red: premultiply(style.r),
        green: premultiply(style.g),
        blue: premultiply(style.b),
        alpha: alpha as u16,
    }
}
