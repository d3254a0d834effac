//! X11 event processing for the overlay daemon

use anyhow::Result;
use tracing::{debug, warn};
use x11rb::protocol::Event;

use super::renderer::CrosshairRenderer;
use crate::common::types::Dimensions;
use crate::x11::AppContext;

/// Context bundle for event handlers
pub struct EventContext<'a, 'b> {
    pub app_ctx: &'b AppContext<'a>,
    pub renderer: &'b mut CrosshairRenderer<'a>,
}

pub fn handle_event(ctx: &mut EventContext, event: Event) -> Result<()> {
    match event {
        Event::Expose(event) if event.window == ctx.renderer.window() => {
            // Only the last Expose of a burst triggers a repaint
            if event.count == 0 {
                ctx.renderer.paint()?;
            }
            Ok(())
        }
        Event::ConfigureNotify(event) if event.window == ctx.app_ctx.screen.root => {
            debug!(
                width = event.width,
                height = event.height,
                "Root window configured"
            );
            ctx.renderer
                .resize(Dimensions::new(event.width, event.height))
        }
        Event::Error(err) => {
            warn!(error = ?err, "X11 protocol error");
            Ok(())
        }
        _ => Ok(()),
    }
}
