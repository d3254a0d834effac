use anyhow::{Context, Result};
use eframe::egui;
use std::path::Path;
use std::process::{Child, Command};

use crate::common::types::{Rect, geometry};
use crate::constants::defaults::color;
use crate::constants::gui::{ICON_INSET, ICON_SIZE};

/// Crosshair icon in the default line color, as tightly packed RGBA rows
pub fn crosshair_icon_rgba(size: u16) -> Vec<u8> {
    let mut rgba = vec![0u8; usize::from(size) * usize::from(size) * 4];
    let (vertical, horizontal) = geometry::compute(size, size, ICON_INSET, ICON_INSET);
    let thickness = u32::from((size / 8).max(1));

    for rect in [vertical.to_rect(thickness), horizontal.to_rect(thickness)] {
        fill_rect(&mut rgba, size, rect, [color::R, color::G, color::B, 0xFF]);
    }
    rgba
}

fn fill_rect(rgba: &mut [u8], size: u16, rect: Rect, pixel: [u8; 4]) {
    let size = i64::from(size);
    let x0 = i64::from(rect.x).clamp(0, size);
    let y0 = i64::from(rect.y).clamp(0, size);
    let x1 = (i64::from(rect.x) + i64::from(rect.width)).clamp(0, size);
    let y1 = (i64::from(rect.y) + i64::from(rect.height)).clamp(0, size);

    for y in y0..y1 {
        for x in x0..x1 {
            let offset = ((y * size + x) * 4) as usize;
            rgba[offset..offset + 4].copy_from_slice(&pixel);
        }
    }
}

/// Window icon for the settings viewport
pub fn load_window_icon() -> egui::IconData {
    egui::IconData {
        rgba: crosshair_icon_rgba(ICON_SIZE),
        width: u32::from(ICON_SIZE),
        height: u32::from(ICON_SIZE),
    }
}

/// Tray icon pixmap; ksni wants ARGB in network byte order
#[cfg(target_os = "linux")]
pub fn load_tray_icon_pixmap() -> ksni::Icon {
    ksni::Icon {
        width: i32::from(ICON_SIZE),
        height: i32::from(ICON_SIZE),
        data: rgba_to_argb(&crosshair_icon_rgba(ICON_SIZE)),
    }
}

fn rgba_to_argb(rgba: &[u8]) -> Vec<u8> {
    rgba.chunks_exact(4)
        .flat_map(|chunk| [chunk[3], chunk[0], chunk[1], chunk[2]])
        .collect()
}

pub fn spawn_daemon(ipc_server_name: &str, config_path: &Path, debug: bool) -> Result<Child> {
    let exe_path = std::env::current_exe().context("Failed to resolve executable path")?;
    let mut command = Command::new(exe_path);
    command
        .arg("--overlay")
        .arg("--ipc-server")
        .arg(ipc_server_name)
        .arg("--config")
        .arg(config_path);
    if debug {
        command.arg("--debug");
    }
    command.spawn().context("Failed to spawn overlay daemon")
}

/// Swatch color for the settings preview
pub fn preview_color(r: u8, g: u8, b: u8, alpha: u8) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(r, g, b, alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(rgba: &[u8], size: u16, x: usize, y: usize) -> &[u8] {
        let offset = (y * usize::from(size) + x) * 4;
        &rgba[offset..offset + 4]
    }

    #[test]
    fn test_icon_buffer_matches_size() {
        assert_eq!(crosshair_icon_rgba(64).len(), 64 * 64 * 4);
        let icon = load_window_icon();
        assert_eq!(icon.rgba.len() as u32, icon.width * icon.height * 4);
    }

    #[test]
    fn test_icon_draws_crosshair() {
        let rgba = crosshair_icon_rgba(64);
        assert_eq!(
            pixel(&rgba, 64, 32, 32),
            &[color::R, color::G, color::B, 0xFF]
        );
        // Corners stay transparent, and so do the inset ends of each line
        assert_eq!(pixel(&rgba, 64, 0, 0)[3], 0);
        assert_eq!(pixel(&rgba, 64, 32, 2)[3], 0);
        assert_eq!(pixel(&rgba, 64, 2, 32)[3], 0);
    }

    #[test]
    fn test_rgba_to_argb_reorders_channels() {
        assert_eq!(rgba_to_argb(&[1, 2, 3, 4, 5, 6, 7, 8]), vec![4, 1, 2, 3, 8, 5, 6, 7]);
    }

    #[test]
    fn test_fill_rect_clips_to_bounds() {
        let mut rgba = vec![0u8; 4 * 4 * 4];
        fill_rect(
            &mut rgba,
            4,
            Rect {
                x: -2,
                y: 3,
                width: 10,
                height: 5,
            },
            [9, 9, 9, 9],
        );
        assert_eq!(rgba.iter().filter(|&&v| v == 9).count(), 4 * 4);
        assert_eq!(pixel(&rgba, 4, 0, 2), &[0, 0, 0, 0]);
    }
}
