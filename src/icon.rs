//! Tray icons for each visual variant, drawn in memory.

use std::sync::LazyLock;

use image::{Rgba, RgbaImage};

use crate::Visual;
use crate::color::{Color, GRAY, RED};

const ICON_SIZE: u32 = 32;

static ICON_NEUTRAL: LazyLock<tray_icon::Icon> = LazyLock::new(|| build_icon(&GRAY));
static ICON_HIGHLIGHTED: LazyLock<tray_icon::Icon> = LazyLock::new(|| build_icon(&RED));

/// The tray icon for a visual variant.
pub fn icon(visual: Visual) -> tray_icon::Icon {
    match visual {
        Visual::Neutral => ICON_NEUTRAL.clone(),
        Visual::Highlighted => ICON_HIGHLIGHTED.clone(),
    }
}

fn build_icon(color: &Color) -> tray_icon::Icon {
    // Tray bars are dark on most desktops
    let image = rasterize_dot(color.default_dark, ICON_SIZE);
    let (width, height) = image.dimensions();
    tray_icon::Icon::from_rgba(image.into_raw(), width, height).expect("Failed to build icon")
}

/// Draw a filled circle with a one pixel soft edge on a transparent square.
pub fn rasterize_dot((r, g, b): (u8, u8, u8), size: u32) -> RgbaImage {
    let center = size as f32 / 2.0;
    let radius = center - 2.0;

    RgbaImage::from_fn(size, size, |x, y| {
        let dx = x as f32 + 0.5 - center;
        let dy = y as f32 + 0.5 - center;
        let coverage = (radius - (dx * dx + dy * dy).sqrt() + 0.5).clamp(0.0, 1.0);
        Rgba([r, g, b, (coverage * 255.0).round() as u8])
    })
}
