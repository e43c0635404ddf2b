use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::decile::DECILE_COUNT;

// ---------------------------------------------------------------------------
// Decile colour ramp
// ---------------------------------------------------------------------------

/// Generates `n` colours along a hue ramp from green (top) to red (bottom).
pub fn generate_ramp(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    let step = if n > 1 { 120.0 / (n - 1) as f32 } else { 0.0 };
    (0..n)
        .map(|i| {
            let hue = 120.0 - i as f32 * step;
            let hsl = Hsl::new(hue, 0.65, 0.5);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

/// Maps decile numbers (1..=10) to bar and swatch colours.
#[derive(Debug, Clone)]
pub struct DecilePalette {
    colors: Vec<Color32>,
    default_color: Color32,
}

impl Default for DecilePalette {
    fn default() -> Self {
        DecilePalette {
            colors: generate_ramp(DECILE_COUNT),
            default_color: Color32::GRAY,
        }
    }
}

impl DecilePalette {
    pub fn color_for(&self, decile: u8) -> Color32 {
        usize::from(decile)
            .checked_sub(1)
            .and_then(|i| self.colors.get(i))
            .copied()
            .unwrap_or(self.default_color)
    }
}
