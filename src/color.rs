use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

fn to_color32(rgb: Srgb) -> Color32 {
    let rgb: Srgb<u8> = rgb.into_format();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let rgb: Srgb = Hsl::new(hue, 0.75, 0.55).into_color();
            to_color32(rgb)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Recclass colours
// ---------------------------------------------------------------------------

/// Stable recclass → colour assignment for the line chart legend.
#[derive(Debug, Clone, Default)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
}

impl ColorMap {
    pub fn new(recclasses: &BTreeSet<String>) -> Self {
        let mapping = recclasses
            .iter()
            .cloned()
            .zip(generate_palette(recclasses.len()))
            .collect();
        ColorMap { mapping }
    }

    pub fn color_for(&self, recclass: &str) -> Color32 {
        self.mapping
            .get(recclass)
            .copied()
            .unwrap_or(Color32::LIGHT_BLUE)
    }
}

// ---------------------------------------------------------------------------
// Count gradient for the mass histogram
// ---------------------------------------------------------------------------

/// Piecewise-linear colour scale over bar counts. Stop `x` is
/// `(x / 10, x / 20, 0.75)` with channels capped at 1, one stop per bin.
#[derive(Debug, Clone)]
pub struct CountGradient {
    stops: Vec<LinSrgb>,
    min: f64,
    max: f64,
}

impl CountGradient {
    pub fn new(bin_count: usize, counts: impl IntoIterator<Item = usize>) -> Self {
        let stops = (0..bin_count.max(1))
            .map(|x| {
                let x = x as f32;
                Srgb::new((x / 10.0).min(1.0), (x / 20.0).min(1.0), 0.75).into_linear()
            })
            .collect();

        let (min, max) = counts
            .into_iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), c| {
                (lo.min(c as f64), hi.max(c as f64))
            });
        CountGradient { stops, min, max }
    }

    pub fn color_for(&self, count: usize) -> Color32 {
        let span = self.max - self.min;
        let t = if span.is_finite() && span > 0.0 {
            ((count as f64 - self.min) / span).clamp(0.0, 1.0) as f32
        } else {
            0.0
        };

        let last = self.stops.len() - 1;
        let scaled = t * last as f32;
        let i = (scaled.floor() as usize).min(last);
        let j = (i + 1).min(last);
        let mixed = self.stops[i].mix(self.stops[j], scaled - i as f32);
        to_color32(Srgb::from_linear(mixed))
    }
}
