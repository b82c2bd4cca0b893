//! Color palette shared by the interactive and the static charts.

use egui::Color32;
use plotters::style::RGBColor;

/// Plain RGB triple, converted to egui or plotters colors at draw time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn to_egui(self) -> Color32 {
        Color32::from_rgb(self.0, self.1, self.2)
    }

    pub fn to_plotters(self) -> RGBColor {
        RGBColor(self.0, self.1, self.2)
    }

    fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb(mix(self.0, other.0), mix(self.1, other.1), mix(self.2, other.2))
    }
}

/// Zomato red, used for headers and highlights.
pub const BRAND: Rgb = Rgb(226, 55, 68);

pub const PALETTE: [Rgb; 10] = [
    Rgb(231, 76, 60),  // Red
    Rgb(52, 152, 219), // Blue
    Rgb(46, 204, 113), // Green
    Rgb(155, 89, 182), // Purple
    Rgb(243, 156, 18), // Orange
    Rgb(26, 188, 156), // Teal
    Rgb(233, 30, 99),  // Pink
    Rgb(0, 188, 212),  // Cyan
    Rgb(121, 85, 72),  // Brown
    Rgb(96, 125, 139), // Blue Grey
];

const VIRIDIS: [Rgb; 5] = [
    Rgb(68, 1, 84),
    Rgb(59, 82, 139),
    Rgb(33, 145, 140),
    Rgb(94, 201, 98),
    Rgb(253, 231, 37),
];

const DIVERGING: [Rgb; 3] = [Rgb(33, 102, 172), Rgb(247, 247, 247), Rgb(178, 24, 43)];

/// Categorical color for the i-th series.
pub fn categorical(i: usize) -> Rgb {
    PALETTE[i % PALETTE.len()]
}

fn gradient(stops: &[Rgb], t: f64) -> Rgb {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let segments = stops.len() - 1;
    let pos = t * segments as f64;
    let idx = (pos.floor() as usize).min(segments - 1);
    stops[idx].lerp(stops[idx + 1], pos - idx as f64)
}

/// Viridis-like ramp, `t` in [0, 1].
pub fn sequential(t: f64) -> Rgb {
    gradient(&VIRIDIS, t)
}

/// Blue-white-red ramp for correlations, `r` in [-1, 1].
pub fn diverging(r: f64) -> Rgb {
    gradient(&DIVERGING, (r + 1.0) / 2.0)
}

/// Map `value` in `[min, max]` onto the sequential ramp.
pub fn scaled(value: f64, min: f64, max: f64) -> Rgb {
    if max - min <= f64::EPSILON {
        return sequential(1.0);
    }
    sequential((value - min) / (max - min))
}
