use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};

/// 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const fn hex(code: u32) -> Self {
        Rgb((code >> 16) as u8, (code >> 8) as u8, code as u8)
    }

    fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb(
            mix(self.0, other.0),
            mix(self.1, other.1),
            mix(self.2, other.2),
        )
    }
}

impl From<Rgb> for RGBColor {
    fn from(color: Rgb) -> Self {
        RGBColor(color.0, color.1, color.2)
    }
}

/// CSS/X11 colour names used by the sweep figures.
pub fn named(name: &str) -> Option<Rgb> {
    let code = match name {
        "black" => 0x000000,
        "grey" | "gray" => 0x808080,
        "darkgreen" => 0x006400,
        "green" => 0x008000,
        "yellowgreen" => 0x9acd32,
        "purple" => 0x800080,
        "maroon" => 0x800000,
        "red" => 0xff0000,
        "darkorange" => 0xff8c00,
        "blue" => 0x0000ff,
        _ => return None,
    };
    Some(Rgb::hex(code))
}

/// Sequential colormaps sampled on `0..=1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colormap {
    Greens,
    /// Blues reversed: dark at 0, light at 1.
    BluesReversed,
}

const GREENS: [u32; 9] = [
    0xf7fcf5, 0xe5f5e0, 0xc7e9c0, 0xa1d99b, 0x74c476, 0x41ab5d, 0x238b45, 0x006d2c, 0x00441b,
];

const BLUES: [u32; 9] = [
    0xf7fbff, 0xdeebf7, 0xc6dbef, 0x9ecae1, 0x6baed6, 0x4292c6, 0x2171b5, 0x08519c, 0x08306b,
];

impl Colormap {
    pub fn sample(self, t: f64) -> Rgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Colormap::Greens => interpolate(&GREENS, t),
            Colormap::BluesReversed => interpolate(&BLUES, 1.0 - t),
        }
    }

    /// Samples at `count` evenly spaced points from `start` to `end`.
    pub fn linspace(self, start: f64, end: f64, count: usize) -> Vec<Rgb> {
        linspace(start, end, count)
            .into_iter()
            .map(|t| self.sample(t))
            .collect()
    }
}

fn interpolate(anchors: &[u32; 9], t: f64) -> Rgb {
    let scaled = t * (anchors.len() - 1) as f64;
    let lower = (scaled.floor() as usize).min(anchors.len() - 2);
    let frac = scaled - lower as f64;
    Rgb::hex(anchors[lower]).lerp(Rgb::hex(anchors[lower + 1]), frac)
}

/// `count` evenly spaced values from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            (0..count).map(|i| start + step * i as f64).collect()
        }
    }
}
