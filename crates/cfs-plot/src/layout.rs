//! Axis limits and x-axis placement.

use std::ops::Range;

/// Relative padding added on both sides of the shared y-range.
pub const Y_MARGIN: f64 = 0.1;

/// Relative padding on both sides of the x-range.
const X_MARGIN: f64 = 0.05;

/// Shared y-limits over every finite value: `[min - m, max + m]` with
/// `m = 0.1 * (max - min)`.
pub fn shared_ylim(values: &[f64]) -> Option<(f64, f64)> {
    let (min, max) = finite_range(values)?;
    let margin = Y_MARGIN * (max - min);
    Some((min - margin, max + margin))
}

/// Widens a zero-height range so it can be drawn.
pub fn widen_degenerate(lo: f64, hi: f64) -> (f64, f64) {
    if hi > lo {
        (lo, hi)
    } else {
        let pad = if lo == 0.0 { 1.0 } else { lo.abs() * 0.05 };
        (lo - pad, hi + pad)
    }
}

fn finite_range(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// How x-values are placed on the horizontal axis.
///
/// A log axis is drawn linearly in decade units so the zero point of a
/// sweep can sit on it: non-positive values land on the `zero_at` decade,
/// one below the smallest positive value, and that tick reads `0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum XAxis {
    Linear,
    Log { zero_at: f64 },
}

impl XAxis {
    /// Log placement when requested and some value is positive.
    pub fn for_values(values: &[f64], log: bool) -> XAxis {
        if !log {
            return XAxis::Linear;
        }
        let smallest = values
            .iter()
            .copied()
            .filter(|v| v.is_finite() && *v > 0.0)
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.min(v))));
        match smallest {
            Some(min) => XAxis::Log {
                zero_at: min.log10().floor() - 1.0,
            },
            None => XAxis::Linear,
        }
    }

    /// Chart coordinate of a data value.
    pub fn position(&self, value: f64) -> f64 {
        match *self {
            XAxis::Linear => value,
            XAxis::Log { zero_at } => {
                if value > 0.0 {
                    value.log10()
                } else {
                    zero_at
                }
            }
        }
    }

    /// Padded chart range covering every finite value.
    pub fn range(&self, values: &[f64]) -> Range<f64> {
        let positions: Vec<f64> = values.iter().map(|v| self.position(*v)).collect();
        let (lo, hi) = finite_range(&positions).unwrap_or((0.0, 1.0));
        let (lo, hi) = widen_degenerate(lo, hi);
        let pad = X_MARGIN * (hi - lo);
        (lo - pad)..(hi + pad)
    }

    /// Tick budget for `range`; on a log axis every decade fits.
    pub fn label_count(&self, range: &Range<f64>) -> usize {
        match self {
            XAxis::Linear => 6,
            XAxis::Log { .. } => (range.end - range.start).floor() as usize + 1,
        }
    }

    /// Tick label at a chart coordinate. Log axes label whole decades only.
    pub fn label(&self, position: f64) -> String {
        let XAxis::Log { zero_at } = *self else {
            // strip representation noise such as 0.30000000000000004
            return ((position * 1e6).round() / 1e6).to_string();
        };
        let decade = position.round();
        if (position - decade).abs() > 1e-6 || decade < zero_at {
            return String::new();
        }
        if decade == zero_at {
            return "0".to_string();
        }
        match decade as i32 {
            -2 => "0.01".to_string(),
            -1 => "0.1".to_string(),
            0 => "1".to_string(),
            1 => "10".to_string(),
            2 => "100".to_string(),
            exp => format!("1e{exp}"),
        }
    }
}
