//! Draws a [`LinePlot`] onto any plotters drawing area.

use std::fmt::Display;

use cfs_core::errors::{CfsError, ErrorInfo};
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;

use crate::figure::LinePlot;
use crate::layout::{shared_ylim, widen_degenerate, XAxis};

const FONT: &str = "sans-serif";
const DOT_RADIUS: i32 = 3;

fn draw_error(plot: &LinePlot, err: impl Display) -> CfsError {
    CfsError::Plot(
        ErrorInfo::new("plot-draw", err.to_string())
            .with_context("title", plot.title.clone()),
    )
}

/// Draws the axes, reference lines, series (with dots) and legend of `plot`.
///
/// Log x-axes are drawn in decade units (see [`XAxis`]); the y-range is the
/// figure's `ylim`, or the padded range of its own values.
pub fn draw_figure<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    plot: &LinePlot,
) -> Result<(), CfsError> {
    let fail = |err: DrawingAreaErrorKind<DB::ErrorType>| draw_error(plot, err);
    plot.validate()?;
    root.fill(&WHITE).map_err(fail)?;

    let axis = XAxis::for_values(&plot.x, plot.x_log);
    let x_range = axis.range(&plot.x);
    let (y_lo, y_hi) = plot
        .ylim
        .or_else(|| shared_ylim(&plot.y_values()))
        .unwrap_or((0.0, 1.0));
    let (y_lo, y_hi) = widen_degenerate(y_lo, y_hi);

    let mut chart = ChartBuilder::on(root)
        .caption(&plot.title, (FONT, 22))
        .margin(16)
        .x_label_area_size(48)
        .y_label_area_size(64)
        .build_cartesian_2d(x_range.clone(), y_lo..y_hi)
        .map_err(fail)?;

    let tick_label = |position: &f64| axis.label(*position);
    {
        let mut mesh = chart.configure_mesh();
        mesh.x_desc(plot.xlabel.as_str())
            .y_desc(plot.ylabel.as_str())
            .x_labels(axis.label_count(&x_range))
            .y_labels(8)
            .x_label_formatter(&tick_label)
            .label_style((FONT, 14))
            .axis_desc_style((FONT, 16));
        mesh.draw().map_err(fail)?;
    }

    for line in &plot.ref_lines {
        let color = RGBColor::from(line.color);
        let ends = vec![(x_range.start, line.y), (x_range.end, line.y)];
        let anno = chart
            .draw_series(LineSeries::new(ends, color.stroke_width(1)))
            .map_err(fail)?;
        if !line.label.is_empty() {
            anno.label(line.label.as_str()).legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(1))
            });
        }
    }

    let x: Vec<f64> = plot.x.iter().map(|value| axis.position(*value)).collect();
    for series in &plot.series {
        let color = RGBColor::from(series.color);
        let points: Vec<(f64, f64)> = x
            .iter()
            .zip(&series.values)
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .map(|(x, y)| (*x, *y))
            .collect();
        chart
            .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))
            .map_err(fail)?
            .label(series.name.as_str())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
        if plot.with_dots {
            chart
                .draw_series(
                    points
                        .iter()
                        .map(|point| Circle::new(*point, DOT_RADIUS, color.filled())),
                )
                .map_err(fail)?;
        }
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font((FONT, 14))
        .draw()
        .map_err(fail)?;
    Ok(())
}
