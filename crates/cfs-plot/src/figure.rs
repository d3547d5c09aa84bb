use cfs_core::errors::{CfsError, ErrorInfo};

use crate::color::Rgb;

/// One named line over the figure's shared x-values.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub color: Rgb,
    pub values: Vec<f64>,
}

/// Horizontal reference line spanning the whole plot area.
#[derive(Debug, Clone, PartialEq)]
pub struct RefLine {
    pub y: f64,
    pub label: String,
    pub color: Rgb,
}

/// Line plot with a single x-axis shared by every series.
#[derive(Debug, Clone, PartialEq)]
pub struct LinePlot {
    pub title: String,
    pub xlabel: String,
    pub ylabel: String,
    pub x: Vec<f64>,
    pub x_log: bool,
    pub series: Vec<Series>,
    pub ref_lines: Vec<RefLine>,
    pub ylim: Option<(f64, f64)>,
    pub with_dots: bool,
}

impl LinePlot {
    pub fn new(title: impl Into<String>, xlabel: impl Into<String>, x: Vec<f64>) -> Self {
        Self {
            title: title.into(),
            xlabel: xlabel.into(),
            ylabel: String::new(),
            x,
            x_log: false,
            series: Vec::new(),
            ref_lines: Vec::new(),
            ylim: None,
            with_dots: true,
        }
    }

    pub fn with_ylabel(mut self, ylabel: impl Into<String>) -> Self {
        self.ylabel = ylabel.into();
        self
    }

    pub fn with_log_x(mut self) -> Self {
        self.x_log = true;
        self
    }

    pub fn with_ylim(mut self, ylim: Option<(f64, f64)>) -> Self {
        self.ylim = ylim;
        self
    }

    pub fn with_series(mut self, name: impl Into<String>, color: Rgb, values: Vec<f64>) -> Self {
        self.series.push(Series {
            name: name.into(),
            color,
            values,
        });
        self
    }

    pub fn with_ref_line(mut self, y: f64, label: impl Into<String>, color: Rgb) -> Self {
        self.ref_lines.push(RefLine {
            y,
            label: label.into(),
            color,
        });
        self
    }

    /// Every finite y-value drawn in the figure, reference lines included.
    pub fn y_values(&self) -> Vec<f64> {
        self.series
            .iter()
            .flat_map(|series| series.values.iter().copied())
            .chain(self.ref_lines.iter().map(|line| line.y))
            .filter(|v| v.is_finite())
            .collect()
    }

    /// Checks that every series lines up with the x-values.
    pub fn validate(&self) -> Result<(), CfsError> {
        if self.x.is_empty() {
            return Err(CfsError::Plot(
                ErrorInfo::new("plot-empty", "figure has no x-values")
                    .with_context("title", self.title.clone()),
            ));
        }
        for series in &self.series {
            if series.values.len() != self.x.len() {
                return Err(CfsError::Plot(
                    ErrorInfo::new("plot-shape", "series length differs from x-values")
                        .with_context("title", self.title.clone())
                        .with_context("series", series.name.clone())
                        .with_context("expected", self.x.len().to_string())
                        .with_context("found", series.values.len().to_string()),
                ));
            }
        }
        if let Some((lo, hi)) = self.ylim {
            if !(lo.is_finite() && hi.is_finite()) || hi < lo {
                return Err(CfsError::Plot(
                    ErrorInfo::new("plot-ylim", "y-limits must be finite and ordered")
                        .with_context("title", self.title.clone()),
                ));
            }
        }
        Ok(())
    }
}
