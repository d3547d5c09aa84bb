//! Sweep figures drawn with plotters and written as one multi-page PDF.

pub mod chart;
pub mod color;
pub mod figure;
pub mod layout;
pub mod pdf;
mod sweep_figures;

pub use chart::draw_figure;
pub use color::{named, Colormap, Rgb};
pub use figure::{LinePlot, RefLine, Series};
pub use layout::{shared_ylim, XAxis};
pub use pdf::{PdfBackend, PdfDocument};
pub use sweep_figures::{figure_title, plot_name, render_pdf, sweep_figures, YLABEL};
