use std::path::Path;

use cfs_core::errors::CfsError;
use cfs_core::Configuration;
use cfs_exp::{SweepResults, SweepTable};
use tracing::info;

use crate::color::{named, Colormap, Rgb};
use crate::figure::LinePlot;
use crate::layout::shared_ylim;
use crate::pdf::PdfDocument;

pub const YLABEL: &str = "Average accuracy (after all tasks)";
const BASELINE_LABEL: &str = "None";
const GATE_XLABEL: &str = "Context gates: % of nodes gated";

/// File stem shared by the PDF and the summaries: `hyperParams-<protocol>`.
pub fn plot_name(config: &Configuration) -> String {
    format!("hyperParams-{}", config.protocol_label())
}

/// `"<experiment>  -  incremental <scenario> learning"`.
pub fn figure_title(config: &Configuration) -> String {
    format!(
        "{}  -  incremental {} learning",
        config.experiment, config.scenario
    )
}

fn color(name: &str) -> Rgb {
    named(name).unwrap_or(Rgb(0, 0, 0))
}

/// One figure per non-empty family, in reporting order, with y-limits
/// shared across all of them.
pub fn sweep_figures(results: &SweepResults, title: &str) -> Vec<LinePlot> {
    let ylim = shared_ylim(&results.all_scores());
    let grey = color("grey");
    let base = |xlabel: &str, x: Vec<f64>| {
        LinePlot::new(title, xlabel, x)
            .with_ylabel(YLABEL)
            .with_ylim(ylim)
    };
    let mut figures = Vec::new();

    if !results.ewc.is_empty() {
        let greens = Colormap::Greens.linspace(0.7, 0.3, results.online_ewc.rows.len());
        let mut figure = base("EWC: lambda (log-scale)", results.ewc.values.clone())
            .with_log_x()
            .with_series("EWC", color("darkgreen"), results.ewc.scores.clone());
        for (row, shade) in results.online_ewc.rows.iter().zip(greens) {
            figure = figure.with_series(
                format!("Online EWC - gamma = {}", row.outer),
                shade,
                row.table.scores.clone(),
            );
        }
        figures.push(figure.with_ref_line(results.baseline, BASELINE_LABEL, grey));
    }

    if !results.si.is_empty() {
        figures.push(
            base("SI: c (log-scale)", results.si.values.clone())
                .with_log_x()
                .with_series("SI", color("yellowgreen"), results.si.scores.clone())
                .with_ref_line(results.baseline, BASELINE_LABEL, grey),
        );
    }

    if !results.bir.is_empty() {
        let without_si = results.bir_without_si();
        figures.push(
            base(GATE_XLABEL, without_si.values.clone())
                .with_series(
                    "Brain-Inspired Replay (BI-R)",
                    color("purple"),
                    without_si.scores,
                )
                .with_ref_line(results.baseline, BASELINE_LABEL, grey),
        );

        let inner = results
            .bir
            .rows
            .first()
            .map(|row| row.table.values.clone())
            .unwrap_or_default();
        let blues = Colormap::BluesReversed.linspace(0.6, 0.0, results.bir.rows.len());
        let mut figure = base("BI-R + SI: c (log-scale)", inner).with_log_x();
        for (row, shade) in results.bir.rows.iter().zip(blues) {
            figure = figure.with_series(
                format!("BI-R, gate-prop = {}", row.outer),
                shade,
                row.table.scores.clone(),
            );
        }
        figures.push(figure.with_ref_line(results.baseline, BASELINE_LABEL, grey));
    }

    if let Some(ablations) = &results.ablations {
        let colors = ["maroon", "red", "green", "darkorange"];
        let tables: Vec<(&str, &SweepTable)> = ablations
            .labelled()
            .into_iter()
            .filter(|(_, table)| !table.is_empty())
            .collect();
        if let Some((_, first)) = tables.first() {
            let mut figure = base(GATE_XLABEL, first.values.clone());
            for ((label, table), name) in ablations.labelled().into_iter().zip(colors) {
                if !table.is_empty() {
                    figure = figure.with_series(label, color(name), table.scores.clone());
                }
            }
            figures.push(figure.with_ref_line(results.baseline, BASELINE_LABEL, grey));
        }
    }

    figures
}

/// Appends every figure as a page of one PDF at `path`.
pub fn render_pdf(figures: &[LinePlot], path: &Path) -> Result<(), CfsError> {
    let mut document = PdfDocument::new();
    for figure in figures {
        document.add_page(figure)?;
    }
    document.write(path)?;
    info!(path = %path.display(), pages = figures.len(), "generated plot");
    Ok(())
}
