use std::error::Error;
use std::fs;
use std::path::PathBuf;

use cfs_core::errors::{CfsError, ErrorInfo};
use cfs_core::Configuration;
use cfs_exp::{
    print_report, run_sweep, write_summary_csv, write_summary_json, CommandRunner, DirStore,
    Evaluator, RunTarget, Runner, RunnerSpec, SweepOptions, SweepSummary,
};
use cfs_plot::{figure_title, plot_name, render_pdf, sweep_figures};
use clap::Args;
use tracing::{info, warn};

use crate::settings::ConfigArgs;

#[derive(Args, Debug)]
pub struct SweepArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
    /// Directory holding `acc-<stamp>.txt` result artifacts.
    #[arg(long)]
    pub results_dir: Option<PathBuf>,
    /// Directory receiving the PDF and the JSON/CSV summaries.
    #[arg(long)]
    pub plots_dir: Option<PathBuf>,
    /// Also sweep the brain-inspired replay ablations.
    #[arg(long)]
    pub per_bir_comp: bool,
    /// Trainer program and its leading arguments.
    #[arg(last = true, value_name = "PROGRAM")]
    pub program: Vec<String>,
}

/// Trainer used for cache misses; without a program only cached points
/// can be evaluated.
enum Trainer {
    Command(CommandRunner),
    Unset,
}

impl Trainer {
    fn from_spec(spec: RunnerSpec) -> Result<Self, CfsError> {
        if spec.is_configured() {
            Ok(Trainer::Command(CommandRunner::new(spec)?))
        } else {
            Ok(Trainer::Unset)
        }
    }
}

impl Runner for Trainer {
    fn run(&mut self, config: &Configuration, target: &RunTarget) -> Result<(), CfsError> {
        match self {
            Trainer::Command(runner) => runner.run(config, target),
            Trainer::Unset => Err(CfsError::Config(
                ErrorInfo::new("runner-unset", "point not cached and no trainer configured")
                    .with_context("stamp", target.stamp.clone())
                    .with_hint("pass the trainer after `--` or set `runner.program`"),
            )),
        }
    }
}

pub fn run(args: &SweepArgs) -> Result<(), Box<dyn Error>> {
    let mut file = args.config.resolve()?;
    if let Some(dir) = &args.results_dir {
        file.results_dir = dir.clone();
    }
    if let Some(dir) = &args.plots_dir {
        file.plots_dir = dir.clone();
    }
    if let Some((program, rest)) = args.program.split_first() {
        file.runner = RunnerSpec {
            program: program.clone(),
            args: rest.to_vec(),
        };
    }

    let base = file.base.clone();
    let store = DirStore::new(&file.results_dir);
    store.ensure_root()?;
    fs::create_dir_all(&file.plots_dir)?;
    let trainer = Trainer::from_spec(file.runner.clone())?;
    if matches!(trainer, Trainer::Unset) {
        warn!("no trainer configured; only cached points can be evaluated");
    }

    let mut eval = Evaluator::with_default_stamps(store, trainer);
    let base_stamp = eval.stamp(&base)?;
    info!(protocol = %base.protocol_label(), stamp = %base_stamp, "starting sweep");
    let options = SweepOptions {
        per_bir_comp: args.per_bir_comp,
    };
    let results = run_sweep(&base, &file.grid, options, &mut eval)?;
    let stats = eval.stats();
    info!(hits = stats.hits, misses = stats.misses, "sweep finished");

    print_report(&results);

    let name = plot_name(&base);
    let summary = SweepSummary::build(base.protocol_label(), base_stamp, &results, stats);
    write_summary_json(&file.plots_dir.join(format!("{name}.json")), &summary)?;
    write_summary_csv(&file.plots_dir.join(format!("{name}.csv")), &summary)?;

    let figures = sweep_figures(&results, &figure_title(&base));
    if figures.is_empty() {
        warn!("every candidate list is empty; no plot generated");
        return Ok(());
    }
    let pdf = file.plots_dir.join(format!("{name}.pdf"));
    render_pdf(&figures, &pdf)?;
    println!("\nGenerated plot: {}\n", pdf.display());
    Ok(())
}
