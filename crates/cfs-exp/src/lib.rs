//! Memoized sweep orchestration and reporting for continual-learning experiments.

mod evaluate;
mod export;
mod grid;
mod report;
mod runner;
mod store;
mod table;

pub use evaluate::{EvalStats, Evaluator};
pub use export::{
    write_summary_csv, write_summary_json, BestPoint, FamilySummary, RowSummary,
    SummaryProvenance, SweepSummary,
};
pub use grid::{run_sweep, AblationTables, SweepGrid, SweepOptions, SweepResults};
pub use report::{format_list, print_report, render_report};
pub use runner::{config_flags, CommandRunner, RunTarget, Runner, RunnerSpec};
pub use store::{
    artifact_file_name, parse_accuracy, write_artifact, DirStore, MemoryStore, ResultStore,
};
pub use table::{argmax, Best, NestedBest, NestedRow, NestedTable, SweepTable};
