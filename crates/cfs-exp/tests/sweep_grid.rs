mod common;

use cfs_core::Configuration;
use cfs_exp::{
    render_report, run_sweep, Evaluator, MemoryStore, SweepGrid, SweepOptions, SweepResults,
};
use common::RecordingRunner;

fn sweep(
    store: &MemoryStore,
    grid: &SweepGrid,
    opts: SweepOptions,
) -> (SweepResults, usize, usize) {
    let mut runner = RecordingRunner::new(store.clone());
    let mut eval = Evaluator::with_default_stamps(store.clone(), &mut runner);
    let results = run_sweep(&Configuration::default(), grid, opts, &mut eval).expect("sweep");
    let hits = eval.stats().hits;
    drop(eval);
    (results, runner.calls.len(), hits)
}

#[test]
fn default_grid_runs_every_point_once() {
    let store = MemoryStore::new();
    let (results, calls, _) = sweep(&store, &SweepGrid::default(), SweepOptions::default());
    // baseline + 10 EWC + 10 online EWC + 6 SI + 5 x 7 BI-R
    assert_eq!(calls, 62);
    assert_eq!(results.ewc.values.len(), 11);
    assert_eq!(results.ewc.values[0], 0.0);
    assert_eq!(results.ewc.scores[0], results.baseline);
    assert_eq!(results.si.scores[0], results.baseline);
    assert_eq!(results.online_ewc.rows.len(), 1);
    assert_eq!(results.online_ewc.rows[0].table.scores[0], results.baseline);
    assert_eq!(results.bir.rows.len(), 5);
    assert_eq!(results.bir.rows[0].table.values[0], 0.0);
    assert!(results.ablations.is_none());

    let (again, calls_again, hits) =
        sweep(&store, &SweepGrid::default(), SweepOptions::default());
    assert_eq!(calls_again, 0);
    assert_eq!(hits, 62);
    assert_eq!(again, results);
}

#[test]
fn ablations_only_run_when_requested() {
    let store = MemoryStore::new();
    let (results, calls, _) = sweep(
        &store,
        &SweepGrid::default(),
        SweepOptions { per_bir_comp: true },
    );
    assert_eq!(calls, 62 + 20);
    let ablations = results.ablations.as_ref().expect("ablations");
    for (_, table) in ablations.labelled() {
        assert_eq!(table.values, vec![0.0, 0.2, 0.4, 0.6, 0.8]);
    }
    // dropping a component never helps the synthetic model
    let full = results.bir_without_si();
    for (idx, score) in ablations.no_feedback.scores.iter().enumerate() {
        assert!(*score < full.scores[idx]);
    }
    let report = render_report(&results);
    assert!(report.contains("BI-R minus DISTILLATION"));
    assert!(report.contains("GR plus GATING BASED ON INTERNAL CONTEXT"));
}

#[test]
fn empty_candidate_lists_are_skipped() {
    let store = MemoryStore::new();
    let grid = SweepGrid {
        lambda: Vec::new(),
        gamma: vec![1.0],
        si_c: vec![1.0],
        dg_prop: Vec::new(),
    };
    let (results, calls, _) = sweep(&store, &grid, SweepOptions { per_bir_comp: true });
    assert_eq!(calls, 2);
    assert!(results.ewc.is_empty());
    assert!(results.online_ewc.is_empty());
    assert!(results.bir.is_empty());
    let ablations = results.ablations.as_ref().expect("flag set");
    assert!(ablations.no_distill.is_empty());

    let report = render_report(&results);
    assert!(!report.contains("ELASTIC WEIGHT CONSOLIDATION"));
    assert!(!report.contains("ONLINE EWC"));
    assert!(!report.contains("BRAIN-INSPIRED REPLAY"));
    assert!(report.contains("SYNAPTIC INTELLIGENCE (SI)"));
}

#[test]
fn argmax_lines_follow_the_tables() {
    let store = MemoryStore::new();
    let grid = SweepGrid {
        lambda: vec![1.0, 100.0, 10000.0],
        gamma: vec![0.5, 1.0],
        si_c: vec![0.1, 1.0, 10.0],
        dg_prop: vec![0.0, 0.4],
    };
    let (results, _, _) = sweep(&store, &grid, SweepOptions::default());
    let report = render_report(&results);
    assert!(report.contains(" param-list (lambda): [0, 1, 100, 10000]"));
    let best = results.ewc.best().unwrap();
    assert_eq!(best.value, 100.0);
    assert!(report.contains(&format!("--->  lambda = 100     --    {}", best.score)));
    let online = results.online_ewc.best().unwrap();
    assert_eq!((online.outer, online.value), (1.0, 100.0));
    let bir = results.bir.best().unwrap();
    assert_eq!((bir.outer, bir.value), (0.4, 1.0));
    assert!(report.contains("--->  dg_prop = 0.4  -  si_c = 1     --"));
}

#[test]
fn invalid_candidates_are_rejected_before_running() {
    let store = MemoryStore::new();
    let grid = SweepGrid {
        dg_prop: vec![0.2, 1.5],
        ..SweepGrid::default()
    };
    let mut runner = RecordingRunner::new(store.clone());
    let mut eval = Evaluator::with_default_stamps(store, &mut runner);
    let err = run_sweep(
        &Configuration::default(),
        &grid,
        SweepOptions::default(),
        &mut eval,
    )
    .unwrap_err();
    assert_eq!(err.info().code, "grid-dg-prop");
    drop(eval);
    assert!(runner.calls.is_empty());
}
