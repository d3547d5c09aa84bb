mod common;

use std::collections::BTreeMap;

use cfs_core::Configuration;
use cfs_exp::{
    run_sweep, write_summary_csv, Evaluator, MemoryStore, SweepGrid, SweepOptions, SweepSummary,
};
use common::RecordingRunner;
use tempfile::tempdir;

fn default_summary(opts: SweepOptions) -> SweepSummary {
    let store = MemoryStore::new();
    let mut runner = RecordingRunner::new(store.clone());
    let mut eval = Evaluator::with_default_stamps(store, &mut runner);
    let base = Configuration::default();
    let results = run_sweep(&base, &SweepGrid::default(), opts, &mut eval).expect("sweep");
    let stamp = eval.stamp(&base).expect("stamp");
    SweepSummary::build(base.protocol_label(), stamp, &results, eval.stats())
}

#[test]
fn csv_summary_reads_back_one_record_per_point() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("summary.csv");
    let summary = default_summary(SweepOptions::default());
    write_summary_csv(&path, &summary).unwrap();

    let mut reader = csv::Reader::from_path(&path).unwrap();
    assert_eq!(
        reader.headers().unwrap(),
        &csv::StringRecord::from(vec!["family", "outer", "value", "score"])
    );
    let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    // 11 EWC + 11 online EWC + 7 SI + 5 BI-R + 5 x 7 BI-R & SI
    assert_eq!(records.len(), 69);

    let mut per_family: BTreeMap<String, usize> = BTreeMap::new();
    for record in &records {
        *per_family.entry(record[0].to_string()).or_default() += 1;
        let outer = &record[1];
        match &record[0] {
            "ewc" | "si" | "bir" => assert!(outer.is_empty(), "{record:?}"),
            "online_ewc" | "bir_si" => assert!(!outer.is_empty(), "{record:?}"),
            other => panic!("unexpected family {other}"),
        }
        let score: f64 = record[3].parse().unwrap();
        assert!(score.is_finite());
    }
    assert_eq!(per_family["ewc"], 11);
    assert_eq!(per_family["online_ewc"], 11);
    assert_eq!(per_family["si"], 7);
    assert_eq!(per_family["bir"], 5);
    assert_eq!(per_family["bir_si"], 35);

    // the zero point of EWC is the baseline
    let first = &records[0];
    assert_eq!(&first[0], "ewc");
    assert_eq!(&first[2], "0");
    assert_eq!(first[3].parse::<f64>().unwrap(), summary.baseline);
}

#[test]
fn csv_summary_includes_ablation_families_when_swept() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("summary.csv");
    let summary = default_summary(SweepOptions { per_bir_comp: true });
    write_summary_csv(&path, &summary).unwrap();

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let families: Vec<String> = reader
        .records()
        .map(|r| r.unwrap()[0].to_string())
        .collect();
    assert_eq!(families.len(), 69 + 20);
    for name in ["bir_no_rtf", "bir_no_con", "bir_no_dis", "gr_gat"] {
        assert_eq!(families.iter().filter(|f| *f == name).count(), 5, "{name}");
    }
}
