use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::tempdir;

fn cfs_sim(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cfs-sim"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("run cfs-sim")
}

fn write_sweep_file(dir: &Path) -> String {
    let path = dir.join("sweep.yaml");
    let body = format!(
        "base:\n  experiment: permMNIST\n  tasks: 10\n  options: {{ iters: 5 }}\n\
         grid:\n  lambda: [1.0]\n  gamma: [1.0]\n  si_c: [1.0]\n  dg_prop: [0.0]\n\
         results_dir: {}\nplots_dir: {}\n",
        dir.join("results").display(),
        dir.join("plots").display()
    );
    fs::write(&path, body).unwrap();
    path.display().to_string()
}

#[test]
fn stamp_prints_stamp_and_artifact_path() {
    let dir = tempdir().unwrap();
    let config = write_sweep_file(dir.path());
    let output = cfs_sim(&["stamp", "--config", &config]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("permMNIST10-domain--none--"));
    assert!(lines[1].ends_with(&format!("acc-{}.txt", lines[0])));

    let again = cfs_sim(&["stamp", "--config", &config]);
    assert_eq!(String::from_utf8(again.stdout).unwrap(), stdout);

    let changed = cfs_sim(&["stamp", "--config", &config, "--set", "iters=6"]);
    assert_ne!(String::from_utf8(changed.stdout).unwrap(), stdout);
}

#[test]
fn unknown_sweep_file_keys_are_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.yaml");
    fs::write(&path, "grids:\n  lambda: [1]\n").unwrap();
    let output = cfs_sim(&["stamp", "--config", &path.display().to_string()]);
    assert!(!output.status.success());
}

#[test]
fn sweep_without_trainer_fails_on_cache_miss() {
    let dir = tempdir().unwrap();
    let config = write_sweep_file(dir.path());
    let output = cfs_sim(&["sweep", "--config", &config]);
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("runner-unset"), "stderr: {stderr}");
}

#[cfg(unix)]
const TRAINER: &str = "echo 75 > \"$CFS_RESULT_PATH\"";

#[cfg(unix)]
#[test]
fn sweep_runs_trainer_then_resumes_from_cache() {
    let dir = tempdir().unwrap();
    let config = write_sweep_file(dir.path());
    let first = cfs_sim(&["sweep", "--config", &config, "--", "sh", "-c", TRAINER, "trainer"]);
    assert!(
        first.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&first.stderr)
    );
    let stdout = String::from_utf8(first.stdout).unwrap();
    assert!(stdout.contains("ELASTIC WEIGHT CONSOLIDATION (EWC)"));
    assert!(stdout.contains("--->  lambda = 0     --    75"));
    let last = stdout.lines().rev().find(|line| !line.trim().is_empty()).unwrap();
    assert!(last.starts_with("Generated plot: "));
    assert!(last.ends_with("hyperParams-permMNIST10-domain.pdf"));

    let plots = dir.path().join("plots");
    let pdf = fs::read(plots.join("hyperParams-permMNIST10-domain.pdf")).unwrap();
    assert!(pdf.starts_with(b"%PDF-1."));
    assert!(plots.join("hyperParams-permMNIST10-domain.csv").is_file());
    // baseline, EWC, online EWC, SI, BI-R at c=0 and c=1
    assert_eq!(fs::read_dir(dir.path().join("results")).unwrap().count(), 6);

    // no trainer needed once every point is cached
    let second = cfs_sim(&["sweep", "--config", &config]);
    assert!(second.status.success());
    let summary: Value = serde_json::from_slice(
        &fs::read(plots.join("hyperParams-permMNIST10-domain.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(summary["provenance"]["cache"]["misses"], 0);
    assert_eq!(summary["provenance"]["cache"]["hits"], 6);
    assert_eq!(summary["baseline"], 75.0);
}

#[cfg(unix)]
#[test]
fn per_bir_comp_adds_ablation_sections_and_page() {
    let dir = tempdir().unwrap();
    let config = write_sweep_file(dir.path());
    let output = cfs_sim(&[
        "sweep",
        "--config",
        &config,
        "--per-bir-comp",
        "--",
        "sh",
        "-c",
        TRAINER,
        "trainer",
    ]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8(output.stdout).unwrap();
    for title in [
        "BI-R minus REPLAY-THROUGH-FEEDBACK",
        "BI-R minus CONDITIONAL REPLAY",
        "BI-R minus DISTILLATION",
        "GR plus GATING BASED ON INTERNAL CONTEXT",
    ] {
        assert!(stdout.contains(title), "missing {title}");
    }
    // one extra trained point per ablation
    assert_eq!(fs::read_dir(dir.path().join("results")).unwrap().count(), 10);

    let pdf_path = dir.path().join("plots/hyperParams-permMNIST10-domain.pdf");
    let pdf = fs::read(pdf_path).unwrap();
    let text = String::from_utf8_lossy(&pdf);
    assert!(text.contains("/Count 5"));
}
