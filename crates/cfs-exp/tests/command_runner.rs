#![cfg(unix)]

use std::fs;

use cfs_core::Configuration;
use cfs_exp::{CommandRunner, DirStore, Evaluator, RunnerSpec};

fn shell(script: &str) -> CommandRunner {
    CommandRunner::new(RunnerSpec {
        program: "sh".to_string(),
        args: vec!["-c".to_string(), script.to_string(), "trainer".to_string()],
    })
    .expect("runner")
}

#[test]
fn trainer_receives_artifact_location_and_flags() {
    let temp = tempfile::tempdir().expect("tmp dir");
    let store = DirStore::new(temp.path().join("results"));
    store.ensure_root().unwrap();
    let log = temp.path().join("argv.txt");
    let script = format!(
        "echo \"$@\" > '{}'; echo \"$CFS_STAMP\" >> '{}'; echo 87.5 > \"$CFS_RESULT_PATH\"",
        log.display(),
        log.display()
    );
    let mut eval = Evaluator::with_default_stamps(store, shell(&script));
    let config = Configuration::default().with_si(10.0);
    let stamp = eval.stamp(&config).unwrap();

    assert_eq!(eval.evaluate(&config).unwrap(), 87.5);
    let logged = fs::read_to_string(&log).unwrap();
    assert!(logged.contains("--si --si-c=10.0"));
    assert!(logged.contains(&stamp));

    fs::remove_file(&log).unwrap();
    assert_eq!(eval.evaluate(&config).unwrap(), 87.5);
    assert!(!log.exists(), "cached point must not spawn the trainer");
}

#[test]
fn failing_trainer_is_a_runner_error() {
    let temp = tempfile::tempdir().expect("tmp dir");
    let mut eval = Evaluator::with_default_stamps(DirStore::new(temp.path()), shell("exit 3"));
    let err = eval.evaluate(&Configuration::default()).unwrap_err();
    assert_eq!(err.info().code, "runner-exit");
    assert_eq!(err.info().context.get("status").map(String::as_str), Some("3"));
}

#[test]
fn trainer_sees_the_configuration_as_json() {
    let temp = tempfile::tempdir().expect("tmp dir");
    let dump = temp.path().join("config.json");
    let script = format!(
        "printf '%s' \"$CFS_CONFIG\" > '{}'; echo 1 > \"$CFS_RESULT_PATH\"",
        dump.display()
    );
    let mut eval = Evaluator::with_default_stamps(DirStore::new(temp.path()), shell(&script));
    let config = Configuration::default().with_ewc(5.0);
    eval.evaluate(&config).unwrap();
    let decoded: Configuration =
        serde_json::from_str(&fs::read_to_string(&dump).unwrap()).unwrap();
    assert_eq!(decoded, config);
}
