use cfs_core::{Configuration, ParamStamp, StampDeriver};
use proptest::prelude::*;
use serde_json::json;

fn stamp(cfg: &Configuration) -> String {
    ParamStamp::default().derive(cfg).expect("stamp")
}

#[test]
fn equal_relevant_fields_share_a_stamp() {
    let a = Configuration::default().with_ewc(10.0);
    let b = Configuration::default()
        .with_si(1.0)
        .without_si()
        .with_ewc(10.0);
    assert_eq!(stamp(&a), stamp(&b));
}

#[test]
fn swept_values_change_the_stamp() {
    let base = Configuration::default();
    let ewc_small = stamp(&base.clone().with_ewc(0.1));
    let ewc_large = stamp(&base.clone().with_ewc(100.0));
    let online = stamp(&base.clone().with_online_ewc(1.0, 0.1));
    assert_ne!(ewc_small, ewc_large);
    assert_ne!(ewc_small, online);
    assert_ne!(stamp(&base), ewc_small);
}

#[test]
fn pass_through_options_reach_the_digest() {
    let plain = Configuration::default();
    let wide = Configuration::default().with_option("fc_units", json!(2000));
    let a = stamp(&plain);
    let b = stamp(&wide);
    assert_ne!(a, b);
    let prefix = |s: &str| s.rsplit_once("--").map(|(head, _)| head.to_string());
    assert_eq!(prefix(&a), prefix(&b));
}

#[test]
fn stamp_has_readable_prefix() {
    let cfg = Configuration::default()
        .with_brain_inspired_replay()
        .with_gate_proportion(0.4)
        .with_si(0.1);
    let stamp = stamp(&cfg);
    assert!(stamp.starts_with("permMNIST100-domain--SI0.1-GR-rtf-dis-gmm-pc-gate0.4--"));
    assert_eq!(stamp.rsplit_once("--").unwrap().1.len(), 12);
}

proptest! {
    #[test]
    fn stamp_ignores_leftover_hyperparameters(
        lambda in 1e-3f64..1e6,
        c in 1e-3f64..1e2,
        gamma in 0.1f64..1.0,
    ) {
        let fresh = Configuration::default().baseline();
        let mut dirty = Configuration::default()
            .with_online_ewc(gamma, lambda)
            .with_si(c)
            .baseline();
        dirty.ewc_lambda = lambda;
        prop_assert_eq!(stamp(&fresh), stamp(&dirty));
    }

    #[test]
    fn stamp_is_a_pure_function(lambda in 1e-3f64..1e6) {
        let cfg = Configuration::default().with_ewc(lambda);
        prop_assert_eq!(stamp(&cfg), stamp(&cfg.clone()));
    }
}
