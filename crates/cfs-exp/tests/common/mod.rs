#![allow(dead_code)]

use cfs_core::errors::CfsError;
use cfs_core::{Configuration, ReplayMode};
use cfs_exp::{write_artifact, MemoryStore, RunTarget, Runner};

/// Deterministic stand-in for a trained model's average accuracy.
pub fn synthetic_accuracy(config: &Configuration) -> f64 {
    let mut acc = 50.0;
    if config.ewc {
        acc += 10.0 - (config.ewc_lambda.log10() - 2.0).abs();
        if config.online {
            acc += config.gamma;
        }
    }
    if config.si {
        acc += 8.0 - (config.si_c.log10()).abs();
    }
    if config.replay == ReplayMode::Generative {
        acc += 20.0 + 10.0 * config.dg_prop;
        if config.feedback {
            acc += 2.0;
        }
        if config.distill {
            acc += 1.5;
        }
        if config.per_class {
            acc += 1.0;
        }
    }
    acc
}

/// Runner publishing results into a shared in-memory store.
pub struct RecordingRunner {
    pub store: MemoryStore,
    pub calls: Vec<String>,
}

impl RecordingRunner {
    pub fn new(store: MemoryStore) -> Self {
        Self {
            store,
            calls: Vec::new(),
        }
    }
}

impl Runner for RecordingRunner {
    fn run(&mut self, config: &Configuration, target: &RunTarget) -> Result<(), CfsError> {
        self.calls.push(target.stamp.clone());
        self.store
            .insert(target.stamp.clone(), synthetic_accuracy(config));
        Ok(())
    }
}

/// Runner writing real artifact files.
#[derive(Default)]
pub struct FileRunner {
    pub calls: usize,
}

impl Runner for FileRunner {
    fn run(&mut self, config: &Configuration, target: &RunTarget) -> Result<(), CfsError> {
        self.calls += 1;
        write_artifact(&target.artifact, synthetic_accuracy(config))
    }
}
