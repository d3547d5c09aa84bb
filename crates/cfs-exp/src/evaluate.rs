use cfs_core::errors::CfsError;
use cfs_core::stamp::{validate_stamp, ParamStamp, StampDeriver};
use cfs_core::Configuration;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::runner::{RunTarget, Runner};
use crate::store::ResultStore;

/// Cache statistics gathered by an [`Evaluator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EvalStats {
    /// Points answered from an existing artifact.
    pub hits: usize,
    /// Points that required a runner invocation.
    pub misses: usize,
}

/// Memoized evaluation of configurations.
///
/// The runner is invoked only when the store has no artifact for the
/// configuration's stamp; the artifact then answers every later request
/// for the same stamp, across process invocations when the store is on disk.
pub struct Evaluator<S, R, D = ParamStamp> {
    store: S,
    runner: R,
    deriver: D,
    stats: EvalStats,
}

impl<S, R, D> Evaluator<S, R, D>
where
    S: ResultStore,
    R: Runner,
    D: StampDeriver,
{
    pub fn new(store: S, runner: R, deriver: D) -> Self {
        Self {
            store,
            runner,
            deriver,
            stats: EvalStats::default(),
        }
    }

    /// Stamp of `config` under this evaluator's deriver.
    pub fn stamp(&self, config: &Configuration) -> Result<String, CfsError> {
        let stamp = self.deriver.derive(config)?;
        validate_stamp(&stamp)?;
        Ok(stamp)
    }

    /// Returns the accuracy recorded for `config`, running it first on a cache miss.
    pub fn evaluate(&mut self, config: &Configuration) -> Result<f64, CfsError> {
        let stamp = self.stamp(config)?;
        if self.store.contains(&stamp)? {
            info!(%stamp, "already run");
            self.stats.hits += 1;
        } else {
            info!(%stamp, "running");
            let target = RunTarget {
                artifact: self.store.artifact_path(&stamp),
                stamp: stamp.clone(),
            };
            self.runner.run(config, &target)?;
            self.stats.misses += 1;
        }
        self.store.read(&stamp)
    }

    pub fn stats(&self) -> EvalStats {
        self.stats
    }
}

impl<S, R> Evaluator<S, R, ParamStamp>
where
    S: ResultStore,
    R: Runner,
{
    /// Evaluator using the default [`ParamStamp`] deriver.
    pub fn with_default_stamps(store: S, runner: R) -> Self {
        Self::new(store, runner, ParamStamp::default())
    }
}
