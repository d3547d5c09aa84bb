use cfs_core::errors::{CfsError, ErrorInfo};
use cfs_core::stamp::StampDeriver;
use cfs_core::Configuration;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::evaluate::Evaluator;
use crate::runner::Runner;
use crate::store::ResultStore;
use crate::table::{NestedTable, SweepTable};

/// Candidate values of every swept axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepGrid {
    /// EWC regularisation strengths.
    #[serde(default = "SweepGrid::default_lambda")]
    pub lambda: Vec<f64>,
    /// Online EWC decay factors.
    #[serde(default = "SweepGrid::default_gamma")]
    pub gamma: Vec<f64>,
    /// SI damping constants.
    #[serde(default = "SweepGrid::default_si_c")]
    pub si_c: Vec<f64>,
    /// Proportions of gated units for brain-inspired replay.
    #[serde(default = "SweepGrid::default_dg_prop")]
    pub dg_prop: Vec<f64>,
}

impl SweepGrid {
    fn default_lambda() -> Vec<f64> {
        vec![
            0.001, 0.01, 0.1, 1.0, 10.0, 100.0, 1000.0, 10000.0, 100000.0, 1000000.0,
        ]
    }

    fn default_gamma() -> Vec<f64> {
        vec![1.0]
    }

    fn default_si_c() -> Vec<f64> {
        vec![0.001, 0.01, 0.1, 1.0, 10.0, 100.0]
    }

    fn default_dg_prop() -> Vec<f64> {
        vec![0.0, 0.2, 0.4, 0.6, 0.8]
    }

    /// Rejects non-finite or negative candidates.
    pub fn validate(&self) -> Result<(), CfsError> {
        let axes = [
            ("lambda", &self.lambda),
            ("gamma", &self.gamma),
            ("si_c", &self.si_c),
            ("dg_prop", &self.dg_prop),
        ];
        for (axis, values) in axes {
            if let Some(bad) = values.iter().find(|v| !v.is_finite() || **v < 0.0) {
                return Err(CfsError::Config(
                    ErrorInfo::new("grid-value", "sweep candidates must be finite and >= 0")
                        .with_context("axis", axis)
                        .with_context("value", bad.to_string()),
                ));
            }
        }
        if let Some(bad) = self.dg_prop.iter().find(|v| **v >= 1.0) {
            return Err(CfsError::Config(
                ErrorInfo::new("grid-dg-prop", "gate proportion must be below 1")
                    .with_context("value", bad.to_string()),
            ));
        }
        Ok(())
    }
}

impl Default for SweepGrid {
    fn default() -> Self {
        Self {
            lambda: Self::default_lambda(),
            gamma: Self::default_gamma(),
            si_c: Self::default_si_c(),
            dg_prop: Self::default_dg_prop(),
        }
    }
}

/// Switches for optional sweep sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SweepOptions {
    /// Also sweep the four brain-inspired replay ablations.
    pub per_bir_comp: bool,
}

/// The four brain-inspired replay ablations, each over the gate proportion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AblationTables {
    /// Without replay through feedback.
    pub no_feedback: SweepTable,
    /// Without class-conditional replay.
    pub no_conditional: SweepTable,
    /// Without distillation.
    pub no_distill: SweepTable,
    /// Plain generative replay plus context gating.
    pub gr_gating: SweepTable,
}

impl AblationTables {
    /// Tables in reporting order with their labels.
    pub fn labelled(&self) -> [(&'static str, &SweepTable); 4] {
        [
            ("BI-R - rtf", &self.no_feedback),
            ("BI-R - con", &self.no_conditional),
            ("BI-R - dis", &self.no_distill),
            ("GR + gat", &self.gr_gating),
        ]
    }
}

/// Everything collected by [`run_sweep`].
///
/// One-axis tables and the online-EWC rows start with the baseline as the
/// zero point whenever their candidate list is non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepResults {
    pub baseline: f64,
    pub ewc: SweepTable,
    pub online_ewc: NestedTable,
    pub si: SweepTable,
    /// Rows per gate proportion, columns over `[0] + si_c`.
    pub bir: NestedTable,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ablations: Option<AblationTables>,
}

impl SweepResults {
    /// Brain-inspired replay without SI, indexed by gate proportion.
    pub fn bir_without_si(&self) -> SweepTable {
        self.bir.column(0.0)
    }

    /// Every collected score, baseline included.
    pub fn all_scores(&self) -> Vec<f64> {
        let mut scores = vec![self.baseline];
        scores.extend(self.ewc.scores.iter().copied());
        scores.extend(self.online_ewc.scores());
        scores.extend(self.si.scores.iter().copied());
        scores.extend(self.bir.scores());
        if let Some(ablations) = &self.ablations {
            for (_, table) in ablations.labelled() {
                scores.extend(table.scores.iter().copied());
            }
        }
        scores
    }
}

/// Runs every sweep family in order, evaluating each point through `eval`.
///
/// Order: baseline, EWC, online EWC, SI, brain-inspired replay (with and
/// without SI), then the ablations when requested. Empty candidate lists
/// leave their tables empty.
pub fn run_sweep<S, R, D>(
    base: &Configuration,
    grid: &SweepGrid,
    opts: SweepOptions,
    eval: &mut Evaluator<S, R, D>,
) -> Result<SweepResults, CfsError>
where
    S: ResultStore,
    R: Runner,
    D: StampDeriver,
{
    grid.validate()?;
    let off = base.clone().baseline();

    info!("sweeping baseline");
    let baseline = eval.evaluate(&off)?;

    info!(points = grid.lambda.len(), "sweeping EWC");
    let ewc = sweep_axis("lambda", baseline, &grid.lambda, |lambda| {
        eval.evaluate(&off.clone().with_ewc(lambda))
    })?;

    info!(
        points = grid.gamma.len() * grid.lambda.len(),
        "sweeping online EWC"
    );
    let mut online_ewc = NestedTable::new("gamma", "lambda");
    if !grid.lambda.is_empty() {
        for &gamma in &grid.gamma {
            let row = sweep_axis("lambda", baseline, &grid.lambda, |lambda| {
                eval.evaluate(&off.clone().with_online_ewc(gamma, lambda))
            })?;
            online_ewc.push_row(gamma, row);
        }
    }

    info!(points = grid.si_c.len(), "sweeping SI");
    let si = sweep_axis("si_c", baseline, &grid.si_c, |c| {
        eval.evaluate(&off.clone().with_si(c))
    })?;

    let bir_base = off.clone().with_brain_inspired_replay();
    let mut inner_c = Vec::with_capacity(grid.si_c.len() + 1);
    inner_c.push(0.0);
    inner_c.extend(grid.si_c.iter().copied());
    info!(
        points = grid.dg_prop.len() * inner_c.len(),
        "sweeping brain-inspired replay"
    );
    let mut bir = NestedTable::new("dg_prop", "si_c");
    for &dg_prop in &grid.dg_prop {
        let mut row = SweepTable::new("si_c");
        for &c in &inner_c {
            let point = bir_base.clone().with_gate_proportion(dg_prop).with_si(c);
            row.push(c, eval.evaluate(&point)?);
        }
        bir.push_row(dg_prop, row);
    }

    let ablations = if opts.per_bir_comp {
        info!(points = grid.dg_prop.len() * 4, "sweeping replay ablations");
        let ablation_base = bir_base.without_si();
        let mut gate_sweep = |variant: Configuration| -> Result<SweepTable, CfsError> {
            let mut table = SweepTable::new("dg_prop");
            for &dg_prop in &grid.dg_prop {
                let point = variant.clone().with_gate_proportion(dg_prop);
                table.push(dg_prop, eval.evaluate(&point)?);
            }
            Ok(table)
        };
        let no_feedback = gate_sweep(ablation_base.clone().with_feedback(false))?;
        let no_conditional = gate_sweep(ablation_base.clone().with_conditional(false))?;
        let no_distill = gate_sweep(ablation_base.clone().with_distill(false))?;
        let gr_gating = gate_sweep(
            ablation_base
                .with_distill(false)
                .with_conditional(false)
                .with_feedback(false)
                .with_dg_gates(true),
        )?;
        Some(AblationTables {
            no_feedback,
            no_conditional,
            no_distill,
            gr_gating,
        })
    } else {
        None
    };

    Ok(SweepResults {
        baseline,
        ewc,
        online_ewc,
        si,
        bir,
        ablations,
    })
}

fn sweep_axis<F>(
    axis: &str,
    zero_point: f64,
    candidates: &[f64],
    mut evaluate: F,
) -> Result<SweepTable, CfsError>
where
    F: FnMut(f64) -> Result<f64, CfsError>,
{
    let mut table = SweepTable::new(axis);
    if candidates.is_empty() {
        return Ok(table);
    }
    table.push(0.0, zero_point);
    for &value in candidates {
        table.push(value, evaluate(value)?);
    }
    Ok(table)
}
