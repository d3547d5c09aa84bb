//! Immutable experiment configuration and its relevant-field projection.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Continual-learning scenario the external trainer is asked to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    /// Task identity is given at test time.
    Task,
    /// Task identity is not given; the output space is shared.
    #[default]
    Domain,
    /// Task identity must be inferred.
    Class,
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Scenario::Task => "task",
            Scenario::Domain => "domain",
            Scenario::Class => "class",
        };
        f.write_str(label)
    }
}

/// Replay strategy handed to the trainer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReplayMode {
    /// No replay.
    #[default]
    None,
    /// Replay of data from the current task only. Not swept; accepted in
    /// sweep files so a base configuration can name any trainer replay mode.
    Current,
    /// Replay of stored exemplars. Not swept; see [`ReplayMode::Current`].
    Exemplars,
    /// Replay produced by a generative model.
    Generative,
}

impl ReplayMode {
    fn tag(self) -> &'static str {
        match self {
            ReplayMode::None => "none",
            ReplayMode::Current => "CR",
            ReplayMode::Exemplars => "ER",
            ReplayMode::Generative => "GR",
        }
    }
}

/// Prior over the generative model's latent space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Prior {
    /// Standard normal prior.
    #[default]
    #[serde(rename = "standard")]
    Standard,
    /// Gaussian mixture prior with one component per class.
    #[serde(rename = "GMM")]
    Gmm,
}

impl Prior {
    fn tag(self) -> &'static str {
        match self {
            Prior::Standard => "std",
            Prior::Gmm => "gmm",
        }
    }
}

/// One experiment point.
///
/// Values are never mutated in place by the sweep: every point is derived
/// from a base configuration with the `with_*` methods, which consume and
/// return the value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Experiment family, e.g. `permMNIST`.
    pub experiment: String,
    /// Number of tasks in the protocol.
    pub tasks: u32,
    /// Continual-learning scenario.
    pub scenario: Scenario,
    /// Elastic weight consolidation toggle.
    pub ewc: bool,
    /// Use the online (running Fisher) variant of EWC.
    pub online: bool,
    /// EWC regularisation strength.
    pub ewc_lambda: f64,
    /// Online EWC decay factor.
    pub gamma: f64,
    /// Synaptic intelligence toggle.
    pub si: bool,
    /// SI damping constant.
    pub si_c: f64,
    /// Context-dependent gating (without replay) toggle.
    pub xdg: bool,
    /// Proportion of hidden units gated per task.
    pub dg_prop: f64,
    /// Replay strategy.
    pub replay: ReplayMode,
    /// Distill replayed targets.
    pub distill: bool,
    /// Latent prior of the generator.
    pub prior: Prior,
    /// Class-conditional replay.
    pub per_class: bool,
    /// Gate the decoder based on internal context.
    pub dg_gates: bool,
    /// Replay through feedback connections.
    pub feedback: bool,
    /// Pass-through options understood only by the external trainer.
    pub options: BTreeMap<String, Value>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            experiment: "permMNIST".to_string(),
            tasks: 100,
            scenario: Scenario::Domain,
            ewc: false,
            online: false,
            ewc_lambda: 1.0,
            gamma: 1.0,
            si: false,
            si_c: 0.1,
            xdg: false,
            dg_prop: 0.0,
            replay: ReplayMode::None,
            distill: false,
            prior: Prior::Standard,
            per_class: false,
            dg_gates: false,
            feedback: false,
            options: BTreeMap::new(),
        }
    }
}

impl Configuration {
    /// Switches every swept method off, keeping the protocol and pass-through options.
    pub fn baseline(self) -> Self {
        Self {
            ewc: false,
            online: false,
            si: false,
            xdg: false,
            dg_prop: 0.0,
            ..self
        }
    }

    /// Offline EWC with the given strength.
    pub fn with_ewc(self, lambda: f64) -> Self {
        Self {
            ewc: true,
            online: false,
            ewc_lambda: lambda,
            ..self
        }
    }

    /// Online EWC with decay `gamma` and strength `lambda`.
    pub fn with_online_ewc(self, gamma: f64, lambda: f64) -> Self {
        Self {
            ewc: true,
            online: true,
            gamma,
            ewc_lambda: lambda,
            ..self
        }
    }

    /// SI with damping `c`; a non-positive constant switches SI off.
    pub fn with_si(self, c: f64) -> Self {
        Self {
            si: c > 0.0,
            si_c: c,
            ..self
        }
    }

    /// Switches SI off, leaving `si_c` untouched.
    pub fn without_si(self) -> Self {
        Self { si: false, ..self }
    }

    /// Full brain-inspired replay: generative replay with distillation,
    /// GMM prior, class-conditional sampling, gating and feedback.
    pub fn with_brain_inspired_replay(self) -> Self {
        Self {
            replay: ReplayMode::Generative,
            distill: true,
            prior: Prior::Gmm,
            per_class: true,
            dg_gates: true,
            feedback: true,
            ..self
        }
    }

    /// Sets the proportion of gated units.
    pub fn with_gate_proportion(self, dg_prop: f64) -> Self {
        Self { dg_prop, ..self }
    }

    /// Toggles replay through feedback.
    pub fn with_feedback(self, feedback: bool) -> Self {
        Self { feedback, ..self }
    }

    /// Toggles distillation of replayed targets.
    pub fn with_distill(self, distill: bool) -> Self {
        Self { distill, ..self }
    }

    /// Sets the prior and class-conditional sampling together; the two are
    /// only meaningful as a pair.
    pub fn with_conditional(self, conditional: bool) -> Self {
        let prior = if conditional { Prior::Gmm } else { Prior::Standard };
        Self {
            prior,
            per_class: conditional,
            ..self
        }
    }

    /// Toggles context gates in the decoder.
    pub fn with_dg_gates(self, dg_gates: bool) -> Self {
        Self { dg_gates, ..self }
    }

    /// Adds or replaces a pass-through option.
    pub fn with_option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }

    /// `<experiment><tasks>-<scenario>`, the protocol label used in file names.
    pub fn protocol_label(&self) -> String {
        format!("{}{}-{}", self.experiment, self.tasks, self.scenario)
    }

    fn gating_active(&self) -> bool {
        self.xdg || (self.replay != ReplayMode::None && self.dg_gates)
    }

    /// Projection onto the fields that determine a run's outcome.
    ///
    /// Hyperparameters of disabled methods are dropped, so leftover values
    /// from an earlier sweep point never change the projection.
    pub fn relevant_fields(&self) -> BTreeMap<String, Value> {
        let mut fields = BTreeMap::new();
        fields.insert("experiment".to_string(), json!(self.experiment));
        fields.insert("tasks".to_string(), json!(self.tasks));
        fields.insert("scenario".to_string(), json!(self.scenario));
        if self.ewc {
            fields.insert("ewc_lambda".to_string(), json!(self.ewc_lambda));
            fields.insert("online".to_string(), json!(self.online));
            if self.online {
                fields.insert("gamma".to_string(), json!(self.gamma));
            }
        }
        if self.si {
            fields.insert("si_c".to_string(), json!(self.si_c));
        }
        if self.xdg {
            fields.insert("xdg".to_string(), json!(true));
        }
        if self.gating_active() {
            fields.insert("dg_prop".to_string(), json!(self.dg_prop));
        }
        if self.replay != ReplayMode::None {
            fields.insert("replay".to_string(), json!(self.replay));
            fields.insert("distill".to_string(), json!(self.distill));
            fields.insert("prior".to_string(), json!(self.prior));
            fields.insert("per_class".to_string(), json!(self.per_class));
            fields.insert("dg_gates".to_string(), json!(self.dg_gates));
            fields.insert("feedback".to_string(), json!(self.feedback));
        }
        if !self.options.is_empty() {
            fields.insert("options".to_string(), json!(self.options));
        }
        fields
    }

    /// Short human readable description of the active methods.
    pub fn method_tag(&self) -> String {
        let mut parts = Vec::new();
        if self.ewc {
            if self.online {
                parts.push(format!("OEWC{}-g{}", self.ewc_lambda, self.gamma));
            } else {
                parts.push(format!("EWC{}", self.ewc_lambda));
            }
        }
        if self.si {
            parts.push(format!("SI{}", self.si_c));
        }
        if self.xdg {
            parts.push(format!("XdG{}", self.dg_prop));
        }
        if self.replay != ReplayMode::None {
            let mut replay = self.replay.tag().to_string();
            if self.feedback {
                replay.push_str("-rtf");
            }
            if self.distill {
                replay.push_str("-dis");
            }
            replay.push('-');
            replay.push_str(self.prior.tag());
            if self.per_class {
                replay.push_str("-pc");
            }
            if self.dg_gates {
                replay.push_str(&format!("-gate{}", self.dg_prop));
            }
            parts.push(replay);
        }
        if parts.is_empty() {
            "none".to_string()
        } else {
            parts.join("-")
        }
    }
}
