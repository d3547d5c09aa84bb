use std::fs;
use std::path::{Path, PathBuf};

use cfs_core::errors::{CfsError, ErrorInfo};
use cfs_core::serde::from_yaml_slice;
use cfs_core::{Configuration, Scenario};
use cfs_exp::{RunnerSpec, SweepGrid};
use clap::Args;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Contents of a YAML sweep file; every key is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SweepFile {
    #[serde(default)]
    pub base: Configuration,
    #[serde(default)]
    pub grid: SweepGrid,
    #[serde(default = "SweepFile::default_results_dir")]
    pub results_dir: PathBuf,
    #[serde(default = "SweepFile::default_plots_dir")]
    pub plots_dir: PathBuf,
    #[serde(default)]
    pub runner: RunnerSpec,
}

impl SweepFile {
    fn default_results_dir() -> PathBuf {
        PathBuf::from("./store/results")
    }

    fn default_plots_dir() -> PathBuf {
        PathBuf::from("./store/plots")
    }

    pub fn load(path: &Path) -> Result<Self, CfsError> {
        let bytes = fs::read(path).map_err(|err| {
            CfsError::Config(
                ErrorInfo::new("sweep-file-read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        from_yaml_slice(&bytes).map_err(|err| match err {
            CfsError::Serde(info) => CfsError::Config(
                info.with_context("path", path.display().to_string()),
            ),
            other => other,
        })
    }
}

impl Default for SweepFile {
    fn default() -> Self {
        Self {
            base: Configuration::default(),
            grid: SweepGrid::default(),
            results_dir: Self::default_results_dir(),
            plots_dir: Self::default_plots_dir(),
            runner: RunnerSpec::default(),
        }
    }
}

/// Flags selecting and overriding the base configuration.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// YAML sweep file (base configuration, grid, directories, runner).
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Experiment name passed to the trainer.
    #[arg(long)]
    pub experiment: Option<String>,
    /// Number of tasks.
    #[arg(long)]
    pub tasks: Option<u32>,
    /// Continual-learning scenario: task, domain or class.
    #[arg(long, value_parser = parse_scenario)]
    pub scenario: Option<Scenario>,
    /// Extra trainer option as `key=value`; the value is read as a YAML scalar.
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,
}

impl ConfigArgs {
    /// Loads the sweep file (or defaults) and applies the command line on top.
    pub fn resolve(&self) -> Result<SweepFile, CfsError> {
        let mut file = match &self.config {
            Some(path) => SweepFile::load(path)?,
            None => SweepFile::default(),
        };
        let mut base = file.base;
        if let Some(experiment) = &self.experiment {
            base.experiment = experiment.clone();
        }
        if let Some(tasks) = self.tasks {
            base.tasks = tasks;
        }
        if let Some(scenario) = self.scenario {
            base.scenario = scenario;
        }
        for raw in &self.set {
            let (key, value) = parse_assignment(raw)?;
            base = base.with_option(key, value);
        }
        file.base = base;
        Ok(file)
    }
}

fn parse_scenario(raw: &str) -> Result<Scenario, String> {
    serde_yaml::from_str(raw).map_err(|_| format!("unknown scenario `{raw}` (task, domain, class)"))
}

/// Splits `key=value`, reading the value as a YAML scalar (`10` is a number,
/// `true` a bool, anything else a string).
pub fn parse_assignment(raw: &str) -> Result<(String, Value), CfsError> {
    let invalid = |message: &str| {
        CfsError::Config(
            ErrorInfo::new("set-invalid", message)
                .with_context("assignment", raw)
                .with_hint("use --set key=value"),
        )
    };
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| invalid("missing `=` in assignment"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(invalid("empty option name"));
    }
    let value: Value = match serde_yaml::from_str(value) {
        Ok(Value::Array(_)) | Ok(Value::Object(_)) | Err(_) => Value::String(value.to_string()),
        Ok(scalar) => scalar,
    };
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn assignment_values_are_yaml_scalars() {
        assert_eq!(parse_assignment("iters=2000").unwrap(), ("iters".into(), json!(2000)));
        assert_eq!(parse_assignment("lr=0.001").unwrap(), ("lr".into(), json!(0.001)));
        assert_eq!(parse_assignment("cuda=false").unwrap(), ("cuda".into(), json!(false)));
        assert_eq!(
            parse_assignment("optimizer=adam").unwrap(),
            ("optimizer".into(), json!("adam"))
        );
        assert_eq!(
            parse_assignment("note=[a, b]").unwrap(),
            ("note".into(), json!("[a, b]"))
        );
    }

    #[test]
    fn malformed_assignments_are_rejected() {
        assert_eq!(parse_assignment("iters").unwrap_err().info().code, "set-invalid");
        assert_eq!(parse_assignment("=3").unwrap_err().info().code, "set-invalid");
    }

    #[test]
    fn command_line_overrides_file_defaults() {
        let args = ConfigArgs {
            experiment: Some("splitMNIST".into()),
            tasks: Some(5),
            scenario: Some(Scenario::Class),
            set: vec!["fc_units=400".into()],
            ..ConfigArgs::default()
        };
        let file = args.resolve().unwrap();
        assert_eq!(file.base.protocol_label(), "splitMNIST5-class");
        assert_eq!(file.base.options.get("fc_units"), Some(&json!(400)));
        assert_eq!(file.results_dir, PathBuf::from("./store/results"));
        assert_eq!(file.grid, SweepGrid::default());
    }

    #[test]
    fn scenario_parser_accepts_lowercase_names() {
        assert_eq!(parse_scenario("task"), Ok(Scenario::Task));
        assert!(parse_scenario("incremental").is_err());
    }
}
