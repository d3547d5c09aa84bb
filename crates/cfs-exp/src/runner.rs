use std::path::{Path, PathBuf};
use std::process::Command;

use cfs_core::errors::{CfsError, ErrorInfo};
use cfs_core::serde::to_canonical_json_string;
use cfs_core::Configuration;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

/// Where a run must leave its result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunTarget {
    pub stamp: String,
    pub artifact: PathBuf,
}

/// The external training routine.
///
/// A run blocks until training finished and the artifact at
/// [`RunTarget::artifact`] has been written.
pub trait Runner {
    fn run(&mut self, config: &Configuration, target: &RunTarget) -> Result<(), CfsError>;
}

impl<R: Runner + ?Sized> Runner for &mut R {
    fn run(&mut self, config: &Configuration, target: &RunTarget) -> Result<(), CfsError> {
        (**self).run(config, target)
    }
}

impl<R: Runner + ?Sized> Runner for Box<R> {
    fn run(&mut self, config: &Configuration, target: &RunTarget) -> Result<(), CfsError> {
        (**self).run(config, target)
    }
}

/// Program and leading arguments of the external trainer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RunnerSpec {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl RunnerSpec {
    pub fn is_configured(&self) -> bool {
        !self.program.trim().is_empty()
    }
}

/// Runs the trainer as a child process.
///
/// The child receives the configuration twice: as `--key=value` flags
/// appended to the configured arguments, and as canonical JSON in
/// `CFS_CONFIG`. `CFS_STAMP`, `CFS_RESULT_PATH` and `CFS_RESULTS_DIR` tell
/// it where the artifact belongs.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    spec: RunnerSpec,
}

impl CommandRunner {
    pub fn new(spec: RunnerSpec) -> Result<Self, CfsError> {
        if !spec.is_configured() {
            return Err(CfsError::Config(
                ErrorInfo::new("runner-unset", "no trainer program configured")
                    .with_hint("pass the trainer after `--` or set `runner.program`"),
            ));
        }
        Ok(Self { spec })
    }

    fn command(&self, config: &Configuration, target: &RunTarget) -> Result<Command, CfsError> {
        let config_json = to_canonical_json_string(config)?;
        let results_dir = target
            .artifact
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let mut command = Command::new(&self.spec.program);
        command
            .args(&self.spec.args)
            .args(config_flags(config)?)
            .env("CFS_CONFIG", config_json)
            .env("CFS_STAMP", &target.stamp)
            .env("CFS_RESULT_PATH", &target.artifact)
            .env("CFS_RESULTS_DIR", results_dir);
        Ok(command)
    }
}

impl Runner for CommandRunner {
    fn run(&mut self, config: &Configuration, target: &RunTarget) -> Result<(), CfsError> {
        let mut command = self.command(config, target)?;
        info!(program = %self.spec.program, stamp = %target.stamp, "spawning trainer");
        let status = command.status().map_err(|err| {
            CfsError::Runner(
                ErrorInfo::new("runner-spawn", "failed to start trainer")
                    .with_context("program", self.spec.program.clone())
                    .with_context("stamp", target.stamp.clone())
                    .with_hint(err.to_string()),
            )
        })?;
        debug!(stamp = %target.stamp, %status, "trainer exited");
        if !status.success() {
            let code = status
                .code()
                .map(|code| code.to_string())
                .unwrap_or_else(|| "signal".to_string());
            return Err(CfsError::Runner(
                ErrorInfo::new("runner-exit", "trainer exited unsuccessfully")
                    .with_context("status", code)
                    .with_context("stamp", target.stamp.clone()),
            ));
        }
        Ok(())
    }
}

/// Renders a configuration as command line flags.
///
/// Keys become `--kebab-case`; `true` is a bare flag, `false` and null are
/// omitted, nested values are passed as canonical JSON. Pass-through
/// options follow the typed fields.
///
/// Every typed field is rendered, including the values of disabled methods:
/// a method is off when its bare switch (`--si`, `--ewc`) is absent, and the
/// trainer ignores the leftover `--si-c=...` in that case. The stamp does not
/// see those values, see [`Configuration::relevant_fields`].
pub fn config_flags(config: &Configuration) -> Result<Vec<String>, CfsError> {
    let value = serde_json::to_value(config).map_err(|err| {
        CfsError::Serde(ErrorInfo::new("config-encode", err.to_string()))
    })?;
    let Value::Object(mut fields) = value else {
        return Err(CfsError::Serde(ErrorInfo::new(
            "config-shape",
            "configuration did not serialize to an object",
        )));
    };
    let options = fields.remove("options");
    let mut flags = Vec::new();
    for (key, value) in fields.iter() {
        push_flag(&mut flags, key, value)?;
    }
    if let Some(Value::Object(options)) = options {
        for (key, value) in options.iter() {
            push_flag(&mut flags, key, value)?;
        }
    }
    Ok(flags)
}

fn push_flag(flags: &mut Vec<String>, key: &str, value: &Value) -> Result<(), CfsError> {
    let name = key.replace('_', "-");
    match value {
        Value::Null | Value::Bool(false) => {}
        Value::Bool(true) => flags.push(format!("--{name}")),
        Value::String(text) => flags.push(format!("--{name}={text}")),
        Value::Number(number) => flags.push(format!("--{name}={number}")),
        nested => flags.push(format!("--{name}={}", to_canonical_json_string(nested)?)),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flags_skip_disabled_switches() {
        let cfg = Configuration::default()
            .with_ewc(100.0)
            .with_option("fc_units", json!(400))
            .with_option("use_bn", json!(false));
        let flags = config_flags(&cfg).unwrap();
        assert!(flags.contains(&"--ewc".to_string()));
        assert!(flags.contains(&"--ewc-lambda=100.0".to_string()));
        assert!(flags.contains(&"--scenario=domain".to_string()));
        assert!(flags.contains(&"--fc-units=400".to_string()));
        assert!(!flags.contains(&"--si".to_string()));
        assert!(flags.contains(&"--si-c=0.1".to_string()));
        assert!(!flags.iter().any(|flag| flag.starts_with("--use-bn")));
    }

    #[test]
    fn unset_program_is_a_config_error() {
        let err = CommandRunner::new(RunnerSpec::default()).unwrap_err();
        assert_eq!(err.info().code, "runner-unset");
    }
}
