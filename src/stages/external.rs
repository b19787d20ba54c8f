use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::time::{Duration, Instant};

use crate::foundation::error::{EvError, EvResult};

/// Command prefix that launches a stage script, e.g. `conda run -n vid2e ... python upsample.py`.
///
/// Stage arguments are appended after the prefix.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StageLauncher {
    /// Program and leading arguments.
    pub command: Vec<String>,
    /// Working directory for the child; inherits ours when unset.
    pub cwd: Option<PathBuf>,
}

impl Default for StageLauncher {
    fn default() -> Self {
        Self {
            command: vec!["python".to_owned()],
            cwd: None,
        }
    }
}

impl StageLauncher {
    /// `conda run -n <env> --no-capture-output python <script>`.
    pub fn conda(env: &str, script: &str) -> Self {
        Self {
            command: ["conda", "run", "-n", env, "--no-capture-output", "python", script]
                .map(str::to_owned)
                .to_vec(),
            cwd: None,
        }
    }

    /// Launch an arbitrary program prefix.
    pub fn from_command<I, S>(command: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            command: command.into_iter().map(Into::into).collect(),
            cwd: None,
        }
    }
}

/// Parameter record of one stage kind.
pub trait StageParams {
    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;
    /// Arguments after `--input_dir <in> --output_dir <out>`.
    fn args(&self) -> Vec<String>;
    /// Environment overrides for the child.
    fn env(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

/// Frame upsampling (frame interpolation) stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct UpsampleParams {
    /// GPU index; negative selects the CPU by hiding every GPU.
    pub device: i32,
}

impl StageParams for UpsampleParams {
    fn name(&self) -> &'static str {
        "upsample"
    }

    fn args(&self) -> Vec<String> {
        Vec::new()
    }

    fn env(&self) -> Vec<(&'static str, String)> {
        let visible = if self.device >= 0 {
            self.device.to_string()
        } else {
            String::new()
        };
        vec![("CUDA_VISIBLE_DEVICES", visible)]
    }
}

/// Event simulation stage.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SimulateParams {
    /// Positive contrast threshold.
    pub ct_pos: f64,
    /// Negative contrast threshold.
    pub ct_neg: f64,
    /// Per-pixel refractory period in nanoseconds.
    pub refractory_period_ns: u64,
}

impl Default for SimulateParams {
    fn default() -> Self {
        Self {
            ct_pos: 0.2,
            ct_neg: 0.2,
            refractory_period_ns: 0,
        }
    }
}

impl StageParams for SimulateParams {
    fn name(&self) -> &'static str {
        "simulate"
    }

    fn args(&self) -> Vec<String> {
        vec![
            "--contrast_threshold_pos".to_owned(),
            self.ct_pos.to_string(),
            "--contrast_threshold_neg".to_owned(),
            self.ct_neg.to_string(),
            "--refractory_period_ns".to_owned(),
            self.refractory_period_ns.to_string(),
        ]
    }
}

/// How a successful stage ended.
#[derive(Clone, Copy, Debug)]
pub struct StageOutcome {
    /// Stage name.
    pub stage: &'static str,
    /// Exit status (always a success).
    pub status: ExitStatus,
    /// Wall-clock run time.
    pub elapsed: Duration,
}

/// An opaque external process turning one directory into another.
#[derive(Clone, Debug)]
pub struct ExternalStage<P> {
    launcher: StageLauncher,
    input_dir: PathBuf,
    output_dir: PathBuf,
    params: P,
}

impl<P: StageParams> ExternalStage<P> {
    /// Describe a stage run.
    pub fn new(
        launcher: StageLauncher,
        input_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        params: P,
    ) -> Self {
        Self {
            launcher,
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            params,
        }
    }

    /// Input directory.
    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    /// Output directory.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// The fully assembled child command.
    pub fn command(&self) -> EvResult<Command> {
        let (program, prefix) = self.launcher.command.split_first().ok_or_else(|| {
            EvError::validation(format!(
                "launcher for stage '{}' has an empty command",
                self.params.name()
            ))
        })?;

        let mut cmd = Command::new(program);
        cmd.args(prefix)
            .arg("--input_dir")
            .arg(&self.input_dir)
            .arg("--output_dir")
            .arg(&self.output_dir)
            .args(self.params.args());
        for (key, value) in self.params.env() {
            cmd.env(key, value);
        }
        if let Some(cwd) = &self.launcher.cwd {
            cmd.current_dir(cwd);
        }
        Ok(cmd)
    }

    /// Run the stage to completion; any non-zero exit is an error.
    #[tracing::instrument(skip(self), fields(stage = self.params.name()))]
    pub fn run(&self) -> EvResult<StageOutcome> {
        let stage = self.params.name();
        let mut cmd = self.command()?;
        tracing::info!(
            input = %self.input_dir.display(),
            output = %self.output_dir.display(),
            "stage starting"
        );

        let started = Instant::now();
        let status = cmd.status().map_err(|e| {
            EvError::external_stage(format!(
                "failed to launch stage '{stage}' ({:?}): {e}",
                cmd.get_program()
            ))
        })?;
        if !status.success() {
            return Err(EvError::external_stage(format!(
                "stage '{stage}' exited with {status}"
            )));
        }

        let elapsed = started.elapsed();
        tracing::info!(elapsed_ms = elapsed.as_millis() as u64, "stage finished");
        Ok(StageOutcome {
            stage,
            status,
            elapsed,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stages/external.rs"]
mod tests;
