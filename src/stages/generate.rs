use std::path::PathBuf;

use crate::foundation::error::{EvError, EvResult};
use crate::stages::external::{
    ExternalStage, SimulateParams, StageLauncher, StageOutcome, UpsampleParams,
};

/// Parameters of the video-to-events generation job.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    /// Directory of input video frames.
    pub video_dir: PathBuf,
    /// Where the upsampled frames go; input of the simulator.
    pub upsample_dir: PathBuf,
    /// Where the event shards go.
    pub events_dir: PathBuf,
    /// Upsampling parameters.
    pub upsample: UpsampleParams,
    /// Simulation parameters.
    pub simulate: SimulateParams,
    /// Launcher of the upsampling script.
    pub upsample_launcher: StageLauncher,
    /// Launcher of the simulation script.
    pub simulate_launcher: StageLauncher,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            video_dir: PathBuf::new(),
            upsample_dir: PathBuf::new(),
            events_dir: PathBuf::new(),
            upsample: UpsampleParams::default(),
            simulate: SimulateParams::default(),
            upsample_launcher: StageLauncher::conda("vid2e", "upsampling/upsample.py"),
            simulate_launcher: StageLauncher::conda(
                "vid2e_torch",
                "esim_torch/scripts/generate_events.py",
            ),
        }
    }
}

impl GenerateConfig {
    /// Check paths and thresholds without launching anything.
    pub fn validate(&self) -> EvResult<()> {
        for (name, dir) in [
            ("video_dir", &self.video_dir),
            ("upsample_dir", &self.upsample_dir),
            ("events_dir", &self.events_dir),
        ] {
            if dir.as_os_str().is_empty() {
                return Err(EvError::validation(format!("{name} must be set")));
            }
        }
        let SimulateParams { ct_pos, ct_neg, .. } = self.simulate;
        if !(ct_pos.is_finite() && ct_pos > 0.0 && ct_neg.is_finite() && ct_neg > 0.0) {
            return Err(EvError::validation(format!(
                "contrast thresholds must be > 0 (got {ct_pos}, {ct_neg})"
            )));
        }
        Ok(())
    }

    /// The upsampling stage of this job.
    pub fn upsample_stage(&self) -> ExternalStage<UpsampleParams> {
        ExternalStage::new(
            self.upsample_launcher.clone(),
            &self.video_dir,
            &self.upsample_dir,
            self.upsample,
        )
    }

    /// The simulation stage of this job.
    pub fn simulate_stage(&self) -> ExternalStage<SimulateParams> {
        ExternalStage::new(
            self.simulate_launcher.clone(),
            &self.upsample_dir,
            &self.events_dir,
            self.simulate,
        )
    }
}

/// Run upsampling, then event simulation on its output.
///
/// The simulator never starts when upsampling fails.
#[tracing::instrument(
    skip(cfg),
    fields(video = %cfg.video_dir.display(), events = %cfg.events_dir.display())
)]
pub fn generate_events(cfg: &GenerateConfig) -> EvResult<[StageOutcome; 2]> {
    cfg.validate()?;
    let upsampled = cfg.upsample_stage().run()?;
    let simulated = cfg.simulate_stage().run()?;
    tracing::info!("event generation finished");
    Ok([upsampled, simulated])
}

#[cfg(test)]
#[path = "../../tests/unit/stages/generate.rs"]
mod tests;
