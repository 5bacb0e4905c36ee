//! Per-file decision and fallback logic.
//!
//! A task is either skipped (output exists), or run as an ordered list of
//! attempts: remux first when the source is already compliant, then a
//! hardware-accelerated encode when a backend is configured, then a software
//! encode. Each attempt writes a fresh temp artifact; the first one that
//! succeeds is committed and the rest are never run.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::error::ConvertError;
use super::ffmpeg_cmd::{EncodeMode, build_ffmpeg_cmd, target_dimensions};
use super::policy::EncodingPolicy;
use super::runner::{CommandRunner, RunStatus};
use super::temp::WorkDir;
use super::types::{ConversionOutcome, ConversionTask};
use crate::engine::hardware::AccelBackend;
use crate::engine::probe::{StreamProbe, is_compliant};

/// Run-wide settings, fixed before the first task starts
#[derive(Debug, Clone, Default)]
pub struct ConvertSettings {
    pub policy: EncodingPolicy,
    /// Backend detected (or forced) at startup; `None` = software only
    pub hwaccel: Option<AccelBackend>,
    pub overwrite: bool,
    /// Probe sources and remux the ones already within the target profile
    pub skip_if_compliant: bool,
}

impl ConvertSettings {
    /// Decide what to run for `task`. Probes the source unless the output
    /// already exists or compliance skipping is disabled. Needs no scratch
    /// directory, so dry runs plan with settings alone.
    pub fn plan<P: StreamProbe>(&self, task: &ConversionTask, prober: &P) -> TaskPlan {
        let output = task.output_path();
        if output.exists() && !self.overwrite {
            return TaskPlan::Skip { output };
        }

        let mut attempts = Vec::with_capacity(3);
        if self.skip_if_compliant {
            let profile = prober.probe(&task.source_file);
            if is_compliant(&profile, &self.policy) {
                debug!(source = %task.source_file.display(), ?profile, "already compliant");
                attempts.push(EncodeMode::Remux);
            } else if let (Some(w), Some(h)) = (profile.width, profile.height) {
                let (tw, th) = target_dimensions(w, h, self.policy.max_width, self.policy.max_height);
                debug!(
                    source = %task.source_file.display(),
                    "needs encode: {}x{} -> {}x{}", w, h, tw, th
                );
            } else {
                debug!(source = %task.source_file.display(), "stream unknown, encoding");
            }
        }

        if let Some(backend) = self.hwaccel {
            attempts.push(EncodeMode::Hardware(backend));
        }
        attempts.push(EncodeMode::Software);

        TaskPlan::Run { output, attempts }
    }
}

/// What the converter will do with a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskPlan {
    /// Destination exists and overwrite is disabled
    Skip { output: PathBuf },
    /// Attempts in fallback order
    Run {
        output: PathBuf,
        attempts: Vec<EncodeMode>,
    },
}

enum Attempt {
    Committed,
    /// ffmpeg failed; the next attempt may still succeed
    Failed(Option<i32>),
    /// Stop the task without trying further attempts
    Abort(ConvertError),
}

pub struct Converter<R, P> {
    settings: ConvertSettings,
    runner: R,
    prober: P,
    work_dir: WorkDir,
}

impl<R: CommandRunner, P: StreamProbe> Converter<R, P> {
    pub fn new(settings: ConvertSettings, runner: R, prober: P, work_dir: WorkDir) -> Self {
        Self {
            settings,
            runner,
            prober,
            work_dir,
        }
    }

    pub fn work_dir(&self) -> &Path {
        self.work_dir.path()
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Decide what to run for `task`; see [`ConvertSettings::plan`]
    pub fn plan(&self, task: &ConversionTask) -> TaskPlan {
        self.settings.plan(task, &self.prober)
    }

    /// Convert one task. Never leaves a temp artifact behind and never
    /// touches an existing output unless a new one is committed over it.
    pub fn convert(&self, task: &ConversionTask) -> ConversionOutcome {
        let (output, attempts) = match self.plan(task) {
            TaskPlan::Skip { output } => {
                info!(output = %output.display(), "output exists, skipping");
                return ConversionOutcome::SkippedExists;
            }
            TaskPlan::Run { output, attempts } => (output, attempts),
        };

        let mut last_code = None;
        for mode in attempts {
            match self.attempt(mode, &task.source_file, &output) {
                Attempt::Committed => {
                    info!(output = %output.display(), mode = %mode.label(), "committed");
                    return match mode {
                        EncodeMode::Remux => ConversionOutcome::Remuxed,
                        _ => ConversionOutcome::Encoded,
                    };
                }
                Attempt::Failed(code) => {
                    warn!(
                        source = %task.source_file.display(),
                        mode = %mode.label(),
                        ?code,
                        "attempt failed"
                    );
                    last_code = code;
                }
                Attempt::Abort(e) => return ConversionOutcome::Failed(e),
            }
        }

        ConversionOutcome::Failed(ConvertError::Encode { code: last_code })
    }

    fn attempt(&self, mode: EncodeMode, source: &Path, output: &Path) -> Attempt {
        let artifact = self.work_dir.artifact();
        let cmd = build_ffmpeg_cmd(
            mode,
            source,
            artifact.path(),
            &self.settings.policy,
            self.settings.overwrite,
        );
        info!(source = %source.display(), mode = %mode.label(), "starting");

        match self.runner.run(cmd) {
            RunStatus::Success => match artifact.promote(output) {
                Ok(()) => Attempt::Committed,
                Err(source) => Attempt::Abort(ConvertError::Commit {
                    path: output.to_path_buf(),
                    source,
                }),
            },
            RunStatus::Failed { code } => Attempt::Failed(code),
            RunStatus::Cancelled => Attempt::Abort(ConvertError::Cancelled),
        }
    }
}
