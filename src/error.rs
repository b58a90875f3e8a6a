//! Error taxonomy for the measurement pipeline.
//!
//! Every stage failure maps to exactly one entry here, tagged with the
//! stage it occurred in. Cleanup problems are warnings attached to the
//! primary outcome; they never change it.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use thiserror::Error;

use crate::pipeline::PipelineStage;

/// Failure to retrieve the reference application template.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct FetchError {
    pub message: String,
}

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Failure to mutate the reference application's build descriptor.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct InjectionError {
    pub message: String,
}

impl InjectionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Failure to measure a built artifact on disk.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The expected artifact path does not exist. Never reported as size 0.
    #[error("no artifact found at {}", .0.display())]
    ArtifactNotFound(PathBuf),
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failure surfaced by the build executor before a build could finish.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("build timed out after {0:?}")]
    Timeout(Duration),
    #[error("canceled")]
    Canceled,
    #[error("{0}")]
    Spawn(String),
}

/// The cause of a single stage's failure.
#[derive(Debug, Error)]
pub enum StageFailure {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// The build tool ran and reported failure. Both streams are kept; the
    /// error stream carries the diagnostics worth surfacing.
    #[error("build did not succeed\n{stderr}")]
    Build { stdout: String, stderr: String },
    #[error(transparent)]
    Probe(#[from] ProbeError),
    #[error(transparent)]
    Injection(#[from] InjectionError),
    #[error("build timed out after {0:?}")]
    Timeout(Duration),
    #[error("run canceled")]
    Canceled,
}

impl From<ExecError> for StageFailure {
    fn from(err: ExecError) -> Self {
        match err {
            ExecError::Timeout(limit) => StageFailure::Timeout(limit),
            ExecError::Canceled => StageFailure::Canceled,
            ExecError::Spawn(message) => StageFailure::Build {
                stdout: String::new(),
                stderr: message,
            },
        }
    }
}

/// Non-fatal problem while removing the working environment.
#[derive(Debug, Clone, Error)]
#[error("failed to remove {}: {message}", .path.display())]
pub struct CleanupWarning {
    pub path: PathBuf,
    pub message: String,
}

/// Terminal pipeline error: the stage that failed plus its cause.
#[derive(Debug, Error)]
#[error("{stage} failed: {cause}")]
pub struct PipelineError {
    pub stage: PipelineStage,
    pub cause: StageFailure,
    /// Set when teardown also had trouble. Informational only.
    pub cleanup: Option<CleanupWarning>,
}

impl PipelineError {
    pub fn new(stage: PipelineStage, cause: StageFailure) -> Self {
        Self {
            stage,
            cause,
            cleanup: None,
        }
    }

    /// Map the failure category to a deterministic exit code.
    pub fn exit_code(&self) -> ExitCode {
        match self.cause {
            StageFailure::Fetch(_) => ExitCode::from(10),
            StageFailure::Build { .. } => ExitCode::from(11),
            StageFailure::Probe(_) => ExitCode::from(12),
            StageFailure::Injection(_) => ExitCode::from(13),
            StageFailure::Timeout(_) => ExitCode::from(14),
            StageFailure::Canceled => ExitCode::from(130),
        }
    }
}
