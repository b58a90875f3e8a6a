//! Capability interfaces consumed by the measurement pipeline.
//!
//! The pipeline only ever talks to these traits; the git/cargo/toml-backed
//! implementations live in their own modules, and tests substitute fakes.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::cancel::CancelToken;
use crate::error::{ExecError, FetchError, InjectionError};
use crate::request::DependencySpec;
use crate::size::SizeDelta;

/// Captured result of one build executor invocation.
#[derive(Debug, Clone)]
pub struct BuildResult {
    pub succeeded: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Retrieves the pinned reference application template.
///
/// The template reference (repository plus branch/tag) is construction
/// state of the fetcher; the pipeline only supplies the destination. On
/// failure no partial checkout may remain at `dest`.
#[async_trait]
pub trait SourceFetcher {
    async fn fetch(&self, dest: &Path) -> Result<PathBuf, FetchError>;
}

/// Declares a dependency in the reference application's build descriptor,
/// persisting the mutation to disk before returning.
pub trait DependencyInjector {
    fn inject(&self, checkout: &Path, spec: &DependencySpec) -> Result<(), InjectionError>;
}

/// Produces a release build of the reference application.
///
/// `Ok` means the tool ran to completion, successfully or not; `succeeded`
/// carries the verdict and both output streams are captured either way.
/// Timeouts and cancellation kill the child and surface as `ExecError`.
#[async_trait]
pub trait BuildExecutor {
    async fn build(
        &self,
        checkout: &Path,
        target_dir: &Path,
        cancel: &CancelToken,
    ) -> Result<BuildResult, ExecError>;
}

/// Formats the final delta. Side-effect only; never fails the pipeline.
pub trait Reporter {
    fn report(&self, delta: &SizeDelta);
}

impl<T: Reporter + ?Sized> Reporter for Box<T> {
    fn report(&self, delta: &SizeDelta) {
        (**self).report(delta)
    }
}
