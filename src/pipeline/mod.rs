//! The differential build-measurement pipeline.
//!
//! One run walks a fixed stage sequence: fetch the reference app, build and
//! measure it untouched, inject the requested dependency, build and measure
//! again, then tear the working environment down. Stages execute strictly
//! in order; nothing runs concurrently, because every stage reads state the
//! previous one left on disk. The environment is removed on every exit path
//! once it exists, and a cleanup failure never masks the primary outcome.

pub mod contract;

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::cancel::CancelToken;
use crate::error::{CleanupWarning, PipelineError, StageFailure};
use crate::probe;
use crate::request::MeasurementRequest;
use crate::size::{SizeDelta, SizeLabel};
use crate::workdir::WorkingEnvironment;

use self::contract::{BuildExecutor, DependencyInjector, Reporter, SourceFetcher};

/// Stages in execution order. Within one run the stage only ever advances;
/// the derived `Ord` follows declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PipelineStage {
    Fetching,
    BuildingBaseline,
    MeasuringBaseline,
    InjectingDependency,
    BuildingUpdated,
    MeasuringUpdated,
    CleaningUp,
    Done,
}

impl PipelineStage {
    /// Number of stages that print a progress step.
    pub const STEP_COUNT: usize = 7;

    /// 1-based progress step, `None` for the terminal stage.
    pub fn step(self) -> Option<usize> {
        match self {
            PipelineStage::Fetching => Some(1),
            PipelineStage::BuildingBaseline => Some(2),
            PipelineStage::MeasuringBaseline => Some(3),
            PipelineStage::InjectingDependency => Some(4),
            PipelineStage::BuildingUpdated => Some(5),
            PipelineStage::MeasuringUpdated => Some(6),
            PipelineStage::CleaningUp => Some(7),
            PipelineStage::Done => None,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            PipelineStage::Fetching => "Fetching reference app",
            PipelineStage::BuildingBaseline => "Building baseline archive",
            PipelineStage::MeasuringBaseline => "Measuring baseline archive",
            PipelineStage::InjectingDependency => "Injecting dependency",
            PipelineStage::BuildingUpdated => "Building updated archive",
            PipelineStage::MeasuringUpdated => "Measuring updated archive",
            PipelineStage::CleaningUp => "Cleaning up",
            PipelineStage::Done => "Done",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Fetching => "fetch",
            PipelineStage::BuildingBaseline => "baseline build",
            PipelineStage::MeasuringBaseline => "baseline measurement",
            PipelineStage::InjectingDependency => "dependency injection",
            PipelineStage::BuildingUpdated => "updated build",
            PipelineStage::MeasuringUpdated => "updated measurement",
            PipelineStage::CleaningUp => "cleanup",
            PipelineStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Successful run output: the delta plus any non-fatal cleanup warning.
#[derive(Debug)]
pub struct MeasurementOutcome {
    pub delta: SizeDelta,
    pub cleanup: Option<CleanupWarning>,
}

/// Fixed settings for one run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Root of the working environment. Everything the run writes lives
    /// under it, and it is removed at the end.
    pub work_root: PathBuf,
    /// Binary product name the reference application builds to.
    pub product: String,
}

/// The measurement pipeline. Owns its collaborators and, for the duration
/// of one `run`, the working environment.
pub struct Pipeline<F, I, B, R> {
    fetcher: F,
    injector: I,
    executor: B,
    reporter: R,
    options: PipelineOptions,
    cancel: CancelToken,
}

impl<F, I, B, R> Pipeline<F, I, B, R>
where
    F: SourceFetcher,
    I: DependencyInjector,
    B: BuildExecutor,
    R: Reporter,
{
    pub fn new(
        fetcher: F,
        injector: I,
        executor: B,
        reporter: R,
        options: PipelineOptions,
        cancel: CancelToken,
    ) -> Self {
        Self {
            fetcher,
            injector,
            executor,
            reporter,
            options,
            cancel,
        }
    }

    /// Run one measurement to completion.
    ///
    /// Any failure after the fetch stage still removes the working
    /// environment before the error is returned.
    pub async fn run(
        &self,
        request: &MeasurementRequest,
    ) -> Result<MeasurementOutcome, PipelineError> {
        // Nothing is on disk yet, so a failure here needs no cleanup.
        self.announce(PipelineStage::Fetching);
        if self.cancel.is_canceled() {
            return Err(PipelineError::new(
                PipelineStage::Fetching,
                StageFailure::Canceled,
            ));
        }
        let dest = self.options.work_root.join("app");
        let checkout = match self.fetcher.fetch(&dest).await {
            Ok(path) => path,
            Err(e) => return Err(PipelineError::new(PipelineStage::Fetching, e.into())),
        };

        let env = WorkingEnvironment::new(self.options.work_root.clone(), checkout);

        // From here on the run owns on-disk state; tear it down on every path.
        let measured = self.run_measured_stages(request, &env).await;

        self.announce(PipelineStage::CleaningUp);
        let cleanup = env.cleanup();
        if let Some(warning) = &cleanup {
            eprintln!("[WARN] {}", warning);
        }

        match measured {
            Ok(delta) => {
                self.announce(PipelineStage::Done);
                self.reporter.report(&delta);
                Ok(MeasurementOutcome { delta, cleanup })
            }
            Err((stage, cause)) => Err(PipelineError {
                stage,
                cause,
                cleanup,
            }),
        }
    }

    /// Stages between fetch and cleanup. Errors are tagged with the stage
    /// they occurred in and handed back for the unconditional teardown.
    async fn run_measured_stages(
        &self,
        request: &MeasurementRequest,
        env: &WorkingEnvironment,
    ) -> Result<SizeDelta, (PipelineStage, StageFailure)> {
        let baseline_product =
            WorkingEnvironment::product_path(&env.baseline_target(), &self.options.product);
        let updated_product =
            WorkingEnvironment::product_path(&env.updated_target(), &self.options.product);

        self.enter(PipelineStage::BuildingBaseline)?;
        self.build_archive(PipelineStage::BuildingBaseline, env, &env.baseline_target())
            .await?;

        self.enter(PipelineStage::MeasuringBaseline)?;
        let baseline = probe::measure(&baseline_product, SizeLabel::Baseline)
            .map_err(|e| (PipelineStage::MeasuringBaseline, e.into()))?;
        println!("  Baseline: {}", baseline.display);

        self.enter(PipelineStage::InjectingDependency)?;
        let spec = request.dependency_spec();
        self.injector
            .inject(env.checkout(), &spec)
            .map_err(|e| (PipelineStage::InjectingDependency, e.into()))?;

        self.enter(PipelineStage::BuildingUpdated)?;
        self.build_archive(PipelineStage::BuildingUpdated, env, &env.updated_target())
            .await?;

        self.enter(PipelineStage::MeasuringUpdated)?;
        let updated = probe::measure(&updated_product, SizeLabel::Updated)
            .map_err(|e| (PipelineStage::MeasuringUpdated, e.into()))?;
        println!("  Updated:  {}", updated.display);

        Ok(SizeDelta::between(baseline, updated))
    }

    /// Run one archive build, mapping executor errors and tool failure to
    /// the given stage.
    async fn build_archive(
        &self,
        stage: PipelineStage,
        env: &WorkingEnvironment,
        target_dir: &Path,
    ) -> Result<(), (PipelineStage, StageFailure)> {
        let start = Instant::now();
        let result = self
            .executor
            .build(env.checkout(), target_dir, &self.cancel)
            .await
            .map_err(|e| (stage, e.into()))?;

        if !result.succeeded {
            return Err((
                stage,
                StageFailure::Build {
                    stdout: result.stdout,
                    stderr: result.stderr,
                },
            ));
        }

        println!("  [{:.1}s] {}", start.elapsed().as_secs_f64(), stage);
        Ok(())
    }

    /// Announce a stage and stop early if the caller interrupted.
    fn enter(&self, stage: PipelineStage) -> Result<(), (PipelineStage, StageFailure)> {
        self.announce(stage);
        if self.cancel.is_canceled() {
            return Err((stage, StageFailure::Canceled));
        }
        Ok(())
    }

    fn announce(&self, stage: PipelineStage) {
        if let Some(step) = stage.step() {
            println!(
                "[{}/{}] {}...",
                step,
                PipelineStage::STEP_COUNT,
                stage.describe()
            );
        }
    }
}
