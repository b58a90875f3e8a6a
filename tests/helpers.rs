//! Shared fakes and fixtures for depcost tests.
//!
//! Every fake records its calls in a shared log so tests can assert the
//! exact collaborator sequence a pipeline run produced.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use depcost::error::{ExecError, FetchError, InjectionError};
use depcost::pipeline::contract::{
    BuildExecutor, BuildResult, DependencyInjector, Reporter, SourceFetcher,
};
use depcost::request::DependencySpec;
use depcost::size::SizeDelta;

/// Order of collaborator calls observed during a run.
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn new_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn record(log: &CallLog, entry: &str) {
    log.lock().unwrap().push(entry.to_string());
}

pub fn entries(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Fetcher that materializes a minimal checkout, or refuses.
pub struct FakeFetcher {
    pub log: CallLog,
    pub fail: bool,
}

#[async_trait]
impl SourceFetcher for FakeFetcher {
    async fn fetch(&self, dest: &Path) -> Result<PathBuf, FetchError> {
        record(&self.log, "fetch");
        if self.fail {
            return Err(FetchError::new("repository unreachable"));
        }
        std::fs::create_dir_all(dest).expect("failed to create fake checkout");
        std::fs::write(
            dest.join("Cargo.toml"),
            "[package]\nname = \"measurement-app\"\nversion = \"0.1.0\"\n",
        )
        .expect("failed to write fake manifest");
        Ok(dest.to_path_buf())
    }
}

/// Injector that records the call, or refuses.
pub struct FakeInjector {
    pub log: CallLog,
    pub fail: bool,
}

impl DependencyInjector for FakeInjector {
    fn inject(&self, _checkout: &Path, _spec: &DependencySpec) -> Result<(), InjectionError> {
        record(&self.log, "inject");
        if self.fail {
            return Err(InjectionError::new("manifest mutation rejected"));
        }
        Ok(())
    }
}

/// What the fake executor does on each successive build call.
#[derive(Debug, Clone, Copy)]
pub enum BuildPlan {
    /// Write a product of this many bytes and report success.
    Produce(u64),
    /// Report success without writing any product.
    ProduceNothing,
    /// Report a failed build with canned streams.
    FailBuild,
    /// Surface a timeout from the executor.
    Timeout,
    /// Surface cancellation from the executor.
    Cancel,
}

/// Executor that replays a scripted plan, one entry per build call.
pub struct FakeExecutor {
    pub log: CallLog,
    pub product: String,
    plans: Mutex<Vec<BuildPlan>>,
}

impl FakeExecutor {
    pub fn new(log: CallLog, product: &str, plans: Vec<BuildPlan>) -> Self {
        Self {
            log,
            product: product.to_string(),
            plans: Mutex::new(plans),
        }
    }
}

#[async_trait]
impl BuildExecutor for FakeExecutor {
    async fn build(
        &self,
        _checkout: &Path,
        target_dir: &Path,
        _cancel: &depcost::cancel::CancelToken,
    ) -> Result<BuildResult, ExecError> {
        record(&self.log, "build");
        let plan = {
            let mut plans = self.plans.lock().unwrap();
            assert!(!plans.is_empty(), "unexpected extra build call");
            plans.remove(0)
        };
        match plan {
            BuildPlan::Produce(bytes) => {
                let release = target_dir.join("release");
                std::fs::create_dir_all(&release).expect("failed to create target dir");
                std::fs::write(release.join(&self.product), vec![0u8; bytes as usize])
                    .expect("failed to write fake product");
                Ok(BuildResult {
                    succeeded: true,
                    stdout: "Compiling measurement-app v0.1.0".to_string(),
                    stderr: String::new(),
                })
            }
            BuildPlan::ProduceNothing => Ok(BuildResult {
                succeeded: true,
                stdout: String::new(),
                stderr: String::new(),
            }),
            BuildPlan::FailBuild => Ok(BuildResult {
                succeeded: false,
                stdout: String::new(),
                stderr: "error[E0432]: unresolved import `nope`".to_string(),
            }),
            BuildPlan::Timeout => Err(ExecError::Timeout(Duration::from_secs(30))),
            BuildPlan::Cancel => Err(ExecError::Canceled),
        }
    }
}

/// Reporter that records the call and keeps the delta it was handed.
pub struct FakeReporter {
    pub log: CallLog,
    pub seen: Arc<Mutex<Option<SizeDelta>>>,
}

impl Reporter for FakeReporter {
    fn report(&self, delta: &SizeDelta) {
        record(&self.log, "report");
        *self.seen.lock().unwrap() = Some(delta.clone());
    }
}
