//! Pipeline behavior tests with fake collaborators.
//!
//! These cover the stage sequence, the failure policy per stage, and the
//! teardown guarantee: once the working environment exists it is gone after
//! every run, whatever the outcome.

mod helpers;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use depcost::cancel::{cancel_pair, CancelToken};
use depcost::error::{ProbeError, StageFailure};
use depcost::pipeline::{Pipeline, PipelineOptions, PipelineStage};
use depcost::request::{LinkingMode, MeasurementRequest};

use helpers::{
    entries, new_log, BuildPlan, CallLog, FakeExecutor, FakeFetcher, FakeInjector, FakeReporter,
};

const PRODUCT: &str = "measurement-app";
const BASELINE_BYTES: u64 = 10_485_760;
const UPDATED_BYTES: u64 = 10_747_904;

struct Harness {
    _temp: TempDir,
    run_root: PathBuf,
    log: CallLog,
    seen: Arc<Mutex<Option<depcost::size::SizeDelta>>>,
}

impl Harness {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let run_root = temp.path().join("run");
        Self {
            _temp: temp,
            run_root,
            log: new_log(),
            seen: Arc::new(Mutex::new(None)),
        }
    }

    fn pipeline(
        &self,
        fetch_fails: bool,
        inject_fails: bool,
        plans: Vec<BuildPlan>,
        cancel: CancelToken,
    ) -> Pipeline<FakeFetcher, FakeInjector, FakeExecutor, FakeReporter> {
        Pipeline::new(
            FakeFetcher {
                log: self.log.clone(),
                fail: fetch_fails,
            },
            FakeInjector {
                log: self.log.clone(),
                fail: inject_fails,
            },
            FakeExecutor::new(self.log.clone(), PRODUCT, plans),
            FakeReporter {
                log: self.log.clone(),
                seen: self.seen.clone(),
            },
            PipelineOptions {
                work_root: self.run_root.clone(),
                product: PRODUCT.to_string(),
            },
            cancel,
        )
    }
}

fn request() -> MeasurementRequest {
    MeasurementRequest::new("serde", "1.0.219", None, LinkingMode::Static, false)
}

#[tokio::test]
async fn test_successful_run_visits_collaborators_in_order() {
    let harness = Harness::new();
    let pipeline = harness.pipeline(
        false,
        false,
        vec![
            BuildPlan::Produce(BASELINE_BYTES),
            BuildPlan::Produce(UPDATED_BYTES),
        ],
        CancelToken::never(),
    );

    let outcome = pipeline.run(&request()).await.expect("run should succeed");

    assert_eq!(
        entries(&harness.log),
        vec!["fetch", "build", "inject", "build", "report"]
    );
    assert_eq!(outcome.delta.bytes, 262_144);
    assert_eq!(outcome.delta.baseline.display, "10.0 MB");
    assert_eq!(outcome.delta.display, "+256.0 KB");
    assert!(outcome.cleanup.is_none());
    assert!(
        !harness.run_root.exists(),
        "working environment must be removed after success"
    );

    let seen = harness.seen.lock().unwrap();
    let reported = seen.as_ref().expect("reporter should receive the delta");
    assert_eq!(reported.bytes, 262_144);
}

#[tokio::test]
async fn test_delta_is_negative_when_updated_is_smaller() {
    let harness = Harness::new();
    let pipeline = harness.pipeline(
        false,
        false,
        vec![BuildPlan::Produce(4096), BuildPlan::Produce(1024)],
        CancelToken::never(),
    );

    let outcome = pipeline.run(&request()).await.unwrap();
    assert_eq!(outcome.delta.bytes, -3072);
    assert_eq!(outcome.delta.display, "-3.0 KB");
}

#[tokio::test]
async fn test_fetch_failure_creates_no_environment() {
    let harness = Harness::new();
    let pipeline = harness.pipeline(true, false, vec![], CancelToken::never());

    let err = pipeline.run(&request()).await.expect_err("fetch should fail");

    assert_eq!(err.stage, PipelineStage::Fetching);
    assert!(matches!(err.cause, StageFailure::Fetch(_)));
    assert!(err.cleanup.is_none());
    assert_eq!(entries(&harness.log), vec!["fetch"]);
    assert!(
        !harness.run_root.exists(),
        "no working environment may exist after a fetch failure"
    );
}

#[tokio::test]
async fn test_baseline_build_failure_precedes_injection() {
    let harness = Harness::new();
    let pipeline = harness.pipeline(false, false, vec![BuildPlan::FailBuild], CancelToken::never());

    let err = pipeline.run(&request()).await.expect_err("build should fail");

    assert_eq!(err.stage, PipelineStage::BuildingBaseline);
    match &err.cause {
        StageFailure::Build { stderr, .. } => assert!(stderr.contains("E0432")),
        other => panic!("expected Build, got {:?}", other),
    }
    let log = entries(&harness.log);
    assert!(
        !log.iter().any(|e| e == "inject"),
        "injector must never run after a baseline build failure: {:?}",
        log
    );
    assert!(!harness.run_root.exists(), "environment must be cleaned up");
}

#[tokio::test]
async fn test_missing_baseline_artifact_is_probe_error() {
    let harness = Harness::new();
    let pipeline = harness.pipeline(
        false,
        false,
        vec![BuildPlan::ProduceNothing],
        CancelToken::never(),
    );

    let err = pipeline.run(&request()).await.expect_err("probe should fail");

    assert_eq!(err.stage, PipelineStage::MeasuringBaseline);
    assert!(matches!(
        err.cause,
        StageFailure::Probe(ProbeError::ArtifactNotFound(_))
    ));
    assert!(!harness.run_root.exists());
}

#[tokio::test]
async fn test_injection_failure_halts_before_updated_build() {
    let harness = Harness::new();
    let pipeline = harness.pipeline(
        false,
        true,
        vec![BuildPlan::Produce(BASELINE_BYTES)],
        CancelToken::never(),
    );

    let err = pipeline
        .run(&request())
        .await
        .expect_err("injection should fail");

    assert_eq!(err.stage, PipelineStage::InjectingDependency);
    assert!(matches!(err.cause, StageFailure::Injection(_)));
    assert_eq!(entries(&harness.log), vec!["fetch", "build", "inject"]);
    assert!(!harness.run_root.exists());
}

#[tokio::test]
async fn test_updated_build_failure_still_cleans_up() {
    let harness = Harness::new();
    let pipeline = harness.pipeline(
        false,
        false,
        vec![BuildPlan::Produce(BASELINE_BYTES), BuildPlan::FailBuild],
        CancelToken::never(),
    );

    let err = pipeline
        .run(&request())
        .await
        .expect_err("updated build should fail");

    assert_eq!(err.stage, PipelineStage::BuildingUpdated);
    assert!(matches!(err.cause, StageFailure::Build { .. }));
    assert_eq!(
        entries(&harness.log),
        vec!["fetch", "build", "inject", "build"]
    );
    assert!(
        !harness.run_root.exists(),
        "environment must be cleaned up after an updated build failure"
    );
}

#[tokio::test]
async fn test_build_timeout_is_tagged_with_its_stage() {
    let harness = Harness::new();
    let pipeline = harness.pipeline(false, false, vec![BuildPlan::Timeout], CancelToken::never());

    let err = pipeline.run(&request()).await.expect_err("build should time out");

    assert_eq!(err.stage, PipelineStage::BuildingBaseline);
    assert!(matches!(err.cause, StageFailure::Timeout(_)));
    assert!(!harness.run_root.exists());
}

#[tokio::test]
async fn test_preset_cancellation_stops_before_any_work() {
    let harness = Harness::new();
    let (handle, token) = cancel_pair();
    handle.cancel();
    let pipeline = harness.pipeline(false, false, vec![], token);

    let err = pipeline.run(&request()).await.expect_err("run is canceled");

    assert_eq!(err.stage, PipelineStage::Fetching);
    assert!(matches!(err.cause, StageFailure::Canceled));
    assert!(entries(&harness.log).is_empty(), "no collaborator may run");
}

#[tokio::test]
async fn test_cancellation_during_build_still_cleans_up() {
    let harness = Harness::new();
    let pipeline = harness.pipeline(false, false, vec![BuildPlan::Cancel], CancelToken::never());

    let err = pipeline.run(&request()).await.expect_err("run is canceled");

    assert_eq!(err.stage, PipelineStage::BuildingBaseline);
    assert!(matches!(err.cause, StageFailure::Canceled));
    assert!(
        !harness.run_root.exists(),
        "cancellation must still remove the environment"
    );
}

#[tokio::test]
async fn test_reporter_never_runs_on_failure() {
    let harness = Harness::new();
    let pipeline = harness.pipeline(
        false,
        false,
        vec![BuildPlan::Produce(BASELINE_BYTES), BuildPlan::FailBuild],
        CancelToken::never(),
    );

    let _ = pipeline.run(&request()).await;

    assert!(!entries(&harness.log).iter().any(|e| e == "report"));
    assert!(harness.seen.lock().unwrap().is_none());
}
