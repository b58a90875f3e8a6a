//! Measure command - wires the real collaborators into the pipeline.

use std::time::Duration;

use crate::build::CargoBuildExecutor;
use crate::cancel::CancelToken;
use crate::config::{Config, REFERENCE_BIN};
use crate::error::PipelineError;
use crate::fetch::GitSourceFetcher;
use crate::inject::ManifestInjector;
use crate::pipeline::contract::Reporter;
use crate::pipeline::{MeasurementOutcome, Pipeline, PipelineOptions};
use crate::report::{ConsoleReporter, JsonReporter};
use crate::request::MeasurementRequest;

/// Caller-supplied knobs that are not part of the request itself.
#[derive(Debug, Clone, Default)]
pub struct MeasureOpts {
    /// Bound on either build invocation.
    pub timeout: Option<Duration>,
    /// Emit JSON instead of the console summary.
    pub json: bool,
}

/// Execute one measurement run against the configured template.
pub async fn cmd_measure(
    request: &MeasurementRequest,
    config: &Config,
    cancel: CancelToken,
    opts: MeasureOpts,
) -> Result<MeasurementOutcome, PipelineError> {
    if request.verbose {
        config.print();
    }
    if !opts.json {
        println!(
            "=== Measuring {} {} ===\n",
            request.product_name(),
            request.version
        );
    }

    let fetcher = GitSourceFetcher::new(&config.template_url, &config.template_ref, request.verbose);
    let injector = ManifestInjector::new();
    let executor = CargoBuildExecutor::new(opts.timeout, request.verbose);
    let reporter: Box<dyn Reporter> = if opts.json {
        Box::new(JsonReporter)
    } else {
        Box::new(ConsoleReporter)
    };

    let options = PipelineOptions {
        work_root: config.run_root(),
        product: REFERENCE_BIN.to_string(),
    };

    Pipeline::new(fetcher, injector, executor, reporter, options, cancel)
        .run(request)
        .await
}
