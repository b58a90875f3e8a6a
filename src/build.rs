//! Cargo-backed build executor.
//!
//! Produces a release build of the reference application with a dedicated
//! target directory per archive, capturing both output streams. The child
//! process is killed when the caller's timeout elapses or the run is
//! canceled.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::cancel::CancelToken;
use crate::error::ExecError;
use crate::pipeline::contract::{BuildExecutor, BuildResult};

pub struct CargoBuildExecutor {
    timeout: Option<Duration>,
    verbose: bool,
}

impl CargoBuildExecutor {
    pub fn new(timeout: Option<Duration>, verbose: bool) -> Self {
        Self { timeout, verbose }
    }
}

#[async_trait]
impl BuildExecutor for CargoBuildExecutor {
    async fn build(
        &self,
        checkout: &Path,
        target_dir: &Path,
        cancel: &CancelToken,
    ) -> Result<BuildResult, ExecError> {
        let mut cmd = Command::new("cargo");
        cmd.arg("build")
            .arg("--release")
            .arg("--target-dir")
            .arg(target_dir)
            .current_dir(checkout)
            .env("CARGO_TERM_COLOR", "never")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if self.verbose {
            println!(
                "  cargo build --release --target-dir {} (in {})",
                target_dir.display(),
                checkout.display()
            );
        }

        let child = cmd
            .spawn()
            .map_err(|e| ExecError::Spawn(format!("failed to run cargo: {}", e)))?;
        let wait = child.wait_with_output();
        tokio::pin!(wait);

        // Dropping the in-flight wait future kills the child.
        let output = match self.timeout {
            Some(limit) => tokio::select! {
                out = &mut wait => out,
                _ = cancel.canceled() => return Err(ExecError::Canceled),
                _ = tokio::time::sleep(limit) => return Err(ExecError::Timeout(limit)),
            },
            None => tokio::select! {
                out = &mut wait => out,
                _ = cancel.canceled() => return Err(ExecError::Canceled),
            },
        };
        let output =
            output.map_err(|e| ExecError::Spawn(format!("failed to wait for cargo: {}", e)))?;

        let result = BuildResult {
            succeeded: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if self.verbose && !result.stderr.is_empty() {
            println!("{}", result.stderr.trim_end());
        }

        Ok(result)
    }
}
