//! Git-backed source fetcher for the reference application template.
//!
//! Shallow-clones the pinned template repository into the run's working
//! directory. A failed or timed-out clone removes whatever partial checkout
//! git left behind, so no residue outlives the error.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::FetchError;
use crate::pipeline::contract::SourceFetcher;

/// Upper bound on the template clone.
const CLONE_TIMEOUT: Duration = Duration::from_secs(600);

pub struct GitSourceFetcher {
    url: String,
    reference: String,
    timeout: Duration,
    verbose: bool,
}

impl GitSourceFetcher {
    pub fn new(url: &str, reference: &str, verbose: bool) -> Self {
        Self {
            url: url.to_string(),
            reference: reference.to_string(),
            timeout: CLONE_TIMEOUT,
            verbose,
        }
    }
}

#[async_trait]
impl SourceFetcher for GitSourceFetcher {
    async fn fetch(&self, dest: &Path) -> Result<PathBuf, FetchError> {
        // A leftover checkout from a crashed run would poison the baseline.
        if dest.exists() {
            tokio::fs::remove_dir_all(dest).await.map_err(|e| {
                FetchError::new(format!(
                    "failed to remove stale checkout {}: {}",
                    dest.display(),
                    e
                ))
            })?;
        }
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                FetchError::new(format!(
                    "failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let mut cmd = Command::new("git");
        cmd.args(["clone", "--depth", "1", "--branch", &self.reference]);
        cmd.arg(&self.url);
        cmd.arg(dest);

        if self.verbose {
            println!(
                "  git clone --depth 1 --branch {} {} {}",
                self.reference,
                self.url,
                dest.display()
            );
        }

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| {
                let _ = std::fs::remove_dir_all(dest);
                FetchError::new(format!(
                    "git clone timed out after {:?} for {}",
                    self.timeout, self.url
                ))
            })?
            .map_err(|e| FetchError::new(format!("failed to execute git: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let _ = std::fs::remove_dir_all(dest);
            return Err(FetchError::new(format!(
                "git clone failed for {}\n  Exit code: {}\n  stderr: {}",
                self.url,
                output.status.code().unwrap_or(-1),
                stderr.trim()
            )));
        }

        Ok(dest.to_path_buf())
    }
}
