//! The ephemeral on-disk state of one measurement run.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CleanupWarning;

/// Owns every on-disk artifact of a single run: the fetched checkout plus
/// the build directories for both archives, all under one root. Exactly one
/// pipeline run owns an environment; it is removed on every exit path.
#[derive(Debug)]
pub struct WorkingEnvironment {
    root: PathBuf,
    checkout: PathBuf,
}

impl WorkingEnvironment {
    pub fn new(root: PathBuf, checkout: PathBuf) -> Self {
        Self { root, checkout }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn checkout(&self) -> &Path {
        &self.checkout
    }

    /// Target dir for the build without the dependency.
    pub fn baseline_target(&self) -> PathBuf {
        self.root.join("build/baseline")
    }

    /// Target dir for the build with the dependency. Kept separate from the
    /// baseline dir so neither build can reuse the other's incremental state.
    pub fn updated_target(&self) -> PathBuf {
        self.root.join("build/updated")
    }

    /// Fixed product path convention under a target dir.
    pub fn product_path(target_dir: &Path, product: &str) -> PathBuf {
        target_dir.join("release").join(product)
    }

    /// Remove everything this run put on disk. A failure here is reported
    /// as a warning and never overrides the run's primary outcome.
    pub fn cleanup(self) -> Option<CleanupWarning> {
        if !self.root.exists() {
            return None;
        }
        match fs::remove_dir_all(&self.root) {
            Ok(()) => None,
            Err(e) => Some(CleanupWarning {
                path: self.root,
                message: e.to_string(),
            }),
        }
    }
}
