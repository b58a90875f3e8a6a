//! Artifact size prober.
//!
//! Computes the on-disk size of a built product. Archives can be single
//! binaries or directory bundles; bundles are summed recursively. Purely
//! read-only and deterministic for a fixed filesystem state.

use std::fs;
use std::io;
use std::path::Path;

use walkdir::WalkDir;

use crate::error::ProbeError;
use crate::size::{SizeLabel, SizeMeasurement};

/// Measure the artifact at `path`.
///
/// A missing path is `ArtifactNotFound`, never a zero-byte measurement.
pub fn measure(path: &Path, label: SizeLabel) -> Result<SizeMeasurement, ProbeError> {
    if !path.exists() {
        return Err(ProbeError::ArtifactNotFound(path.to_path_buf()));
    }
    let bytes = size_on_disk(path)?;
    Ok(SizeMeasurement::new(label, bytes))
}

/// Apparent size of a file, or the recursive sum of all files under a
/// directory. Symlinks are counted by their own metadata, not followed.
fn size_on_disk(path: &Path) -> Result<u64, ProbeError> {
    let metadata = fs::symlink_metadata(path).map_err(|source| ProbeError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if !metadata.is_dir() {
        return Ok(metadata.len());
    }

    let mut total = 0u64;
    for entry in WalkDir::new(path) {
        let entry = entry.map_err(|e| ProbeError::Io {
            path: path.to_path_buf(),
            source: io::Error::from(e),
        })?;
        if entry.file_type().is_file() {
            let metadata = entry.metadata().map_err(|e| ProbeError::Io {
                path: entry.path().to_path_buf(),
                source: io::Error::from(e),
            })?;
            total += metadata.len();
        }
    }
    Ok(total)
}
