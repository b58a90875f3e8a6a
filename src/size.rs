//! Size measurements and the derived delta.
//!
//! All display strings use the same 1024-based unit convention so the two
//! measurements and the delta are directly comparable.

use serde::Serialize;

const KB: u64 = 1024;
const MB: u64 = KB * 1024;
const GB: u64 = MB * 1024;

/// Which build a measurement belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeLabel {
    Baseline,
    Updated,
}

/// A single size-on-disk reading of a built artifact.
#[derive(Debug, Clone, Serialize)]
pub struct SizeMeasurement {
    pub label: SizeLabel,
    pub bytes: u64,
    pub display: String,
}

impl SizeMeasurement {
    pub fn new(label: SizeLabel, bytes: u64) -> Self {
        Self {
            label,
            bytes,
            display: format_bytes(bytes),
        }
    }
}

/// Signed difference between the updated and baseline measurements.
///
/// The delta is computed here and nowhere else.
#[derive(Debug, Clone, Serialize)]
pub struct SizeDelta {
    pub baseline: SizeMeasurement,
    pub updated: SizeMeasurement,
    pub bytes: i64,
    pub display: String,
}

impl SizeDelta {
    pub fn between(baseline: SizeMeasurement, updated: SizeMeasurement) -> Self {
        let bytes = updated.bytes as i64 - baseline.bytes as i64;
        Self {
            baseline,
            updated,
            bytes,
            display: format_signed(bytes),
        }
    }
}

/// Format a byte count with 1024-based units.
pub fn format_bytes(bytes: u64) -> String {
    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Format a signed byte delta with an explicit sign.
pub fn format_signed(bytes: i64) -> String {
    let magnitude = format_bytes(bytes.unsigned_abs());
    if bytes > 0 {
        format!("+{}", magnitude)
    } else if bytes < 0 {
        format!("-{}", magnitude)
    } else {
        magnitude
    }
}
