//! Host tool checks before a measurement run.
//!
//! A run needs git to fetch the reference app and cargo to build it.
//! Checking up front turns a mid-pipeline spawn failure into an immediate,
//! actionable report.

use anyhow::{bail, Result};

/// Tools a measurement run shells out to, with hints for missing ones.
const REQUIRED_TOOLS: &[(&str, &str)] = &[
    ("git", "required to fetch the reference app template"),
    ("cargo", "required to build the reference app"),
];

/// Result of a single host tool check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub tool: &'static str,
    pub found: Option<String>,
    pub hint: &'static str,
}

/// Check every required tool. Never fails; callers decide what a miss means.
pub fn check_host_tools() -> Vec<CheckResult> {
    REQUIRED_TOOLS
        .iter()
        .map(|&(tool, hint)| CheckResult {
            tool,
            found: which::which(tool)
                .ok()
                .map(|p| p.display().to_string()),
            hint,
        })
        .collect()
}

/// Run the checks, print a report, and bail if anything is missing.
pub fn ensure_host_tools() -> Result<()> {
    let checks = check_host_tools();
    let missing: Vec<&CheckResult> = checks.iter().filter(|c| c.found.is_none()).collect();
    if missing.is_empty() {
        return Ok(());
    }

    println!("=== Preflight Check Results ===\n");
    for check in &checks {
        match &check.found {
            Some(path) => println!("  [PASS] {}: {}", check.tool, path),
            None => println!("  [FAIL] {}: not found in PATH ({})", check.tool, check.hint),
        }
    }
    println!();

    bail!(
        "preflight failed: {} tool(s) missing. Install them or rerun with --skip-preflight.",
        missing.len()
    );
}
