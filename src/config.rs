//! Configuration for depcost.
//!
//! Settings come from environment variables, optionally seeded from a .env
//! file by the binary entry point. Every knob has a default suitable for a
//! plain `depcost --package ...` run.

use std::path::PathBuf;

/// Default git URL for the reference application template.
pub const DEFAULT_TEMPLATE_URL: &str = "https://github.com/depcost/measurement-app";

/// Default branch or tag of the template to pin.
pub const DEFAULT_TEMPLATE_REF: &str = "main";

/// Binary product name the reference application builds to.
pub const REFERENCE_BIN: &str = "measurement-app";

/// depcost configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Reference app template repository (DEPCOST_TEMPLATE_URL).
    pub template_url: String,
    /// Pinned branch or tag of the template (DEPCOST_TEMPLATE_REF).
    pub template_ref: String,
    /// Parent directory for per-run working environments (DEPCOST_WORK_DIR).
    pub work_dir: PathBuf,
}

impl Config {
    /// Load configuration from the environment.
    pub fn load() -> Self {
        let template_url = std::env::var("DEPCOST_TEMPLATE_URL")
            .unwrap_or_else(|_| DEFAULT_TEMPLATE_URL.to_string());
        let template_ref = std::env::var("DEPCOST_TEMPLATE_REF")
            .unwrap_or_else(|_| DEFAULT_TEMPLATE_REF.to_string());
        let work_dir = std::env::var("DEPCOST_WORK_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| std::env::temp_dir());

        Self {
            template_url,
            template_ref,
            work_dir,
        }
    }

    /// Working-environment root for this run. The pid suffix keeps
    /// concurrent invocations out of each other's directories.
    pub fn run_root(&self) -> PathBuf {
        self.work_dir.join(format!("depcost-{}", std::process::id()))
    }

    /// Print configuration for debugging.
    pub fn print(&self) {
        println!("Configuration:");
        println!("  DEPCOST_TEMPLATE_URL: {}", self.template_url);
        println!("  DEPCOST_TEMPLATE_REF: {}", self.template_ref);
        println!("  DEPCOST_WORK_DIR: {}", self.work_dir.display());
    }
}
