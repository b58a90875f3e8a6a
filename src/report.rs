//! Result reporters.
//!
//! Reporters only format the finished delta. They cannot fail the run;
//! serialization trouble degrades to a warning on stderr.

use crate::pipeline::contract::Reporter;
use crate::size::SizeDelta;

/// Human-readable console summary.
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn report(&self, delta: &SizeDelta) {
        println!("\n=== Measurement Complete ===");
        println!(
            "  Baseline: {} ({} bytes)",
            delta.baseline.display, delta.baseline.bytes
        );
        println!(
            "  Updated:  {} ({} bytes)",
            delta.updated.display, delta.updated.bytes
        );
        println!("  Delta:    {}", delta.display);
    }
}

/// Machine-readable JSON document on stdout.
pub struct JsonReporter;

impl Reporter for JsonReporter {
    fn report(&self, delta: &SizeDelta) {
        match serde_json::to_string_pretty(delta) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("[WARN] Failed to serialize result: {}", e),
        }
    }
}
