//! Result types for flow runs.

use std::path::Path;

use abc_repl::{CircuitStats, EquivalenceResult, RewriteReport};
use anyhow::Context;
use serde::Serialize;

/// Everything observed while running a flow over one circuit.
#[derive(Debug, Clone, Serialize)]
pub struct FlowReport {
    /// Circuit file that was loaded.
    pub circuit: String,
    /// Whether stats were refreshed after every transformation.
    pub training: bool,
    /// Per-step results, in execution order.
    pub steps: Vec<StepRecord>,
    /// Exit code reported by ABC after `quit`.
    pub exit_code: Option<i32>,
    /// Wall-clock time for the whole flow in seconds.
    pub elapsed_secs: f64,
}

/// Result for a single flow step.
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    /// Position in the flow, starting at 0.
    pub index: usize,
    /// Step label, e.g. `rewrite -lz`.
    pub step: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<CircuitStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rewrite: Option<RewriteReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equivalence: Option<EquivalenceResult>,
    /// Wall-clock time for this step in milliseconds.
    pub time_ms: u64,
}

impl FlowReport {
    /// First and last stats snapshots recorded by the flow.
    pub fn stats_bounds(&self) -> Option<(&CircuitStats, &CircuitStats)> {
        let mut snapshots = self.steps.iter().filter_map(|s| s.stats.as_ref());
        let first = snapshots.next()?;
        let last = snapshots.last().unwrap_or(first);
        Some((first, last))
    }

    /// True if every `cec` step in the flow reported equivalence.
    pub fn all_equivalent(&self) -> bool {
        self.steps
            .iter()
            .filter_map(|s| s.equivalence.as_ref())
            .all(|e| e.equivalent)
    }

    /// Write the report as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("writing flow report {}", path.display()))?;
        tracing::info!(path = %path.display(), steps = self.steps.len(), "Wrote flow report");
        Ok(())
    }
}
