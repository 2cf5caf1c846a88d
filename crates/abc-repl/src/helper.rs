use std::path::Path;

use tempfile::NamedTempFile;
use tokio::process::Command;

use crate::parser::parse_helper_output;
use crate::types::{AbcError, HelperCommand, NetlistCounts};

/// Runs the external netlist-counting program on a scratch netlist.
#[derive(Debug, Clone)]
pub struct StatsHelper {
    command: HelperCommand,
}

impl StatsHelper {
    pub fn new(command: HelperCommand) -> Self {
        Self { command }
    }

    /// Create an empty scratch file for ABC to write the current network into.
    ///
    /// The file is deleted when the returned handle is dropped.
    pub fn scratch_netlist(&self) -> Result<NamedTempFile, AbcError> {
        Ok(tempfile::Builder::new()
            .prefix("abc-stats-")
            .suffix(".aig")
            .tempfile()?)
    }

    /// Run the helper on `netlist` and parse its three counts.
    pub async fn count(&self, netlist: &Path) -> Result<NetlistCounts, AbcError> {
        let output = Command::new(&self.command.program)
            .args(&self.command.args)
            .arg(netlist)
            .stdin(std::process::Stdio::null())
            .output()
            .await
            .map_err(|e| {
                AbcError::Helper(format!(
                    "could not run {}: {e}",
                    self.command.program.display()
                ))
            })?;

        if !output.status.success() {
            return Err(AbcError::Helper(format!(
                "{} exited with {}: {}",
                self.command.program.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let counts = parse_helper_output(&stdout)?;
        tracing::debug!(
            netlist = %netlist.display(),
            total_nodes = counts.total_nodes,
            total_edges = counts.total_edges,
            not_gates = counts.not_gates,
            "Stats helper finished"
        );
        Ok(counts)
    }
}
