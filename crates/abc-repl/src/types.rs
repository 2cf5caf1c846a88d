use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Errors that can occur while driving an ABC session.
#[derive(Debug, thiserror::Error)]
pub enum AbcError {
    /// The engine executable could not be started.
    #[error("Failed to spawn ABC: {0}")]
    Spawn(#[source] std::io::Error),

    /// ABC closed its output stream unexpectedly.
    #[error("ABC process exited unexpectedly")]
    ProcessDied,

    /// ABC did not exit within the bounded wait on quit.
    #[error("ABC did not exit within {0}s")]
    Timeout(u64),

    /// The external netlist helper failed to run or exited non-zero.
    #[error("Stats helper failed: {0}")]
    Helper(String),

    /// A response line or block did not match its expected pattern.
    ///
    /// Usually means engine version drift or a desynchronized session.
    #[error("Unexpected {what} output: {raw:?}")]
    Parse {
        /// Which pattern was being matched.
        what: &'static str,
        /// The offending text, after prompt stripping.
        raw: String,
    },

    /// The session hit an earlier error and its read position is unknown.
    #[error("Session is desynchronized after an earlier error; recreate it")]
    Desynchronized,

    /// The session has already been quit.
    #[error("Session already terminated")]
    SessionClosed,

    /// Internal protocol invariant broken (wrong report kind for an operation).
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// IO error from process communication.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AbcError {
    pub(crate) fn parse(what: &'static str, raw: impl Into<String>) -> Self {
        AbcError::Parse {
            what,
            raw: raw.into(),
        }
    }
}

/// Raw node/edge/NOT counts reported by the external netlist helper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetlistCounts {
    pub total_nodes: u64,
    pub total_edges: u64,
    pub not_gates: u64,
}

/// Snapshot of `print_stats` at one point of the pipeline.
///
/// `edges`, `area` and `delay` are only reported by the mapped protocol
/// version; the legacy AIG-only line carries none of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitStats {
    pub inputs: u64,
    pub outputs: u64,
    pub latches: u64,
    pub ands: u64,
    pub edges: Option<u64>,
    pub levels: u64,
    pub area: Option<f64>,
    pub delay: Option<f64>,
    /// Present when an external helper was consulted for this snapshot.
    pub netlist: Option<NetlistCounts>,
}

/// Statistics printed by `rewrite -v`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewriteReport {
    pub total_cut_tries: u64,
    pub bad_cuts: u64,
    pub total_subgraphs: u64,
    pub used_npn_classes: u64,
    pub nodes_considered: u64,
    pub nodes_rewritten: u64,
    /// Raw node-count gain. ABC reports a negative value for zero-cost moves that grow the AIG.
    pub gain: i64,
    pub gain_percent: f64,
    /// Total time in seconds (the `TOTAL` row).
    pub total_time_secs: f64,
}

/// Verdict of `cec`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquivalenceResult {
    pub equivalent: bool,
    pub time_secs: f64,
}

/// Option switches shared by `rewrite`, `resub` and `refactor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandFlags {
    /// Keep the number of logic levels (`-l` is emitted when this is false).
    pub preserve_levels: bool,
    /// Accept zero-gain replacements (`-z`).
    pub zero_cost: bool,
    /// Print the statistics block (`-v`). Only honoured by `rewrite`.
    pub verbose: bool,
}

impl Default for CommandFlags {
    fn default() -> Self {
        Self {
            preserve_levels: true,
            zero_cost: false,
            verbose: false,
        }
    }
}

impl CommandFlags {
    /// Short-flag suffix for this set of switches.
    ///
    /// Empty when nothing is set, otherwise `-` followed by the letters
    /// `l`, `z`, `v` in that order. `v` is only considered when the command
    /// supports verbose output.
    pub fn suffix(&self, allow_verbose: bool) -> String {
        let mut letters = String::new();
        if !self.preserve_levels {
            letters.push('l');
        }
        if self.zero_cost {
            letters.push('z');
        }
        if allow_verbose && self.verbose {
            letters.push('v');
        }

        if letters.is_empty() {
            letters
        } else {
            format!("-{letters}")
        }
    }
}

/// Result of a session operation.
///
/// `stats` is filled in when the session runs in training mode (and always
/// for an explicit stats read).
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<R> {
    pub report: R,
    pub stats: Option<CircuitStats>,
}

impl<R> Outcome<R> {
    pub fn map<T>(self, f: impl FnOnce(R) -> T) -> Outcome<T> {
        Outcome {
            report: f(self.report),
            stats: self.stats,
        }
    }
}

/// Shape of the engine's stats output and the follow-up commands it needs.
///
/// `Mapped` re-derives the AIG (`strash`) before each transformation and
/// technology-maps (`map`) before printing stats, so the line carries
/// edge/area/delay. `Legacy` prints the plain AIG line after each command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolVersion {
    #[default]
    Mapped,
    Legacy,
}

/// External program that turns a netlist file into [`NetlistCounts`].
///
/// Invoked as `program [args...] <netlist>`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HelperCommand {
    pub program: PathBuf,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Configuration for one ABC session.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Path to the ABC executable.
    pub executable: PathBuf,

    /// Extra arguments passed to ABC on startup.
    #[serde(default)]
    pub args: Vec<String>,

    /// Working directory for the engine (history and relative paths resolve here).
    #[serde(default)]
    pub working_dir: Option<PathBuf>,

    /// History file ABC leaves behind; removed at session start and end.
    #[serde(default = "default_history_file")]
    pub history_file: PathBuf,

    /// Number of banner lines ABC prints before its first real response.
    #[serde(default = "default_banner_lines")]
    pub banner_lines: usize,

    /// Attach a stats snapshot to every mutating operation.
    #[serde(default = "default_training")]
    pub training: bool,

    #[serde(default)]
    pub protocol: ProtocolVersion,

    /// Bounded wait for process exit on quit.
    #[serde(default = "default_quit_timeout")]
    pub quit_timeout_secs: u64,

    /// Upper bound on lines consumed by a multi-line block or a forward scan.
    #[serde(default = "default_max_block_lines")]
    pub max_block_lines: usize,

    /// Optional helper consulted on every stats snapshot.
    #[serde(default)]
    pub stats_helper: Option<HelperCommand>,
}

impl SessionConfig {
    /// Config for `executable` with every other field at its default.
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            args: Vec::new(),
            working_dir: None,
            history_file: default_history_file(),
            banner_lines: default_banner_lines(),
            training: default_training(),
            protocol: ProtocolVersion::default(),
            quit_timeout_secs: default_quit_timeout(),
            max_block_lines: default_max_block_lines(),
            stats_helper: None,
        }
    }

    /// Create a `SessionConfig` using an auto-discovered ABC executable.
    ///
    /// Returns `None` if [`discover_abc()`] finds nothing.
    pub fn discover() -> Option<Self> {
        discover_abc().map(Self::new)
    }

    /// Location of the history artifact, resolved against the working directory.
    pub fn history_path(&self) -> PathBuf {
        match &self.working_dir {
            Some(dir) if self.history_file.is_relative() => dir.join(&self.history_file),
            _ => self.history_file.clone(),
        }
    }
}

/// Auto-discover the ABC executable.
///
/// Discovery chain (first match wins):
/// 1. `ABC_EXECUTABLE` environment variable
/// 2. `abc` on `PATH`
pub fn discover_abc() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("ABC_EXECUTABLE") {
        let p = PathBuf::from(path);
        if p.is_file() {
            return Some(p);
        }
        tracing::warn!(
            "ABC_EXECUTABLE={} set but no file exists there",
            p.display()
        );
    }

    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join("abc"))
        .find(|candidate| candidate.is_file())
}

fn default_history_file() -> PathBuf {
    PathBuf::from("abc.history")
}
fn default_banner_lines() -> usize {
    3
}
fn default_training() -> bool {
    true
}
fn default_quit_timeout() -> u64 {
    5
}
fn default_max_block_lines() -> usize {
    256
}
