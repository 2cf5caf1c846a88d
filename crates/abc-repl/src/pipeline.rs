use std::path::{Path, PathBuf};

use crate::types::{CommandFlags, ProtocolVersion};

/// A high-level operation against an ABC session.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// `read <path>`
    ReadCircuit { path: PathBuf },
    /// `read_lib -v <primary> <secondary>`, then map and print stats.
    ReadLibraries { primary: PathBuf, secondary: PathBuf },
    Balance,
    Rewrite(CommandFlags),
    Resub(CommandFlags),
    Refactor(CommandFlags),
    /// `cec` against the originally loaded network.
    Equivalence,
    /// Non-mutating stats snapshot.
    PrintStats,
    /// `write <path>`
    WriteNetlist { path: PathBuf },
    Quit,
}

impl Operation {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::ReadCircuit { .. } => "read",
            Operation::ReadLibraries { .. } => "read_lib",
            Operation::Balance => "balance",
            Operation::Rewrite(_) => "rewrite",
            Operation::Resub(_) => "resub",
            Operation::Refactor(_) => "refactor",
            Operation::Equivalence => "cec",
            Operation::PrintStats => "print_stats",
            Operation::WriteNetlist { .. } => "write",
            Operation::Quit => "quit",
        }
    }
}

/// What the session must read before the stats line (if any).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    /// The operation itself prints nothing.
    Nothing,
    /// A `rewrite -v` block terminated by a blank line.
    RewriteBlock,
    /// One `Networks are ...` line.
    Equivalence,
}

/// How the stats line at the end of the plan is located.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsRead {
    /// No `print_stats` is written.
    Skip,
    /// The next line is the stats line.
    Line,
    /// Scan forward past a variable-length report (e.g. `read_lib -v`).
    Scan,
}

/// Exact command sequence for one operation, plus what to read back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPlan {
    pub commands: Vec<String>,
    pub expect: Expect,
    pub stats: StatsRead,
    /// Shape of the stats line the plan ends with.
    pub stats_version: ProtocolVersion,
}

/// Builds command sequences for a given protocol version.
#[derive(Debug, Clone, Copy)]
pub struct CommandPipeline {
    version: ProtocolVersion,
}

impl CommandPipeline {
    pub fn new(version: ProtocolVersion) -> Self {
        Self { version }
    }

    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    /// Whether the operation writes `print_stats` as part of its own sequence.
    pub fn has_builtin_refresh(op: &Operation) -> bool {
        matches!(
            op,
            Operation::ReadLibraries { .. } | Operation::Rewrite(_) | Operation::Equivalence
        )
    }

    /// Whether running `op` ends with a stats line that must be read.
    pub fn reads_stats(&self, op: &Operation, training: bool) -> bool {
        match op {
            Operation::PrintStats => true,
            Operation::Balance | Operation::Resub(_) | Operation::Refactor(_) => training,
            op => Self::has_builtin_refresh(op),
        }
    }

    /// Recompute-then-print sequence.
    ///
    /// With `netlist`, the network is written there before `print_stats`, so
    /// the stats line only arrives once the file is complete.
    pub fn refresh_commands(&self, netlist: Option<&Path>) -> Vec<String> {
        let mut commands = Vec::with_capacity(3);
        if self.version == ProtocolVersion::Mapped {
            commands.push("map".to_string());
        }
        if let Some(path) = netlist {
            commands.push(format!("write {}", path.display()));
        }
        commands.push("print_stats".to_string());
        commands
    }

    fn transform(&self, name: &str, flags: &CommandFlags, allow_verbose: bool) -> Vec<String> {
        let suffix = flags.suffix(allow_verbose);
        let command = if suffix.is_empty() {
            name.to_string()
        } else {
            format!("{name} {suffix}")
        };

        match self.version {
            ProtocolVersion::Mapped => vec!["strash".to_string(), command],
            ProtocolVersion::Legacy => vec![command],
        }
    }

    /// Plan for `op`.
    ///
    /// `netlist` is only used when the plan ends with a stats refresh.
    pub fn plan(&self, op: &Operation, training: bool, netlist: Option<&Path>) -> CommandPlan {
        let (mut commands, expect) = match op {
            Operation::ReadCircuit { path } => {
                (vec![format!("read {}", path.display())], Expect::Nothing)
            }
            Operation::ReadLibraries { primary, secondary } => (
                vec![format!(
                    "read_lib -v {} {}",
                    primary.display(),
                    secondary.display()
                )],
                Expect::Nothing,
            ),
            Operation::Balance => (vec!["balance".to_string()], Expect::Nothing),
            Operation::Rewrite(flags) => {
                let expect = if flags.verbose {
                    Expect::RewriteBlock
                } else {
                    Expect::Nothing
                };
                (self.transform("rewrite", flags, true), expect)
            }
            Operation::Resub(flags) => (self.transform("resub", flags, false), Expect::Nothing),
            Operation::Refactor(flags) => {
                (self.transform("refactor", flags, false), Expect::Nothing)
            }
            Operation::Equivalence => (vec!["cec".to_string()], Expect::Equivalence),
            Operation::PrintStats => (Vec::new(), Expect::Nothing),
            Operation::WriteNetlist { path } => {
                (vec![format!("write {}", path.display())], Expect::Nothing)
            }
            Operation::Quit => (vec!["quit".to_string()], Expect::Nothing),
        };

        let mut stats_version = self.version;
        let stats = if !self.reads_stats(op, training) {
            StatsRead::Skip
        } else if let Operation::ReadLibraries { .. } = op {
            // Library loading always technology-maps, so the stats line is the mapped one.
            commands.push("map".to_string());
            stats_version = ProtocolVersion::Mapped;
            if let Some(path) = netlist {
                commands.push(format!("write {}", path.display()));
            }
            commands.push("print_stats".to_string());
            StatsRead::Scan
        } else {
            commands.extend(self.refresh_commands(netlist));
            StatsRead::Line
        };

        CommandPlan {
            commands,
            expect,
            stats,
            stats_version,
        }
    }
}
