use std::path::{Path, PathBuf};

use crate::banner::PromptFilter;
use crate::controller::{LineChannel, SessionController};
use crate::helper::StatsHelper;
use crate::parser::{parse_equivalence_line, parse_rewrite_block, parse_stats_line, BlockReader};
use crate::pipeline::{CommandPipeline, Expect, Operation, StatsRead};
use crate::types::{
    AbcError, CircuitStats, CommandFlags, EquivalenceResult, Outcome, ProtocolVersion,
    RewriteReport, SessionConfig,
};

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Process running, banner not consumed yet.
    BannerPending,
    /// Banner consumed; every later line is a real response.
    Ready,
    /// An operation failed mid-way; the read position is unknown.
    Poisoned,
    /// `quit` was sent and the process has exited.
    Terminated,
}

/// Report produced by [`AbcSession::run_operation`], one variant per kind of output.
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    None,
    Rewrite(Option<RewriteReport>),
    Equivalence(EquivalenceResult),
    Exited(Option<i32>),
}

/// An interactive ABC session.
///
/// Commands and response reads are strictly paired: every operation writes
/// its full command sequence and consumes exactly the lines ABC prints for
/// it. In training mode each mutating operation also returns a fresh
/// [`CircuitStats`] snapshot.
pub struct AbcSession<C: LineChannel = SessionController> {
    channel: C,
    banner: PromptFilter,
    pipeline: CommandPipeline,
    blocks: BlockReader,
    helper: Option<StatsHelper>,
    training: bool,
    poisoned: bool,
    terminated: bool,
}

impl AbcSession<SessionController> {
    /// Spawn ABC and wrap it in a session.
    pub fn spawn(config: &SessionConfig) -> Result<Self, AbcError> {
        let controller = SessionController::spawn(config)?;
        tracing::info!(
            executable = %config.executable.display(),
            training = config.training,
            protocol = ?config.protocol,
            "ABC session started"
        );
        Ok(Self::with_channel(controller, config))
    }
}

impl<C: LineChannel> AbcSession<C> {
    /// Build a session over an already-open channel.
    ///
    /// Only the protocol-level fields of `config` are used.
    pub fn with_channel(channel: C, config: &SessionConfig) -> Self {
        Self {
            channel,
            banner: PromptFilter::new(config.banner_lines),
            pipeline: CommandPipeline::new(config.protocol),
            blocks: BlockReader::new(config.max_block_lines),
            helper: config.stats_helper.clone().map(StatsHelper::new),
            training: config.training,
            poisoned: false,
            terminated: false,
        }
    }

    pub fn state(&self) -> SessionState {
        if self.terminated {
            SessionState::Terminated
        } else if self.poisoned {
            SessionState::Poisoned
        } else if self.banner.is_skipped() {
            SessionState::Ready
        } else {
            SessionState::BannerPending
        }
    }

    pub fn is_training(&self) -> bool {
        self.training
    }

    pub fn set_training(&mut self, training: bool) {
        self.training = training;
    }

    /// The underlying channel.
    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// `read <path>`. Never refreshes stats; call [`print_stats`](Self::print_stats) if needed.
    pub async fn read_circuit(&mut self, path: impl AsRef<Path>) -> Result<(), AbcError> {
        self.run_operation(Operation::ReadCircuit {
            path: path.as_ref().to_path_buf(),
        })
        .await
        .map(|_| ())
    }

    /// Load two cell libraries and technology-map the current network.
    pub async fn read_libraries(
        &mut self,
        primary: impl AsRef<Path>,
        secondary: impl AsRef<Path>,
    ) -> Result<Outcome<()>, AbcError> {
        self.run_operation(Operation::ReadLibraries {
            primary: primary.as_ref().to_path_buf(),
            secondary: secondary.as_ref().to_path_buf(),
        })
        .await
        .map(|o| o.map(|_| ()))
    }

    pub async fn balance(&mut self) -> Result<Outcome<()>, AbcError> {
        self.run_operation(Operation::Balance)
            .await
            .map(|o| o.map(|_| ()))
    }

    /// `rewrite`; the report is `Some` only when `flags.verbose` is set.
    pub async fn rewrite(
        &mut self,
        flags: CommandFlags,
    ) -> Result<Outcome<Option<RewriteReport>>, AbcError> {
        let outcome = self.run_operation(Operation::Rewrite(flags)).await?;
        match outcome.report {
            Report::Rewrite(report) => Ok(Outcome {
                report,
                stats: outcome.stats,
            }),
            other => Err(AbcError::Protocol(format!(
                "Unexpected {other:?} from rewrite"
            ))),
        }
    }

    pub async fn resub(&mut self, flags: CommandFlags) -> Result<Outcome<()>, AbcError> {
        self.run_operation(Operation::Resub(flags))
            .await
            .map(|o| o.map(|_| ()))
    }

    pub async fn refactor(&mut self, flags: CommandFlags) -> Result<Outcome<()>, AbcError> {
        self.run_operation(Operation::Refactor(flags))
            .await
            .map(|o| o.map(|_| ()))
    }

    /// `cec` of the current network against the one originally read.
    pub async fn cec(&mut self) -> Result<Outcome<EquivalenceResult>, AbcError> {
        let outcome = self.run_operation(Operation::Equivalence).await?;
        match outcome.report {
            Report::Equivalence(result) => Ok(Outcome {
                report: result,
                stats: outcome.stats,
            }),
            other => Err(AbcError::Protocol(format!("Unexpected {other:?} from cec"))),
        }
    }

    /// Non-mutating stats snapshot.
    pub async fn print_stats(&mut self) -> Result<CircuitStats, AbcError> {
        self.run_operation(Operation::PrintStats)
            .await?
            .stats
            .ok_or_else(|| AbcError::Protocol("print_stats returned no stats".into()))
    }

    /// `write <path>`.
    pub async fn write_netlist(&mut self, path: impl AsRef<Path>) -> Result<(), AbcError> {
        self.run_operation(Operation::WriteNetlist {
            path: path.as_ref().to_path_buf(),
        })
        .await
        .map(|_| ())
    }

    /// Send `quit`, close the engine's input and wait for it to exit.
    ///
    /// Any further operation fails with [`AbcError::SessionClosed`].
    pub async fn quit(&mut self) -> Result<Option<i32>, AbcError> {
        match self.run_operation(Operation::Quit).await?.report {
            Report::Exited(code) => Ok(code),
            other => Err(AbcError::Protocol(format!("Unexpected {other:?} from quit"))),
        }
    }

    /// Run one operation: write its command plan, read back its report and,
    /// when needed, the stats line that ends the plan.
    ///
    /// In training mode (and always for [`Operation::PrintStats`]) the
    /// outcome carries the snapshot. Stats lines written by a built-in
    /// refresh are read even when the snapshot is discarded.
    pub async fn run_operation(&mut self, op: Operation) -> Result<Outcome<Report>, AbcError> {
        if self.terminated {
            return Err(AbcError::SessionClosed);
        }
        // A poisoned session can still be shut down; nothing is read back for `quit`.
        if self.poisoned && op != Operation::Quit {
            return Err(AbcError::Desynchronized);
        }

        let result = self.execute(&op).await;
        if let Err(e) = &result {
            tracing::warn!(operation = op.name(), error = %e, "ABC operation failed, session poisoned");
            self.poisoned = true;
        }
        result
    }

    async fn execute(&mut self, op: &Operation) -> Result<Outcome<Report>, AbcError> {
        if let Operation::Quit = op {
            return self.execute_quit().await.map(|code| Outcome {
                report: Report::Exited(code),
                stats: None,
            });
        }

        let keep_stats = self.training || matches!(op, Operation::PrintStats);
        let reads_stats = self.pipeline.reads_stats(op, self.training);
        let netlist = match &self.helper {
            Some(helper) if reads_stats && keep_stats => Some(helper.scratch_netlist()?),
            _ => None,
        };
        let netlist_path: Option<PathBuf> = netlist.as_ref().map(|f| f.path().to_path_buf());

        let plan = self
            .pipeline
            .plan(op, self.training, netlist_path.as_deref());
        for command in &plan.commands {
            self.send(command).await?;
        }

        let report = match plan.expect {
            Expect::Nothing => match op {
                Operation::Rewrite(_) => Report::Rewrite(None),
                _ => Report::None,
            },
            Expect::RewriteBlock => {
                let first = self.read_response().await?;
                let block = self.blocks.read_block(&first, &mut self.channel).await?;
                let report = parse_rewrite_block(&block)?;
                tracing::debug!(
                    nodes_rewritten = report.nodes_rewritten,
                    gain = report.gain,
                    "Parsed rewrite statistics"
                );
                Report::Rewrite(Some(report))
            }
            Expect::Equivalence => {
                let line = self.read_response().await?;
                Report::Equivalence(parse_equivalence_line(&line)?)
            }
        };

        let stats = match plan.stats {
            StatsRead::Skip => None,
            StatsRead::Line => {
                let line = self.read_response().await?;
                Some(parse_stats_line(&line, plan.stats_version)?)
            }
            StatsRead::Scan => Some(self.scan_for_stats(plan.stats_version).await?),
        };

        let stats = match (stats, netlist_path) {
            (Some(mut stats), Some(path)) => {
                if let Some(helper) = &self.helper {
                    stats.netlist = Some(helper.count(&path).await?);
                }
                Some(stats)
            }
            (stats, _) => stats,
        };
        drop(netlist);

        if let Some(s) = &stats {
            tracing::debug!(
                operation = op.name(),
                ands = s.ands,
                levels = s.levels,
                "Stats snapshot"
            );
        }

        Ok(Outcome {
            report,
            stats: if keep_stats { stats } else { None },
        })
    }

    /// The channel is closed even if writing `quit` fails, so the process
    /// is always reaped and its history file removed.
    async fn execute_quit(&mut self) -> Result<Option<i32>, AbcError> {
        let sent = self.send("quit").await;
        self.terminated = true;
        let code = self.channel.close().await?;
        sent?;
        tracing::info!(code = ?code, "ABC session terminated");
        Ok(code)
    }

    async fn send(&mut self, command: &str) -> Result<(), AbcError> {
        tracing::debug!(command, "Sending ABC command");
        self.channel.write_line(command).await
    }

    /// Read one response line, skipping the banner on the first read of the session.
    async fn read_response(&mut self) -> Result<String, AbcError> {
        self.banner.ensure_banner_skipped(&mut self.channel).await?;
        let line = self.channel.read_line().await?;
        tracing::trace!(line = %line, "ABC response");
        Ok(line)
    }

    /// Skip a variable-length report until the stats line shows up.
    async fn scan_for_stats(&mut self, version: ProtocolVersion) -> Result<CircuitStats, AbcError> {
        let mut last = String::new();
        for _ in 0..self.blocks.max_lines() {
            let line = self.read_response().await?;
            match parse_stats_line(&line, version) {
                Ok(stats) => return Ok(stats),
                Err(_) => {
                    tracing::debug!(line = %line, "Skipping report line before stats");
                    last = line;
                }
            }
        }
        Err(AbcError::parse("print_stats", last))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::ScriptedChannel;
    use crate::types::{HelperCommand, NetlistCounts};

    const STATS: &str =
        "abc 01> abc 02> i10 : i/o = 10/ 5 lat = 0 and = 42 edge = 84 area = 12.50 delay = 3.30 lev = 7";
    const STATS_AFTER: &str =
        "abc 05> abc 06> i10 : i/o = 10/ 5 lat = 0 and = 40 edge = 80 area = 11.00 delay = 3.10 lev = 6";

    fn config(training: bool) -> SessionConfig {
        let mut config = SessionConfig::new("abc");
        config.training = training;
        config
    }

    fn session(lines: &[&str], training: bool) -> AbcSession<ScriptedChannel> {
        AbcSession::with_channel(ScriptedChannel::with_banner(lines.iter().copied()), &config(training))
    }

    #[tokio::test]
    async fn print_stats_skips_banner_first() {
        let mut s = session(&[STATS], false);
        assert_eq!(s.state(), SessionState::BannerPending);

        let stats = s.print_stats().await.unwrap();
        assert_eq!(stats.ands, 42);
        assert_eq!(stats.levels, 7);
        assert_eq!(s.state(), SessionState::Ready);
        assert_eq!(s.channel().written(), ["map", "print_stats"]);
    }

    #[tokio::test]
    async fn banner_is_skipped_once_across_operations() {
        let eq = "abc 03> Networks are equivalent. Time = 0.42 sec";
        let mut s = session(&[STATS, STATS_AFTER, eq, STATS_AFTER], false);

        s.print_stats().await.unwrap();
        s.balance().await.unwrap();
        let after = s.print_stats().await.unwrap();
        assert_eq!(after.ands, 40);

        let outcome = s.cec().await.unwrap();
        assert!(outcome.report.equivalent);
        assert_eq!(outcome.report.time_secs, 0.42);
        assert!(outcome.stats.is_none());
        assert_eq!(s.channel().remaining(), 0);
    }

    #[tokio::test]
    async fn repeated_stats_reads_are_equal() {
        let mut s = session(&[STATS, STATS], false);
        let first = s.print_stats().await.unwrap();
        let second = s.print_stats().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn training_balance_attaches_stats() {
        let mut s = session(&[STATS_AFTER], true);
        let outcome = s.balance().await.unwrap();
        assert_eq!(outcome.stats.unwrap().levels, 6);
        assert_eq!(s.channel().written(), ["balance", "map", "print_stats"]);
    }

    #[tokio::test]
    async fn non_training_balance_reads_nothing() {
        let mut s = session(&[], false);
        let outcome = s.balance().await.unwrap();
        assert!(outcome.stats.is_none());
        assert_eq!(s.channel().written(), ["balance"]);
        assert_eq!(s.state(), SessionState::BannerPending);
    }

    #[tokio::test]
    async fn non_training_rewrite_still_consumes_stats_line() {
        let mut s = session(&[STATS_AFTER, STATS_AFTER], false);
        let outcome = s
            .rewrite(CommandFlags {
                preserve_levels: false,
                ..CommandFlags::default()
            })
            .await
            .unwrap();
        assert!(outcome.report.is_none());
        assert!(outcome.stats.is_none());

        // The next read sees the next response, not the discarded stats line.
        let stats = s.print_stats().await.unwrap();
        assert_eq!(stats.ands, 40);
        assert_eq!(s.channel().remaining(), 0);
        assert_eq!(
            s.channel().written(),
            ["strash", "rewrite -l", "map", "print_stats", "map", "print_stats"]
        );
    }

    #[tokio::test]
    async fn verbose_rewrite_returns_report_and_stats() {
        let lines = [
            "abc 01> abc 02> Rewriting statistics:",
            "Total cuts tries  =     4021.",
            "Bad cuts found    =        3.",
            "Total subgraphs   =     8800.",
            "Used NPN classes  =       77.",
            "Nodes considered  =      512.",
            "Nodes rewritten   =       25.",
            "Gain              =       31 (   6.05 %)",
            "Start             =     0.00 sec",
            "TOTAL             =     0.02 sec",
            "",
            STATS_AFTER,
        ];
        let mut s = session(&lines, true);
        let outcome = s
            .rewrite(CommandFlags {
                preserve_levels: false,
                zero_cost: true,
                verbose: true,
            })
            .await
            .unwrap();

        let report = outcome.report.expect("verbose rewrite should report");
        assert_eq!(report.total_cut_tries, 4021);
        assert_eq!(report.bad_cuts, 3);
        assert_eq!(report.total_subgraphs, 8800);
        assert_eq!(report.used_npn_classes, 77);
        assert_eq!(report.nodes_considered, 512);
        assert_eq!(report.nodes_rewritten, 25);
        assert_eq!(report.gain, 31);
        assert_eq!(report.gain_percent, 6.05);
        assert_eq!(report.total_time_secs, 0.02);
        assert_eq!(outcome.stats.unwrap().ands, 40);
        assert_eq!(s.channel().written()[1], "rewrite -lzv");
        assert_eq!(s.channel().remaining(), 0);
    }

    #[tokio::test]
    async fn read_libraries_scans_past_report() {
        let lines = [
            "abc 01> Library \"gates\" from \"gates.genlib\" has 24 cells.",
            "Library \"cells\" from \"cells.lib\" has 120 cells.",
            STATS,
        ];
        let mut s = session(&lines, true);
        let outcome = s.read_libraries("gates.genlib", "cells.lib").await.unwrap();
        assert_eq!(outcome.stats.unwrap().edges, Some(84));
        assert_eq!(
            s.channel().written(),
            ["read_lib -v gates.genlib cells.lib", "map", "print_stats"]
        );
    }

    #[tokio::test]
    async fn legacy_read_libraries_parses_mapped_stats() {
        let mut config = config(false);
        config.protocol = ProtocolVersion::Legacy;
        let channel = ScriptedChannel::with_banner([
            "abc 01> Library \"gates\" from \"gates.genlib\" has 24 cells.",
            STATS,
            "abc 04> i10 : i/o = 10/ 5 lat = 0 and = 42 lev = 7",
        ]);
        let mut s = AbcSession::with_channel(channel, &config);

        let outcome = s.read_libraries("gates.genlib", "cells.lib").await.unwrap();
        assert!(outcome.stats.is_none());
        assert_eq!(s.channel().remaining(), 1);

        // The next legacy stats read sees its own line, not a leftover.
        let stats = s.print_stats().await.unwrap();
        assert_eq!(stats.levels, 7);
        assert!(stats.edges.is_none());
    }

    #[tokio::test]
    async fn read_circuit_writes_path_only() {
        let mut s = session(&[], true);
        s.read_circuit("bench/i10.aig").await.unwrap();
        assert_eq!(s.channel().written(), ["read bench/i10.aig"]);
    }

    #[tokio::test]
    async fn write_netlist_reads_nothing() {
        let mut s = session(&[STATS], true);
        s.write_netlist("out/i10_opt.aig").await.unwrap();
        assert_eq!(s.channel().written(), ["write out/i10_opt.aig"]);
        // Banner still pending, stats line untouched.
        assert_eq!(s.channel().remaining(), 4);
    }

    #[tokio::test]
    async fn training_cec_returns_verdict_and_stats() {
        let lines = ["Networks are not equivalent. Time = 1.10 sec", STATS];
        let mut s = session(&lines, true);
        let outcome = s.cec().await.unwrap();
        assert!(!outcome.report.equivalent);
        assert_eq!(outcome.report.time_secs, 1.10);
        assert_eq!(outcome.stats.unwrap().levels, 7);
    }

    #[tokio::test]
    async fn legacy_protocol_reads_plain_stats() {
        let mut config = config(true);
        config.protocol = ProtocolVersion::Legacy;
        let channel =
            ScriptedChannel::with_banner(["abc 01> abc 02> i10 : i/o = 257/ 224 lat = 0 and = 2675 lev = 50"]);
        let mut s = AbcSession::with_channel(channel, &config);

        let outcome = s.resub(CommandFlags::default()).await.unwrap();
        let stats = outcome.stats.unwrap();
        assert_eq!(stats.ands, 2675);
        assert!(stats.area.is_none());
        assert_eq!(s.channel().written(), ["resub", "print_stats"]);
    }

    #[tokio::test]
    async fn parse_failure_poisons_session() {
        let mut s = session(&["abc 01> ** cmd error: unknown command", STATS], false);
        let err = s.print_stats().await.unwrap_err();
        assert!(matches!(err, AbcError::Parse { .. }), "got {err:?}");
        assert_eq!(s.state(), SessionState::Poisoned);

        let err = s.print_stats().await.unwrap_err();
        assert!(matches!(err, AbcError::Desynchronized), "got {err:?}");
    }

    #[tokio::test]
    async fn training_can_be_toggled_between_operations() {
        let mut s = session(&[STATS_AFTER], false);
        assert!(!s.is_training());
        assert!(s.balance().await.unwrap().stats.is_none());

        s.set_training(true);
        assert!(s.is_training());
        let outcome = s.balance().await.unwrap();
        assert_eq!(outcome.stats.unwrap().ands, 40);
        assert_eq!(s.channel().written(), ["balance", "balance", "map", "print_stats"]);
    }

    #[tokio::test]
    async fn quit_passes_through_signal_exit() {
        let mut channel = ScriptedChannel::with_banner(Vec::<String>::new());
        channel.set_exit_code(None);
        let mut s = AbcSession::with_channel(channel, &config(false));
        assert_eq!(s.quit().await.unwrap(), None);
    }

    #[cfg(unix)]
    fn helper_config(training: bool) -> SessionConfig {
        let mut config = config(training);
        // `$1` is the scratch netlist; it must exist while the helper runs.
        config.stats_helper = Some(HelperCommand {
            program: PathBuf::from("sh"),
            args: vec![
                "-c".to_string(),
                "test -f \"$1\" && echo 1 2 3".to_string(),
                "helper".to_string(),
            ],
        });
        config
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn helper_counts_attach_to_training_snapshot() {
        let channel = ScriptedChannel::with_banner([STATS_AFTER]);
        let mut s = AbcSession::with_channel(channel, &helper_config(true));

        let stats = s.balance().await.unwrap().stats.unwrap();
        assert_eq!(
            stats.netlist,
            Some(NetlistCounts {
                total_nodes: 1,
                total_edges: 2,
                not_gates: 3
            })
        );

        let written = s.channel().written();
        assert_eq!(written.len(), 4);
        assert_eq!(written[..2], ["balance", "map"]);
        let scratch = written[2].strip_prefix("write ").unwrap();
        assert!(scratch.contains("abc-stats-") && scratch.ends_with(".aig"), "{scratch}");
        assert_eq!(written[3], "print_stats");
        assert!(!Path::new(scratch).exists(), "scratch netlist should be removed");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn helper_is_skipped_when_snapshot_is_discarded() {
        let channel = ScriptedChannel::with_banner([STATS]);
        let mut s = AbcSession::with_channel(channel, &helper_config(false));

        let outcome = s.rewrite(CommandFlags::default()).await.unwrap();
        assert!(outcome.stats.is_none());
        assert_eq!(s.channel().written(), ["strash", "rewrite", "map", "print_stats"]);
        assert_eq!(s.channel().remaining(), 0);
    }

    #[tokio::test]
    async fn poisoned_session_can_still_quit() {
        let mut s = session(&["abc 01> ** cmd error: unknown command"], false);
        s.print_stats().await.unwrap_err();
        assert!(matches!(s.balance().await, Err(AbcError::Desynchronized)));

        let code = s.quit().await.unwrap();
        assert_eq!(code, Some(0));
        assert_eq!(s.state(), SessionState::Terminated);
        assert!(s.channel().is_closed());
        assert_eq!(s.channel().written().last().map(String::as_str), Some("quit"));
    }

    #[tokio::test]
    async fn quit_terminates_session() {
        let mut s = session(&[], false);
        let code = s.quit().await.unwrap();
        assert_eq!(code, Some(0));
        assert_eq!(s.state(), SessionState::Terminated);
        assert!(s.channel().is_closed());
        assert_eq!(s.channel().written(), ["quit"]);

        let err = s.balance().await.unwrap_err();
        assert!(matches!(err, AbcError::SessionClosed));
    }

    #[tokio::test]
    async fn end_to_end_levels_do_not_increase() {
        let load = "abc 01> abc 02> i10 : i/o = 257/ 224 lat = 0 and = 2396 edge = 4792 area = 1234.00 delay = 41.20 lev = 37";
        let balanced = "abc 04> i10 : i/o = 257/ 224 lat = 0 and = 2380 edge = 4760 area = 1220.00 delay = 38.00 lev = 34";
        let rewritten = "abc 08> i10 : i/o = 257/ 224 lat = 0 and = 2290 edge = 4580 area = 1190.00 delay = 37.10 lev = 33";
        let final_stats = "abc 11> i10 : i/o = 257/ 224 lat = 0 and = 2288 edge = 4576 area = 1188.00 delay = 36.40 lev = 32";
        let mut s = session(&[load, balanced, rewritten, final_stats, final_stats], true);

        s.read_circuit("i10.aig").await.unwrap();
        let initial = s.print_stats().await.unwrap();
        s.balance().await.unwrap();
        s.rewrite(CommandFlags {
            preserve_levels: false,
            zero_cost: true,
            verbose: false,
        })
        .await
        .unwrap();
        let last = s.balance().await.unwrap().stats.unwrap();
        let read_back = s.print_stats().await.unwrap();

        assert!(last.levels <= initial.levels);
        assert_eq!(last, read_back);
        s.quit().await.unwrap();
    }
}
