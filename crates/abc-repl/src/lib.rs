//! Async client for an interactive ABC logic-synthesis session.
//!
//! ABC is driven over its console: one command per line on stdin, free-form
//! text on stdout. This crate keeps writes and reads strictly paired, strips
//! the startup banner and prompt echoes, and parses the console output into
//! typed records ([`CircuitStats`], [`RewriteReport`], [`EquivalenceResult`]).
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use abc_repl::{AbcSession, CommandFlags, SessionConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SessionConfig::discover().expect("ABC not found; set ABC_EXECUTABLE");
//! let mut session = AbcSession::spawn(&config)?;
//!
//! session.read_circuit("i10.aig").await?;
//! let before = session.print_stats().await?;
//!
//! let flags = CommandFlags { preserve_levels: false, zero_cost: true, verbose: true };
//! let outcome = session.rewrite(flags).await?;
//! println!("{before:?} -> {:?} ({:?})", outcome.stats, outcome.report);
//!
//! session.quit().await?;
//! # Ok(())
//! # }
//! ```

pub mod banner;
pub mod controller;
pub mod helper;
pub mod mocks;
pub mod parser;
pub mod pipeline;
pub mod session;
pub mod types;

pub use banner::PromptFilter;
pub use controller::{LineChannel, SessionController};
pub use helper::StatsHelper;
pub use parser::BlockReader;
pub use pipeline::{CommandPipeline, CommandPlan, Operation};
pub use session::{AbcSession, Report, SessionState};
pub use types::{
    discover_abc, AbcError, CircuitStats, CommandFlags, EquivalenceResult, HelperCommand,
    NetlistCounts, Outcome, ProtocolVersion, RewriteReport, SessionConfig,
};
