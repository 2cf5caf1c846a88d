//! Fixed textual patterns for ABC console output.
//!
//! Every response shape is a named regex with named capture groups, tested
//! against literal fixtures. A mismatch is always a hard [`AbcError::Parse`]
//! carrying the offending text.

use std::str::FromStr;
use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::controller::LineChannel;
use crate::types::{
    AbcError, CircuitStats, EquivalenceResult, NetlistCounts, ProtocolVersion, RewriteReport,
};

const PROMPT_PATTERN: &str = r"^(?:abc\s+\d+>\s?)+";

const MAPPED_STATS_PATTERN: &str = r"^.*?i/o\s*=\s*(?P<inputs>\d+)\s*/\s*(?P<outputs>\d+)\s+lat\s*=\s*(?P<latches>\d+)\s+and\s*=\s*(?P<ands>\d+)\s+edge\s*=\s*(?P<edges>\d+)\s+area\s*=\s*(?P<area>\d+(?:\.\d+)?)\s+delay\s*=\s*(?P<delay>\d+(?:\.\d+)?)\s+lev\s*=\s*(?P<levels>\d+)\s*$";

const LEGACY_STATS_PATTERN: &str = r"^.*?i/o\s*=\s*(?P<inputs>\d+)\s*/\s*(?P<outputs>\d+)\s+lat\s*=\s*(?P<latches>\d+)\s+and\s*=\s*(?P<ands>\d+)\s+lev\s*=\s*(?P<levels>\d+)\s*$";

const EQUIVALENCE_PATTERN: &str =
    r"^Networks\s+are\s+(?P<verdict>.+?)\.\s*Time\s*=\s*(?P<time>\d+(?:\.\d+)?)\s*sec\s*$";

// `(?s)` lets the lazy gaps run across the block's line breaks.
const REWRITE_PATTERN: &str = concat!(
    r"(?s)^\s*Rewriting\s+statistics:",
    r".*?Total\s+cuts\s+tries\s*=\s*(?P<cut_tries>\d+)",
    r".*?Bad\s+cuts\s+found\s*=\s*(?P<bad_cuts>\d+)",
    r".*?Total\s+subgraphs\s*=\s*(?P<subgraphs>\d+)",
    r".*?Used\s+NPN\s+classes\s*=\s*(?P<npn_classes>\d+)",
    r".*?Nodes\s+considered\s*=\s*(?P<considered>\d+)",
    r".*?Nodes\s+rewritten\s*=\s*(?P<rewritten>\d+)",
    r".*?Gain\s*=\s*(?P<gain>-?\d+)\s*\(\s*(?P<gain_percent>-?\d+(?:\.\d+)?)\s*%\s*\)",
    r".*?TOTAL\s*=\s*(?P<total_time>\d+(?:\.\d+)?)",
);

fn compiled(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("valid ABC output pattern"))
}

fn prompt_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(&RE, PROMPT_PATTERN)
}

fn stats_re(version: ProtocolVersion) -> &'static Regex {
    static MAPPED: OnceLock<Regex> = OnceLock::new();
    static LEGACY: OnceLock<Regex> = OnceLock::new();
    match version {
        ProtocolVersion::Mapped => compiled(&MAPPED, MAPPED_STATS_PATTERN),
        ProtocolVersion::Legacy => compiled(&LEGACY, LEGACY_STATS_PATTERN),
    }
}

fn equivalence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(&RE, EQUIVALENCE_PATTERN)
}

fn rewrite_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(&RE, REWRITE_PATTERN)
}

/// Remove any number of repeated `abc NN> ` prompt echoes from the front of a line.
///
/// Commands that print nothing still emit a prompt without a newline, so
/// prompts pile up in front of the next real output line.
pub fn strip_prompt(line: &str) -> &str {
    match prompt_re().find(line) {
        Some(m) => &line[m.end()..],
        None => line,
    }
}

fn field<T: FromStr>(
    caps: &Captures<'_>,
    name: &str,
    what: &'static str,
    raw: &str,
) -> Result<T, AbcError> {
    caps.name(name)
        .and_then(|m| m.as_str().parse().ok())
        .ok_or_else(|| AbcError::parse(what, raw))
}

/// Parse one `print_stats` line in the shape selected by `version`.
pub fn parse_stats_line(line: &str, version: ProtocolVersion) -> Result<CircuitStats, AbcError> {
    const WHAT: &str = "print_stats";
    let text = strip_prompt(line.trim());
    let caps = stats_re(version)
        .captures(text)
        .ok_or_else(|| AbcError::parse(WHAT, text))?;

    let (edges, area, delay) = match version {
        ProtocolVersion::Mapped => (
            Some(field(&caps, "edges", WHAT, text)?),
            Some(field(&caps, "area", WHAT, text)?),
            Some(field(&caps, "delay", WHAT, text)?),
        ),
        ProtocolVersion::Legacy => (None, None, None),
    };

    Ok(CircuitStats {
        inputs: field(&caps, "inputs", WHAT, text)?,
        outputs: field(&caps, "outputs", WHAT, text)?,
        latches: field(&caps, "latches", WHAT, text)?,
        ands: field(&caps, "ands", WHAT, text)?,
        edges,
        levels: field(&caps, "levels", WHAT, text)?,
        area,
        delay,
        netlist: None,
    })
}

/// Parse the `Networks are <verdict>. Time = <t> sec` line printed by `cec`.
///
/// Only the verdict `equivalent` counts as equivalent.
pub fn parse_equivalence_line(line: &str) -> Result<EquivalenceResult, AbcError> {
    const WHAT: &str = "cec";
    let text = strip_prompt(line.trim());
    let caps = equivalence_re()
        .captures(text)
        .ok_or_else(|| AbcError::parse(WHAT, text))?;

    Ok(EquivalenceResult {
        equivalent: &caps["verdict"] == "equivalent",
        time_secs: field(&caps, "time", WHAT, text)?,
    })
}

/// Parse the accumulated `rewrite -v` statistics block.
pub fn parse_rewrite_block(block: &str) -> Result<RewriteReport, AbcError> {
    const WHAT: &str = "rewrite -v";
    let caps = rewrite_re()
        .captures(block)
        .ok_or_else(|| AbcError::parse(WHAT, block))?;

    Ok(RewriteReport {
        total_cut_tries: field(&caps, "cut_tries", WHAT, block)?,
        bad_cuts: field(&caps, "bad_cuts", WHAT, block)?,
        total_subgraphs: field(&caps, "subgraphs", WHAT, block)?,
        used_npn_classes: field(&caps, "npn_classes", WHAT, block)?,
        nodes_considered: field(&caps, "considered", WHAT, block)?,
        nodes_rewritten: field(&caps, "rewritten", WHAT, block)?,
        gain: field(&caps, "gain", WHAT, block)?,
        gain_percent: field(&caps, "gain_percent", WHAT, block)?,
        total_time_secs: field(&caps, "total_time", WHAT, block)?,
    })
}

/// Parse the helper's stdout: exactly three whitespace-separated integers.
pub fn parse_helper_output(output: &str) -> Result<NetlistCounts, AbcError> {
    const WHAT: &str = "stats helper";
    let numbers = output
        .split_whitespace()
        .map(str::parse::<u64>)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| AbcError::parse(WHAT, output.trim()))?;

    match numbers.as_slice() {
        [total_nodes, total_edges, not_gates] => Ok(NetlistCounts {
            total_nodes: *total_nodes,
            total_edges: *total_edges,
            not_gates: *not_gates,
        }),
        _ => Err(AbcError::parse(WHAT, output.trim())),
    }
}

/// Reads a multi-line block terminated by a blank line.
///
/// The terminator is consumed but not included, so the next read starts at
/// the following response.
#[derive(Debug, Clone, Copy)]
pub struct BlockReader {
    max_lines: usize,
}

impl BlockReader {
    pub fn new(max_lines: usize) -> Self {
        Self { max_lines }
    }

    pub fn max_lines(&self) -> usize {
        self.max_lines
    }

    /// Accumulate `first` plus continuation lines from `channel` up to the blank sentinel.
    ///
    /// `first` is prompt-stripped; continuation lines are kept verbatim.
    pub async fn read_block<C>(&self, first: &str, channel: &mut C) -> Result<String, AbcError>
    where
        C: LineChannel + ?Sized,
    {
        let mut block = strip_prompt(first.trim()).to_string();
        if block.is_empty() {
            return Ok(block);
        }

        for _ in 0..self.max_lines {
            let line = channel.read_line().await?;
            if line.trim().is_empty() {
                return Ok(block);
            }
            block.push('\n');
            block.push_str(&line);
        }

        Err(AbcError::parse("unterminated block", block))
    }
}
