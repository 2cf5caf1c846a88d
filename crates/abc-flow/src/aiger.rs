//! Netlist counting for AIGER files.
//!
//! Reads both the ASCII (`aag`) and binary (`aig`) dialects and reports the
//! three counts the session's stats helper expects: total nodes, total edges
//! and complemented edges (NOT gates).

use std::path::Path;

use abc_repl::NetlistCounts;
use anyhow::{anyhow, bail, Context};

/// Section sizes and complemented-edge count of one AIGER file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AigerSummary {
    pub max_var: u64,
    pub inputs: u64,
    pub latches: u64,
    pub outputs: u64,
    pub ands: u64,
    /// Odd literals among AND fanins, outputs and latch next-states.
    pub not_gates: u64,
}

impl AigerSummary {
    /// Inputs, latches and AND gates.
    pub fn total_nodes(&self) -> u64 {
        self.inputs + self.latches + self.ands
    }

    /// Two fanins per AND, one driver per output and per latch.
    pub fn total_edges(&self) -> u64 {
        2 * self.ands + self.outputs + self.latches
    }

    pub fn counts(&self) -> NetlistCounts {
        NetlistCounts {
            total_nodes: self.total_nodes(),
            total_edges: self.total_edges(),
            not_gates: self.not_gates,
        }
    }
}

/// Read and summarize the AIGER file at `path`.
pub fn summarize_file(path: &Path) -> anyhow::Result<AigerSummary> {
    let data =
        std::fs::read(path).with_context(|| format!("reading AIGER file {}", path.display()))?;
    summarize(&data).with_context(|| format!("parsing AIGER file {}", path.display()))
}

/// Summarize an in-memory AIGER file, dispatching on the header magic.
pub fn summarize(data: &[u8]) -> anyhow::Result<AigerSummary> {
    let mut cursor = Cursor::new(data);
    let header = Header::parse(cursor.line()?)?;

    let mut summary = AigerSummary {
        max_var: header.max_var,
        inputs: header.inputs,
        latches: header.latches,
        outputs: header.outputs,
        ands: header.ands,
        not_gates: 0,
    };

    if header.binary {
        if header.max_var != header.vars {
            bail!(
                "binary header requires M = I + L + A, got {} != {} + {} + {}",
                header.max_var,
                header.inputs,
                header.latches,
                header.ands
            );
        }
    } else {
        for _ in 0..header.inputs {
            let lit = single_literal(cursor.line()?, "input")?;
            check_literal(lit, header.max_var)?;
        }
    }

    for _ in 0..header.latches {
        let fields = literals(cursor.line()?)?;
        // ASCII latches lead with their own literal.
        let next = match (header.binary, fields.as_slice()) {
            (true, [next, ..]) => *next,
            (false, [_, next, ..]) => *next,
            _ => bail!("malformed latch line"),
        };
        check_literal(next, header.max_var)?;
        summary.not_gates += next & 1;
    }

    for _ in 0..header.outputs {
        let lit = single_literal(cursor.line()?, "output")?;
        check_literal(lit, header.max_var)?;
        summary.not_gates += lit & 1;
    }

    // Bad-state and invariant-constraint literals are read but not counted.
    for _ in 0..header.properties {
        single_literal(cursor.line()?, "property")?;
    }

    if header.binary {
        for i in 0..header.ands {
            // I + L + 1 + i <= M, so the literal fits.
            let lhs = 2 * (header.inputs + header.latches + 1 + i);
            let delta0 = cursor.varint()?;
            if delta0 == 0 || delta0 > lhs {
                bail!("AND {lhs}: invalid first delta {delta0}");
            }
            let rhs0 = lhs - delta0;
            let delta1 = cursor.varint()?;
            if delta1 > rhs0 {
                bail!("AND {lhs}: invalid second delta {delta1}");
            }
            let rhs1 = rhs0 - delta1;
            summary.not_gates += (rhs0 & 1) + (rhs1 & 1);
        }
    } else {
        for _ in 0..header.ands {
            match literals(cursor.line()?)?.as_slice() {
                [lhs, rhs0, rhs1] => {
                    for lit in [*lhs, *rhs0, *rhs1] {
                        check_literal(lit, header.max_var)?;
                    }
                    summary.not_gates += (rhs0 & 1) + (rhs1 & 1);
                }
                _ => bail!("malformed AND line"),
            }
        }
    }

    Ok(summary)
}

struct Header {
    binary: bool,
    max_var: u64,
    inputs: u64,
    latches: u64,
    outputs: u64,
    ands: u64,
    /// I + L + A.
    vars: u64,
    /// Bad-state plus invariant-constraint literals.
    properties: u64,
}

impl Header {
    fn parse(line: &str) -> anyhow::Result<Self> {
        let mut parts = line.split_whitespace();
        let binary = match parts.next() {
            Some("aig") => true,
            Some("aag") => false,
            other => bail!("not an AIGER header: {other:?}"),
        };
        let fields = parts
            .map(|p| p.parse::<u64>())
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("bad header field in {line:?}"))?;
        if !(5..=9).contains(&fields.len()) {
            bail!("header needs 5 to 9 counts, got {}", fields.len());
        }
        let extra = |i: usize| fields.get(i).copied().unwrap_or(0);
        if extra(7) != 0 || extra(8) != 0 {
            bail!("justice and fairness sections are not supported");
        }

        let max_var = fields[0];
        let vars = fields[1]
            .checked_add(fields[2])
            .and_then(|n| n.checked_add(fields[4]))
            .ok_or_else(|| anyhow!("header counts overflow in {line:?}"))?;
        if vars > max_var {
            bail!("I + L + A = {vars} exceeds maximum variable {max_var}");
        }
        // Every literal up to 2M + 1 must be representable.
        if max_var.checked_mul(2).and_then(|n| n.checked_add(1)).is_none() {
            bail!("maximum variable {max_var} is too large");
        }
        let properties = extra(5)
            .checked_add(extra(6))
            .ok_or_else(|| anyhow!("property counts overflow in {line:?}"))?;

        Ok(Self {
            binary,
            max_var,
            inputs: fields[1],
            latches: fields[2],
            outputs: fields[3],
            ands: fields[4],
            vars,
            properties,
        })
    }
}

fn literals(line: &str) -> anyhow::Result<Vec<u64>> {
    line.split_whitespace()
        .map(|p| p.parse::<u64>())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("bad literal in {line:?}"))
}

fn single_literal(line: &str, what: &str) -> anyhow::Result<u64> {
    match literals(line)?.as_slice() {
        [lit] => Ok(*lit),
        _ => bail!("expected one {what} literal, got {line:?}"),
    }
}

fn check_literal(lit: u64, max_var: u64) -> anyhow::Result<()> {
    if lit / 2 > max_var {
        bail!("literal {lit} exceeds maximum variable {max_var}");
    }
    Ok(())
}

/// Byte cursor over a mixed text/binary AIGER payload.
struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn line(&mut self) -> anyhow::Result<&'a str> {
        let rest = &self.data[self.pos..];
        let Some(end) = rest.iter().position(|&b| b == b'\n') else {
            bail!("unexpected end of file at byte {}", self.pos);
        };
        self.pos += end + 1;
        let line = std::str::from_utf8(&rest[..end]).context("non-UTF-8 text line")?;
        Ok(line.trim_end_matches('\r'))
    }

    /// Unsigned LEB128: seven bits per byte, high bit set on all but the last.
    fn varint(&mut self) -> anyhow::Result<u64> {
        let mut value = 0u64;
        let mut shift = 0u32;
        loop {
            let Some(&byte) = self.data.get(self.pos) else {
                bail!("truncated AND section at byte {}", self.pos);
            };
            self.pos += 1;
            if shift > 63 {
                bail!("delta overflows 64 bits at byte {}", self.pos);
            }
            value |= u64::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
        }
    }
}
