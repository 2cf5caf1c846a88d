//! Scripted [`LineChannel`] for testing sessions without an ABC binary.

use std::collections::VecDeque;

use async_trait::async_trait;

use crate::controller::LineChannel;
use crate::types::AbcError;

/// Replays canned output lines and records every command written.
///
/// Reading past the end of the script behaves like the engine closing its
/// output (`AbcError::ProcessDied`).
#[derive(Debug, Default)]
pub struct ScriptedChannel {
    output: VecDeque<String>,
    written: Vec<String>,
    closed: bool,
    exit_code: Option<i32>,
}

impl ScriptedChannel {
    /// Create a channel that will return `lines` in order.
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            output: lines.into_iter().map(Into::into).collect(),
            written: Vec::new(),
            closed: false,
            exit_code: Some(0),
        }
    }

    /// A channel preceded by ABC's usual three banner lines.
    pub fn with_banner<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let banner = [
            "UC Berkeley, ABC 1.01 (compiled Jan  1 2024 00:00:00)".to_string(),
            String::new(),
            String::new(),
        ];
        Self::new(banner.into_iter().chain(lines.into_iter().map(Into::into)))
    }

    /// Append more output lines to the script.
    pub fn push_lines<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output.extend(lines.into_iter().map(Into::into));
    }

    /// Exit code reported by `close()`.
    pub fn set_exit_code(&mut self, code: Option<i32>) {
        self.exit_code = code;
    }

    /// Every command written so far, newline stripped.
    pub fn written(&self) -> &[String] {
        &self.written
    }

    /// Number of output lines not yet read.
    pub fn remaining(&self) -> usize {
        self.output.len()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

#[async_trait]
impl LineChannel for ScriptedChannel {
    async fn write_line(&mut self, line: &str) -> Result<(), AbcError> {
        if self.closed {
            return Err(AbcError::SessionClosed);
        }
        self.written.push(line.trim().to_string());
        Ok(())
    }

    async fn read_line(&mut self) -> Result<String, AbcError> {
        self.output
            .pop_front()
            .map(|line| line.trim_end().to_string())
            .ok_or(AbcError::ProcessDied)
    }

    async fn close(&mut self) -> Result<Option<i32>, AbcError> {
        self.closed = true;
        Ok(self.exit_code)
    }
}
