use crate::controller::LineChannel;
use crate::types::AbcError;

/// Discards ABC's startup banner exactly once per session.
///
/// ABC prints a few introductory lines (version, build date, prompt) that
/// only surface once the first command produces output. They must be
/// skipped before the first real response is trusted, and never again.
#[derive(Debug, Clone)]
pub struct PromptFilter {
    banner_lines: usize,
    skipped: bool,
}

impl PromptFilter {
    pub fn new(banner_lines: usize) -> Self {
        Self {
            banner_lines,
            skipped: false,
        }
    }

    /// Whether the banner has already been consumed.
    pub fn is_skipped(&self) -> bool {
        self.skipped
    }

    /// Read and discard the banner if it has not been consumed yet.
    pub async fn ensure_banner_skipped<C>(&mut self, channel: &mut C) -> Result<(), AbcError>
    where
        C: LineChannel + ?Sized,
    {
        if self.skipped {
            return Ok(());
        }

        for _ in 0..self.banner_lines {
            let line = channel.read_line().await?;
            tracing::trace!(line = %line, "Skipped ABC banner line");
        }
        self.skipped = true;
        Ok(())
    }
}
