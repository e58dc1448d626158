//! Construction-time knobs for a channel: plain setters on the options
//! struct rather than a dedicated builder type.

/// Per-end poison immunity thresholds, configured at channel construction.
///
/// Poison raised at strength `s` is ignored at an end whose immunity is
/// `>= s`, letting a pipeline stage shrug off a shutdown signal meant for
/// an earlier, less-trusted stage while still propagating stronger poison.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelOptions {
    /// Immunity level of the read end. Poison strengths at or below this
    /// value are invisible to readers.
    pub read_immunity: u32,
    /// Immunity level of the write end. Poison strengths at or below this
    /// value are invisible to writers.
    pub write_immunity: u32,
}

impl ChannelOptions {
    /// Default options: no immunity on either end (any poison strength > 0
    /// terminates both ends).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the read-end immunity.
    #[must_use]
    pub fn with_read_immunity(mut self, level: u32) -> Self {
        self.read_immunity = level;
        self
    }

    /// Sets the write-end immunity.
    #[must_use]
    pub fn with_write_immunity(mut self, level: u32) -> Self {
        self.write_immunity = level;
        self
    }
}
