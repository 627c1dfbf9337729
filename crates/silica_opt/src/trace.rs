//! Optional trace channel for pass diagnostics.

use std::sync::Mutex;

/// A thread-safe accumulator for human-readable pass trace lines.
///
/// Tracing is informational only and never affects transformation
/// results. A sink constructed with [`TraceSink::disabled`] drops every
/// line, letting callers opt out without branching at emit sites.
pub struct TraceSink {
    enabled: bool,
    lines: Mutex<Vec<String>>,
}

impl TraceSink {
    /// Creates an enabled sink that records every line.
    pub fn new() -> Self {
        Self {
            enabled: true,
            lines: Mutex::new(Vec::new()),
        }
    }

    /// Creates a sink that silently drops all lines.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            lines: Mutex::new(Vec::new()),
        }
    }

    /// Returns `true` if emitted lines are recorded.
    ///
    /// Emit sites can check this before building expensive messages.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Records a trace line. No-op on a disabled sink.
    pub fn emit(&self, line: impl Into<String>) {
        if !self.enabled {
            return;
        }
        let mut lines = self.lines.lock().unwrap();
        lines.push(line.into());
    }

    /// Returns a snapshot of all recorded lines.
    pub fn lines(&self) -> Vec<String> {
        let lines = self.lines.lock().unwrap();
        lines.clone()
    }

    /// Takes all recorded lines, leaving the sink empty.
    pub fn take_all(&self) -> Vec<String> {
        let mut lines = self.lines.lock().unwrap();
        std::mem::take(&mut *lines)
    }
}

impl Default for TraceSink {
    fn default() -> Self {
        Self::new()
    }
}
