//! Tick callback that streams snapshots to a JSONL file and logs progress.
//!
//! After each tick the callback serializes the full [`TickSnapshot`] to one
//! line of JSON, giving an external renderer or analysis script a replayable
//! trace of the run. Write failures are logged and absorbed; a broken trace
//! file must not bring the run down.
//!
//! [`TickSnapshot`]: gridlock_types::TickSnapshot

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use gridlock_core::runner::TickCallback;
use gridlock_core::tick::{SimulationState, TickSummary};
use tracing::{info, warn};

/// Callback that writes per-tick snapshots and periodic progress lines.
#[derive(Debug)]
pub struct SnapshotCallback {
    writer: Option<BufWriter<File>>,
    log_every: u64,
}

impl SnapshotCallback {
    /// Create a callback that only logs progress, without a trace file.
    ///
    /// A `log_every` of zero disables progress lines entirely.
    pub const fn new(log_every: u64) -> Self {
        Self {
            writer: None,
            log_every,
        }
    }

    /// Create a callback that also streams snapshots to `path` as JSONL.
    ///
    /// # Errors
    ///
    /// Returns [`std::io::Error`] if the trace file cannot be created.
    pub fn with_jsonl(path: &Path, log_every: u64) -> Result<Self, std::io::Error> {
        let file = File::create(path)?;
        Ok(Self {
            writer: Some(BufWriter::new(file)),
            log_every,
        })
    }

    /// Flush any buffered snapshot lines to disk.
    ///
    /// Called once after the run loop ends. Flush failures are logged and
    /// absorbed like write failures.
    pub fn finish(&mut self) {
        if let Some(writer) = self.writer.as_mut() {
            if let Err(error) = writer.flush() {
                warn!(%error, "Snapshot trace flush failed");
            }
        }
    }
}

impl TickCallback for SnapshotCallback {
    fn on_tick(&mut self, summary: &TickSummary, state: &SimulationState) {
        if let Some(writer) = self.writer.as_mut() {
            match serde_json::to_string(&state.snapshot()) {
                Ok(line) => {
                    if let Err(error) = writeln!(writer, "{line}") {
                        warn!(tick = summary.tick, %error, "Snapshot write failed");
                    }
                }
                Err(error) => {
                    warn!(tick = summary.tick, %error, "Snapshot serialization failed");
                }
            }
        }

        if self.log_every > 0 && summary.tick.checked_rem(self.log_every) == Some(0) {
            info!(
                tick = summary.tick,
                agents_alive = summary.agents_alive,
                collectibles = u64::try_from(state.collectibles.remaining()).unwrap_or(u64::MAX),
                conflicts = summary.conflicts,
                grants = summary.grants,
                "Run progress"
            );
        }
    }
}
