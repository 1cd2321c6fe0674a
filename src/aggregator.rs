//! The single consumer of worker results.
//!
//! The [`Aggregator`] folds every issue list into [`Stats`], optionally streams
//! one TSV line per issue, and writes JSON snapshots: every
//! `checkpoint_interval` records when progress reporting is on, whenever a
//! [`CheckpointHandle`] asks for one, and once at the end.

use crate::error::{LintError, Result};
use crate::issue::Issue;
use crate::stats::{Snapshot, Stats};
use chrono::{DateTime, Utc};
use crossbeam_channel::{never, select, unbounded, Receiver, Sender};
use std::io::Write;
use tracing::{debug, warn};

/// What a worker reports for one input line.
#[derive(Debug)]
pub enum Outcome {
    /// The record decoded; these are its issues (possibly none).
    Checked(Vec<Issue>),
    /// The line did not decode and was skipped (lenient mode).
    Skipped,
    /// Fatal error; the run must stop.
    Failed(LintError),
}

/// Output destinations.
pub struct Sinks<'a> {
    /// Per-issue TSV lines, if enabled.
    pub details: Option<&'a mut (dyn Write + Send)>,
    /// Periodic snapshots, if enabled.
    pub progress: Option<&'a mut (dyn Write + Send)>,
    /// Final snapshot.
    pub summary: &'a mut (dyn Write + Send),
}

impl std::fmt::Debug for Sinks<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sinks")
            .field("details", &self.details.is_some())
            .field("progress", &self.progress.is_some())
            .finish_non_exhaustive()
    }
}

/// Requests an immediate snapshot from a running aggregator.
#[derive(Debug, Clone)]
pub struct CheckpointHandle {
    sender: Sender<()>,
}

impl CheckpointHandle {
    /// Ask for a snapshot. Returns `false` once the run has finished.
    pub fn request(&self) -> bool {
        self.sender.send(()).is_ok()
    }
}

/// Create a checkpoint handle and the receiving end for the aggregator.
#[must_use]
pub fn checkpoint_channel() -> (CheckpointHandle, Receiver<()>) {
    let (sender, receiver) = unbounded();
    (CheckpointHandle { sender }, receiver)
}

/// Accumulates statistics and writes reports.
#[derive(Debug)]
pub struct Aggregator<'a> {
    stats: Stats,
    start: DateTime<Utc>,
    sinks: Sinks<'a>,
    checkpoint_interval: u64,
    processed: u64,
}

impl<'a> Aggregator<'a> {
    /// Create an aggregator. An interval of zero disables periodic snapshots.
    #[must_use]
    pub fn new(sinks: Sinks<'a>, checkpoint_interval: u64, start: DateTime<Utc>) -> Self {
        Aggregator {
            stats: Stats::new(),
            start,
            sinks,
            checkpoint_interval,
            processed: 0,
        }
    }

    /// Statistics so far.
    #[must_use]
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Fold one record's issues.
    ///
    /// # Errors
    ///
    /// Returns an error if a sink cannot be written.
    pub fn consume(&mut self, issues: &[Issue]) -> Result<()> {
        self.stats.record(issues);
        if let Some(details) = self.sinks.details.as_deref_mut() {
            for issue in issues {
                writeln!(details, "{}", issue.to_tsv())?;
            }
        }
        self.processed += 1;
        if self.checkpoint_interval > 0 && self.processed % self.checkpoint_interval == 0 {
            let snapshot = self.stats.snapshot(self.start);
            if let Some(progress) = self.sinks.progress.as_deref_mut() {
                write_snapshot(progress, &snapshot)?;
            }
            debug!(processed = self.processed, "checkpoint");
        }
        Ok(())
    }

    /// Count one skipped line.
    pub fn skip(&mut self) {
        self.stats.record_skipped();
    }

    /// Write a snapshot now, to the progress sink if there is one, else to
    /// the summary sink.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink cannot be written.
    pub fn checkpoint(&mut self) -> Result<()> {
        let snapshot = self.stats.snapshot(self.start);
        let sink: &mut dyn Write = match self.sinks.progress.as_deref_mut() {
            Some(progress) => progress,
            None => &mut *self.sinks.summary,
        };
        write_snapshot(sink, &snapshot)
    }

    /// Write the final snapshot and return the statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if a sink cannot be written or flushed.
    pub fn finish(mut self) -> Result<Stats> {
        let snapshot = self.stats.snapshot(self.start);
        if let Some(details) = self.sinks.details.as_deref_mut() {
            details.flush()?;
        }
        write_snapshot(&mut *self.sinks.summary, &snapshot)?;
        self.sinks.summary.flush()?;
        Ok(self.stats)
    }

    /// Drain `results` until every sender is gone, then finish.
    ///
    /// Checkpoint requests still queued at that point are answered before the
    /// final snapshot.
    ///
    /// Stops at the first [`Outcome::Failed`] and returns its error; dropping
    /// the receiver then makes the workers' sends fail.
    ///
    /// # Errors
    ///
    /// Returns the first worker failure or sink error.
    pub fn run(mut self, results: &Receiver<Outcome>, checkpoints: Receiver<()>) -> Result<Stats> {
        let idle = never();
        let mut hung_up = false;
        loop {
            let requests = if hung_up { &idle } else { &checkpoints };
            select! {
                recv(results) -> msg => match msg {
                    Ok(Outcome::Checked(issues)) => self.consume(&issues)?,
                    Ok(Outcome::Skipped) => self.skip(),
                    Ok(Outcome::Failed(err)) => return Err(err),
                    Err(_) => break,
                },
                recv(requests) -> msg => match msg {
                    Ok(()) => self.checkpoint()?,
                    Err(_) => hung_up = true,
                },
            }
        }
        // Requests that raced with the end of input still get their snapshot.
        while checkpoints.try_recv().is_ok() {
            self.checkpoint()?;
        }
        if self.stats.skipped > 0 {
            warn!(skipped = self.stats.skipped, "lines skipped");
        }
        self.finish()
    }
}

fn write_snapshot(sink: &mut dyn Write, snapshot: &Snapshot) -> Result<()> {
    serde_json::to_writer(&mut *sink, snapshot).map_err(LintError::Snapshot)?;
    writeln!(sink)?;
    Ok(())
}
