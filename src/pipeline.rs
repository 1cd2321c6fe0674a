//! Producer / worker pool / aggregator pipeline with backpressure.
//!
//! Design:
//! - **Producer:** the calling thread reads lines, samples them and moves
//!   full batches into the batch queue
//! - **Workers:** `workers` threads pull batches, decode every line, run the
//!   whole rule set and send one [`Outcome`] per line
//! - **Aggregator:** one thread folds outcomes into statistics and writes
//!   reports
//! - **Backpressure:** both channels are bounded; the batch queue defaults to
//!   a rendezvous channel, so the producer never runs more than one batch
//!   ahead of a free worker
//!
//! Shutdown is structural. The producer drops the queue sender after the last
//! batch; each worker drops its result sender when the queue is drained; the
//! result channel disconnects only when the last worker is gone; the
//! aggregator then finishes. A fatal outcome makes the aggregator return
//! early, and every other stage stops at its next failed send.

use crate::aggregator::{Aggregator, CheckpointHandle, Outcome, Sinks};
use crate::batch::{Batch, Batcher};
use crate::error::{LintError, Result};
use crate::record::Record;
use crate::rules::RuleSet;
use crate::sample::Sampler;
use crate::stats::Stats;
use chrono::Utc;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::io::BufRead;
use std::num::NonZeroUsize;
use std::thread;
use tracing::{debug, info, warn};

/// How undecodable lines are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecoveryMode {
    /// Abort the run on the first undecodable line (default)
    #[default]
    Strict,
    /// Log, count and skip undecodable lines
    Lenient,
}

/// Configuration for the lint pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Lines per batch
    pub batch_size: usize,
    /// Number of worker threads
    pub workers: usize,
    /// Batch queue capacity (batches); zero makes it a rendezvous channel
    pub queue_capacity: usize,
    /// Result channel capacity (issue lists)
    pub channel_capacity: usize,
    /// Records between progress snapshots; zero disables them
    pub checkpoint_interval: u64,
    /// Probability of keeping an input line
    pub sample_ratio: f64,
    /// Seed for the sampler, for reproducible runs
    pub seed: Option<u64>,
    /// Handling of undecodable lines
    pub recovery: RecoveryMode,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: 40_000,
            workers: default_workers(),
            queue_capacity: 0,
            channel_capacity: 1000,
            checkpoint_interval: 1_000_000,
            sample_ratio: 1.0,
            seed: None,
            recovery: RecoveryMode::Strict,
        }
    }
}

/// One worker per available processing unit.
#[must_use]
pub fn default_workers() -> usize {
    thread::available_parallelism().map_or(1, NonZeroUsize::get)
}

/// A configured, ready-to-run lint pipeline.
#[derive(Debug)]
pub struct Pipeline {
    rules: RuleSet,
    config: PipelineConfig,
    checkpoints: Option<Receiver<()>>,
}

impl Pipeline {
    /// Validate the configuration and build a pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`LintError::InvalidConfig`] for zero workers or a zero batch
    /// size, and [`LintError::InvalidSampleRatio`] for a ratio outside `[0, 1]`.
    pub fn new(rules: RuleSet, config: PipelineConfig) -> Result<Self> {
        if config.workers == 0 {
            return Err(LintError::InvalidConfig("workers must be positive".to_string()));
        }
        if config.batch_size == 0 {
            return Err(LintError::InvalidConfig(
                "batch size must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&config.sample_ratio) {
            return Err(LintError::InvalidSampleRatio(config.sample_ratio));
        }
        Ok(Pipeline {
            rules,
            config,
            checkpoints: None,
        })
    }

    /// Handle for requesting snapshots while [`run`](Self::run) is in progress.
    ///
    /// Calling this again replaces the previous handle's connection.
    pub fn checkpoint_handle(&mut self) -> CheckpointHandle {
        let (handle, receiver) = crate::aggregator::checkpoint_channel();
        self.checkpoints = Some(receiver);
        handle
    }

    /// The rule set this pipeline applies.
    #[must_use]
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Lint every line of `input` and write reports to `sinks`.
    ///
    /// Blocks until all input is processed and the final snapshot is written.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error: unreadable input, an undecodable line in
    /// strict mode, a failing sink, or a panicked thread.
    pub fn run<R: BufRead>(self, input: R, sinks: Sinks<'_>) -> Result<Stats> {
        let Pipeline {
            rules,
            config,
            checkpoints,
        } = self;
        let sampler = Sampler::new(config.sample_ratio, config.seed)?;
        let mut batcher = Batcher::new(input, sampler, config.batch_size);
        let checkpoints = checkpoints.unwrap_or_else(crossbeam_channel::never);

        let (batch_tx, batch_rx) = bounded::<Batch>(config.queue_capacity);
        let (result_tx, result_rx) = bounded::<Outcome>(config.channel_capacity);
        let start = Utc::now();

        info!(
            workers = config.workers,
            batch_size = config.batch_size,
            sample_ratio = config.sample_ratio,
            rules = rules.len(),
            "starting lint run"
        );

        let stats = thread::scope(|scope| {
            let workers: Vec<_> = (0..config.workers)
                .map(|id| {
                    let batches = batch_rx.clone();
                    let results = result_tx.clone();
                    let rules = &rules;
                    let recovery = config.recovery;
                    scope.spawn(move || worker(id, &batches, &results, rules, recovery))
                })
                .collect();
            // From here on only workers hold the queue receiver and only
            // workers and the producer's abort sender hold result senders.
            drop(batch_rx);
            let abort = result_tx;

            let interval = config.checkpoint_interval;
            let aggregator = scope.spawn(move || {
                Aggregator::new(sinks, interval, start).run(&result_rx, checkpoints)
            });

            let produced = produce(&mut batcher, &batch_tx);
            drop(batch_tx);
            let leftover = match produced {
                Ok(()) => None,
                Err(LintError::ChannelClosed) => Some(LintError::ChannelClosed),
                Err(err) => {
                    // The aggregator reports it; if it is already gone it has
                    // its own error to return.
                    let _ = abort.send(Outcome::Failed(err));
                    None
                },
            };
            drop(abort);

            for handle in workers {
                handle
                    .join()
                    .map_err(|_| LintError::ThreadPanicked("worker"))?;
            }
            let stats = aggregator
                .join()
                .map_err(|_| LintError::ThreadPanicked("aggregator"))??;
            match leftover {
                Some(err) => Err(err),
                None => Ok(stats),
            }
        })?;

        info!(
            lines = batcher.lines_read(),
            records = stats.total(),
            damaged = stats.damaged(),
            "lint run finished"
        );
        Ok(stats)
    }
}

/// Move batches from the batcher into the queue until input is exhausted.
fn produce<R: BufRead>(batcher: &mut Batcher<R>, queue: &Sender<Batch>) -> Result<()> {
    let mut batches = 0u64;
    while let Some(batch) = batcher.next_batch()? {
        queue.send(batch).map_err(|_| LintError::ChannelClosed)?;
        batches += 1;
    }
    debug!(batches, lines = batcher.lines_read(), "producer finished");
    Ok(())
}

/// Decode and check every line of every batch until the queue closes.
fn worker(
    id: usize,
    batches: &Receiver<Batch>,
    results: &Sender<Outcome>,
    rules: &RuleSet,
    recovery: RecoveryMode,
) {
    debug!(worker = id, "worker started");
    for batch in batches {
        for line in batch {
            let outcome = match Record::from_json_slice(&line.bytes) {
                Ok(record) => Outcome::Checked(rules.check(&record)),
                Err(source) if recovery == RecoveryMode::Lenient => {
                    warn!(line = line.number, error = %source, "skipping undecodable line");
                    Outcome::Skipped
                },
                Err(source) => Outcome::Failed(LintError::Decode {
                    line: line.number,
                    source,
                }),
            };
            let fatal = matches!(outcome, Outcome::Failed(_));
            if results.send(outcome).is_err() || fatal {
                debug!(worker = id, "worker stopping early");
                return;
            }
        }
    }
    debug!(worker = id, "worker finished");
}
