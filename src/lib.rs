#![warn(missing_docs)]

//! # islint: plausibility linting for intermediate schema records
//!
//! A concurrent linter for large streams of bibliographic records in the
//! intermediate schema, one JSON object per line. Every record is checked
//! against a fixed battery of plausibility rules; defects are reported as
//! categorized [`Issue`]s and folded into aggregate [`Stats`].
//!
//! ## Quick Start
//!
//! ```
//! use islint::{LintConfig, Pipeline, PipelineConfig, RuleSet, Sinks};
//! use std::io::Cursor;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let input = Cursor::new("{\"finc.record_id\": \"ai-1\"}\n");
//! let rules = RuleSet::new(LintConfig::default());
//! let pipeline = Pipeline::new(rules, PipelineConfig::default())?;
//!
//! let mut summary: Vec<u8> = Vec::new();
//! let sinks = Sinks { details: None, progress: None, summary: &mut summary };
//! let stats = pipeline.run(input, sinks)?;
//! assert_eq!(stats.total(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`issue`]: Defect kinds and the issue value
//! - [`record`]: The decoded intermediate schema record
//! - [`config`]: Immutable rule configuration and allow-list loading
//! - [`rules`]: The ordered rule set
//! - [`sample`]: Per-line sampling
//! - [`batch`]: Batching of line-delimited input
//! - [`pipeline`]: Producer, worker pool and aggregator
//! - [`aggregator`]: Statistics folding, detail streaming and checkpoints
//! - [`stats`]: Statistics and JSON snapshots
//! - [`parallel`]: In-memory parallel linting with Rayon
//! - [`error`]: Error types and result type

pub mod aggregator;
pub mod batch;
pub mod config;
pub mod error;
pub mod issue;
pub mod parallel;
pub mod pipeline;
pub mod record;
pub mod rules;
pub mod sample;
pub mod stats;

pub use aggregator::{checkpoint_channel, Aggregator, CheckpointHandle, Outcome, Sinks};
pub use batch::{Batch, Batcher, Line};
pub use config::{load_string_set, LintConfig};
pub use error::{LintError, Result};
pub use issue::{Issue, Kind};
pub use pipeline::{Pipeline, PipelineConfig, RecoveryMode};
pub use record::{Author, Record};
pub use rules::{Rule, RuleSet};
pub use sample::Sampler;
pub use stats::{Snapshot, Stats};
