//! In-memory parallel linting using Rayon.
//!
//! [`lint_lines_parallel`] decodes and checks a slice of lines on Rayon's
//! work-stealing pool. Unlike the streaming [`Pipeline`](crate::Pipeline) it
//! needs all input in memory, but it preserves input order, which makes it
//! convenient for tests, benchmarks and small corpora.
//!
//! # Examples
//!
//! ```
//! use islint::parallel::lint_lines_parallel;
//! use islint::{LintConfig, RuleSet, Stats};
//!
//! let rules = RuleSet::new(LintConfig::default());
//! let lines = vec![r#"{"finc.record_id": "a"}"#, r#"{"finc.record_id": "b"}"#];
//! let results = lint_lines_parallel(&lines, &rules)?;
//! let stats = Stats::from_issue_lists(&results);
//! assert_eq!(stats.total(), 2);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::error::{LintError, Result};
use crate::issue::Issue;
use crate::record::Record;
use crate::rules::RuleSet;
use rayon::prelude::*;

/// Lint every line in parallel and return the issue lists in input order.
///
/// This will use the global Rayon pool, which respects `RAYON_NUM_THREADS`.
///
/// # Errors
///
/// Returns [`LintError::Decode`] for a line that does not decode. Line
/// numbers are one-based positions in `lines`.
pub fn lint_lines_parallel<L>(lines: &[L], rules: &RuleSet) -> Result<Vec<Vec<Issue>>>
where
    L: AsRef<[u8]> + Sync,
{
    lines
        .par_iter()
        .enumerate()
        .map(|(idx, line)| {
            Record::from_json_slice(line.as_ref())
                .map(|record| rules.check(&record))
                .map_err(|source| LintError::Decode {
                    line: idx as u64 + 1,
                    source,
                })
        })
        .collect()
}
