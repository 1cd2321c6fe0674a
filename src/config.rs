//! Immutable rule configuration.
//!
//! A [`LintConfig`] is built once at startup and shared read-only by every
//! worker. It owns the compiled patterns, the base for relative URLs, the
//! collection allow-list, the date bounds and the numeric limits the rules
//! compare against.

use crate::error::Result;
use chrono::{Months, NaiveDate, Utc};
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use url::{ParseError, Url};

/// Storage key length limit of the downstream key/value store, in bytes.
pub const KEY_LENGTH_LIMIT: usize = 250;

/// Pages with more digits than this are not page numbers.
pub const MAX_PAGE_DIGITS: usize = 6;

/// Largest plausible distance between start and end page.
pub const MAX_PAGE_COUNT: i64 = 20_000;

/// Years added to today to get the latest plausible publication date.
pub const FUTURE_YEARS: u32 = 5;

/// Author display strings shorter than this (in characters) are flagged.
pub const MIN_AUTHOR_LENGTH: usize = 5;

/// Narrow price pattern: a currency symbol followed by an amount.
const CURRENCY_PATTERN: &str = r"[€$¥][+-]?[0-9]{1,3}(?:[0-9]*(?:[.,][0-9]{2})?|(?:,[0-9]{3})*(?:\.[0-9]{2})?|(?:\.[0-9]{3})*(?:,[0-9]{2})?)";

const HTML_ENTITY_PATTERN: &str = r"&(?:[a-zA-Z][a-zA-Z0-9]*|#[0-9]+|#[xX][0-9a-fA-F]+);";

const ISSN_PATTERN: &str = r"^[0-9]{4}-[0-9]{3}[0-9X]$";

/// Relative references are resolved against this before parsing.
const URL_BASE: &str = "http://localhost/";

/// Runs of punctuation that do not occur in real titles.
pub const SUSPICIOUS_PUNCTUATION: [&str; 3] = ["?????", "!!!!!", "....."];

/// Read-only configuration shared by all rules.
#[derive(Debug, Clone)]
pub struct LintConfig {
    /// Earliest accepted publication date.
    pub earliest_date: NaiveDate,
    /// Latest accepted publication date, fixed at construction time.
    pub latest_date: NaiveDate,
    /// Permitted collection names; `None` disables the collection check.
    pub allowed_collections: Option<HashSet<String>>,
    pub(crate) currency: Regex,
    pub(crate) html_entity: Regex,
    pub(crate) issn: Regex,
    url_base: Url,
}

impl LintConfig {
    /// Build a configuration whose latest date is today plus five years.
    #[must_use]
    pub fn new(allowed_collections: Option<HashSet<String>>) -> Self {
        Self::with_reference_date(Utc::now().date_naive(), allowed_collections)
    }

    /// Build a configuration relative to a given "today".
    #[must_use]
    pub fn with_reference_date(
        today: NaiveDate,
        allowed_collections: Option<HashSet<String>>,
    ) -> Self {
        let latest_date = today
            .checked_add_months(Months::new(FUTURE_YEARS * 12))
            .unwrap_or(NaiveDate::MAX);
        LintConfig {
            earliest_date: NaiveDate::from_ymd_opt(1458, 1, 1).unwrap_or(NaiveDate::MIN),
            latest_date,
            allowed_collections,
            currency: compile(CURRENCY_PATTERN),
            html_entity: compile(HTML_ENTITY_PATTERN),
            issn: compile(ISSN_PATTERN),
            url_base: base_url(),
        }
    }

    /// Whether the collection name passes the allow-list.
    #[must_use]
    pub fn collection_allowed(&self, name: &str) -> bool {
        self.allowed_collections
            .as_ref()
            .map_or(true, |set| set.contains(name))
    }

    /// Whether the string is a canonical `NNNN-NNNX` ISSN.
    #[must_use]
    pub fn is_canonical_issn(&self, value: &str) -> bool {
        self.issn.is_match(value)
    }

    /// Parse an absolute URL or a relative reference.
    ///
    /// # Errors
    ///
    /// Returns the [`ParseError`] for strings that are neither.
    pub fn parse_url(&self, raw: &str) -> std::result::Result<Url, ParseError> {
        Url::options().base_url(Some(&self.url_base)).parse(raw)
    }
}

impl Default for LintConfig {
    fn default() -> Self {
        Self::new(None)
    }
}

#[allow(clippy::expect_used)]
fn compile(pattern: &str) -> Regex {
    // Patterns are compile-time constants covered by tests.
    Regex::new(pattern).expect("built-in pattern must compile")
}

#[allow(clippy::expect_used)]
fn base_url() -> Url {
    Url::parse(URL_BASE).expect("built-in base URL must parse")
}

/// Load a set of strings from one or more line-oriented files.
///
/// Each non-blank line contributes its first tab-separated column, trimmed.
/// The result is the union over all files.
///
/// # Errors
///
/// Returns an IO error if any file cannot be read.
pub fn load_string_set<P: AsRef<Path>>(paths: &[P]) -> Result<HashSet<String>> {
    let mut set = HashSet::new();
    for path in paths {
        let content = fs::read_to_string(path)?;
        for line in content.lines() {
            let value = line.split('\t').next().unwrap_or_default().trim();
            if !value.is_empty() {
                set.insert(value.to_string());
            }
        }
    }
    Ok(set)
}
