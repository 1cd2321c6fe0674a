//! The rule set: named, pure record predicates.
//!
//! Every rule maps one [`Record`] to at most one [`Issue`]. Some rules look at
//! several conditions and report the first one that matches. A [`RuleSet`] is
//! a fixed ordered list of rules together with the [`LintConfig`] they read;
//! it is built once and shared read-only between workers.
//!
//! # Examples
//!
//! ```
//! use islint::{Kind, LintConfig, Record, RuleSet};
//!
//! let rules = RuleSet::new(LintConfig::default());
//! let record = Record {
//!     record_id: "x".repeat(300),
//!     ..Record::default()
//! };
//! let issues = rules.check(&record);
//! assert!(issues.iter().any(|issue| issue.kind == Kind::KeyTooLong));
//! ```

use crate::config::{
    LintConfig, KEY_LENGTH_LIMIT, MAX_PAGE_COUNT, MAX_PAGE_DIGITS, MIN_AUTHOR_LENGTH,
    SUSPICIOUS_PUNCTUATION,
};
use crate::error::{LintError, Result};
use crate::issue::{Issue, Kind};
use crate::record::Record;

/// Signature shared by all rules.
pub type Predicate = fn(&Record, &LintConfig) -> Option<Issue>;

/// A named predicate.
#[derive(Clone, Copy)]
pub struct Rule {
    /// Rule name, as accepted by [`RuleSet::select`].
    pub name: &'static str,
    /// The check itself.
    pub predicate: Predicate,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish()
    }
}

/// All rules, in evaluation order.
pub const DEFAULT_RULES: [Rule; 13] = [
    Rule {
        name: "KeyLength",
        predicate: key_length,
    },
    Rule {
        name: "PlausiblePageCount",
        predicate: plausible_page_count,
    },
    Rule {
        name: "ValidURL",
        predicate: valid_url,
    },
    Rule {
        name: "PlausibleDate",
        predicate: plausible_date,
    },
    Rule {
        name: "AllowedCollectionNames",
        predicate: allowed_collection_names,
    },
    Rule {
        name: "SubtitleRepetition",
        predicate: subtitle_repetition,
    },
    Rule {
        name: "NoCurrencyInTitle",
        predicate: no_currency_in_title,
    },
    Rule {
        name: "NoExcessivePunctuation",
        predicate: no_excessive_punctuation,
    },
    Rule {
        name: "HasPublisher",
        predicate: has_publisher,
    },
    Rule {
        name: "FeasibleAuthor",
        predicate: feasible_author,
    },
    Rule {
        name: "NoRepeatedSlash",
        predicate: no_repeated_slash,
    },
    Rule {
        name: "HasURL",
        predicate: has_url,
    },
    Rule {
        name: "CanonicalISSN",
        predicate: canonical_issn,
    },
];

/// An ordered list of rules bound to their configuration.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
    config: LintConfig,
}

impl RuleSet {
    /// All default rules.
    #[must_use]
    pub fn new(config: LintConfig) -> Self {
        RuleSet {
            rules: DEFAULT_RULES.to_vec(),
            config,
        }
    }

    /// Only the named rules, kept in default order.
    ///
    /// # Errors
    ///
    /// Returns [`LintError::UnknownRule`] for the first name that is not a rule.
    pub fn select<S: AsRef<str>>(config: LintConfig, names: &[S]) -> Result<Self> {
        if let Some(unknown) = names
            .iter()
            .map(AsRef::as_ref)
            .find(|name| !DEFAULT_RULES.iter().any(|rule| rule.name == *name))
        {
            return Err(LintError::UnknownRule(unknown.to_string()));
        }
        let rules = DEFAULT_RULES
            .iter()
            .filter(|rule| names.iter().any(|name| name.as_ref() == rule.name))
            .copied()
            .collect();
        Ok(RuleSet { rules, config })
    }

    /// Run every rule against the record and collect all issues, in rule order.
    #[must_use]
    pub fn check(&self, record: &Record) -> Vec<Issue> {
        self.rules
            .iter()
            .filter_map(|rule| (rule.predicate)(record, &self.config))
            .collect()
    }

    /// Rule names in evaluation order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|rule| rule.name)
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the set has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The shared configuration.
    #[must_use]
    pub fn config(&self) -> &LintConfig {
        &self.config
    }
}

fn issue(kind: Kind, record: &Record, message: impl Into<String>) -> Option<Issue> {
    Some(Issue::new(kind, record.record_id.as_str(), message))
}

/// Identifier longer than the storage key limit.
#[must_use]
pub fn key_length(record: &Record, _: &LintConfig) -> Option<Issue> {
    let len = record.record_id.len();
    if len > KEY_LENGTH_LIMIT {
        return issue(Kind::KeyTooLong, record, format!("{len} bytes"));
    }
    None
}

/// First URL that does not parse. Control characters are never allowed.
#[must_use]
pub fn valid_url(record: &Record, config: &LintConfig) -> Option<Issue> {
    record
        .urls
        .iter()
        .find(|url| url.chars().any(char::is_control) || config.parse_url(url).is_err())
        .and_then(|url| issue(Kind::InvalidURL, record, url.as_str()))
}

/// Publication date outside of the configured bounds.
#[must_use]
pub fn plausible_date(record: &Record, config: &LintConfig) -> Option<Issue> {
    let Some(date) = record.date else {
        return issue(Kind::PublicationDateTooEarly, record, "no date");
    };
    if date < config.earliest_date {
        return issue(Kind::PublicationDateTooEarly, record, date.to_string());
    }
    if date > config.latest_date {
        return issue(Kind::PublicationDateTooLate, record, date.to_string());
    }
    None
}

/// Start and end page checks; exactly one outcome per call.
#[must_use]
pub fn plausible_page_count(record: &Record, _: &LintConfig) -> Option<Issue> {
    let (start, end) = (record.start_page.as_str(), record.end_page.as_str());
    if start.len() > MAX_PAGE_DIGITS {
        return issue(Kind::InvalidStartPage, record, start);
    }
    if end.len() > MAX_PAGE_DIGITS {
        return issue(Kind::InvalidEndPage, record, end);
    }
    if start.is_empty() || end.is_empty() {
        return None;
    }
    match (start.parse::<i64>(), end.parse::<i64>()) {
        (Ok(s), Ok(e)) if e < s => {
            issue(Kind::EndPageBeforeStartPage, record, format!("{s}-{e}"))
        },
        (Ok(s), Ok(e)) if e - s > MAX_PAGE_COUNT => {
            issue(Kind::SuspiciousPageCount, record, format!("{s}-{e}"))
        },
        (Ok(_), Ok(_)) => None,
        (Ok(_), Err(_)) => issue(Kind::InvalidEndPage, record, end),
        (Err(_), _) => issue(Kind::InvalidStartPage, record, start),
    }
}

/// Collection name not on the allow-list.
#[must_use]
pub fn allowed_collection_names(record: &Record, config: &LintConfig) -> Option<Issue> {
    if config.collection_allowed(&record.mega_collection) {
        return None;
    }
    issue(Kind::InvalidCollection, record, record.mega_collection.as_str())
}

/// Subtitle repeated verbatim inside the title.
#[must_use]
pub fn subtitle_repetition(record: &Record, _: &LintConfig) -> Option<Issue> {
    let (title, subtitle) = (&record.article_title, &record.article_subtitle);
    if !subtitle.is_empty() && title.contains(subtitle.as_str()) {
        return issue(
            Kind::RepeatedSubtitle,
            record,
            format!("TITLE: {title}, SUBTITLE: {subtitle}"),
        );
    }
    None
}

/// Prices in titles usually mean a review blurb was harvested as title.
#[must_use]
pub fn no_currency_in_title(record: &Record, config: &LintConfig) -> Option<Issue> {
    if config.currency.is_match(&record.article_title) {
        return issue(Kind::CurrencyInTitle, record, record.article_title.as_str());
    }
    None
}

/// Runs of five `?`, `!` or `.` in the title.
#[must_use]
pub fn no_excessive_punctuation(record: &Record, _: &LintConfig) -> Option<Issue> {
    let title = &record.article_title;
    if SUSPICIOUS_PUNCTUATION.iter().any(|p| title.contains(p)) {
        return issue(Kind::ExcessivePunctuation, record, title.as_str());
    }
    None
}

/// At least one publisher and no empty publisher entries.
#[must_use]
pub fn has_publisher(record: &Record, _: &LintConfig) -> Option<Issue> {
    if record.publishers.is_empty() {
        return issue(Kind::NoPublisher, record, "");
    }
    if record.publishers.iter().any(String::is_empty) {
        return issue(
            Kind::NoPublisher,
            record,
            format!("empty publisher among {}", record.publishers.len()),
        );
    }
    None
}

/// First author whose display string does not look like a name.
#[must_use]
pub fn feasible_author(record: &Record, config: &LintConfig) -> Option<Issue> {
    record.authors.iter().find_map(|author| {
        let name = author.to_string();
        let lower = name.to_lowercase();
        let kind = if name.chars().count() < MIN_AUTHOR_LENGTH {
            Kind::ShortAuthorName
        } else if lower.starts_with("et al") {
            Kind::EtAlAuthorName
        } else if lower.contains("&na;") {
            Kind::NAInAuthorName
        } else if name.trim().is_empty() {
            Kind::WhitespaceAuthor
        } else if config.html_entity.is_match(&name) {
            Kind::HTMLEntityInAuthorName
        } else {
            return None;
        };
        issue(kind, record, name)
    })
}

/// DOI with a double slash.
#[must_use]
pub fn no_repeated_slash(record: &Record, _: &LintConfig) -> Option<Issue> {
    if record.doi.contains("//") {
        return issue(Kind::RepeatedSlash, record, record.doi.as_str());
    }
    None
}

/// At least one URL.
#[must_use]
pub fn has_url(record: &Record, _: &LintConfig) -> Option<Issue> {
    if record.urls.is_empty() {
        return issue(Kind::NoURL, record, "");
    }
    None
}

/// First ISSN or E-ISSN not in `NNNN-NNNX` form.
#[must_use]
pub fn canonical_issn(record: &Record, config: &LintConfig) -> Option<Issue> {
    record
        .all_issns()
        .find(|value| !config.is_canonical_issn(value))
        .and_then(|value| issue(Kind::NonCanonicalISSN, record, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Author;
    use chrono::NaiveDate;
    use std::collections::HashSet;

    fn config() -> LintConfig {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let allowed: HashSet<String> = ["Crossref".to_string()].into_iter().collect();
        LintConfig::with_reference_date(today, Some(allowed))
    }

    fn valid_record() -> Record {
        Record {
            record_id: "ai-49-0001".to_string(),
            date: NaiveDate::from_ymd_opt(2001, 5, 1),
            start_page: "10".to_string(),
            end_page: "20".to_string(),
            mega_collection: "Crossref".to_string(),
            article_title: "On the plausibility of records".to_string(),
            authors: vec![Author::named("Jane Doe")],
            publishers: vec!["Acme".to_string()],
            doi: "10.1000/182".to_string(),
            urls: vec!["https://doi.org/10.1000/182".to_string()],
            issn: vec!["1234-567X".to_string()],
            ..Record::default()
        }
    }

    fn kinds(record: &Record) -> Vec<Kind> {
        RuleSet::new(config())
            .check(record)
            .into_iter()
            .map(|issue| issue.kind)
            .collect()
    }

    fn pages(start: &str, end: &str) -> Option<Issue> {
        let record = Record {
            start_page: start.to_string(),
            end_page: end.to_string(),
            ..valid_record()
        };
        plausible_page_count(&record, &config())
    }

    #[test]
    fn test_valid_record_has_no_issues() {
        assert!(kinds(&valid_record()).is_empty());
    }

    #[test]
    fn test_key_length_boundary() {
        let mut record = valid_record();
        record.record_id = "a".repeat(250);
        assert!(key_length(&record, &config()).is_none());
        record.record_id = "a".repeat(251);
        assert_eq!(key_length(&record, &config()).unwrap().kind, Kind::KeyTooLong);
    }

    #[test]
    fn test_page_count_outcomes() {
        let issue = pages("100", "50").unwrap();
        assert_eq!(issue.kind, Kind::EndPageBeforeStartPage);
        assert_eq!(issue.message, "100-50");

        assert_eq!(pages("100", "30101").unwrap().kind, Kind::SuspiciousPageCount);
        assert_eq!(pages("100", "20100"), None);
        assert_eq!(pages("abc", "12").unwrap().kind, Kind::InvalidStartPage);
        assert_eq!(pages("abc", "xyz").unwrap().kind, Kind::InvalidStartPage);
        assert_eq!(pages("12", "xyz").unwrap().kind, Kind::InvalidEndPage);
        assert_eq!(pages("1234567", "1").unwrap().kind, Kind::InvalidStartPage);
        assert_eq!(pages("1", "1234567").unwrap().kind, Kind::InvalidEndPage);
    }

    #[test]
    fn test_page_count_skips_empty_pages() {
        assert_eq!(pages("", "xyz"), None);
        assert_eq!(pages("abc", ""), None);
        assert_eq!(pages("", ""), None);
    }

    #[test]
    fn test_dates() {
        let mut record = valid_record();
        record.date = NaiveDate::from_ymd_opt(1457, 12, 31);
        assert_eq!(kinds(&record), vec![Kind::PublicationDateTooEarly]);
        record.date = NaiveDate::from_ymd_opt(1458, 1, 1);
        assert!(kinds(&record).is_empty());
        record.date = NaiveDate::from_ymd_opt(2029, 6, 1);
        assert!(kinds(&record).is_empty());
        record.date = NaiveDate::from_ymd_opt(2029, 6, 2);
        assert_eq!(kinds(&record), vec![Kind::PublicationDateTooLate]);
        record.date = None;
        let issue = plausible_date(&record, &config()).unwrap();
        assert_eq!(issue.kind, Kind::PublicationDateTooEarly);
        assert_eq!(issue.message, "no date");
    }

    #[test]
    fn test_collection_allow_list() {
        let mut record = valid_record();
        record.mega_collection = "Unknown Source".to_string();
        let issue = allowed_collection_names(&record, &config()).unwrap();
        assert_eq!(issue.kind, Kind::InvalidCollection);
        assert_eq!(issue.message, "Unknown Source");
        assert!(allowed_collection_names(&record, &LintConfig::default()).is_none());
    }

    #[test]
    fn test_title_rules() {
        let mut record = valid_record();
        record.article_title = "Baby, You Are My Religion. $90.00 (cloth)".to_string();
        assert_eq!(kinds(&record), vec![Kind::CurrencyInTitle]);

        record.article_title = "CrossRef?????????".to_string();
        assert_eq!(kinds(&record), vec![Kind::ExcessivePunctuation]);

        record.article_title = "Main title: the subtitle".to_string();
        record.article_subtitle = "the subtitle".to_string();
        assert_eq!(kinds(&record), vec![Kind::RepeatedSubtitle]);
    }

    #[test]
    fn test_publishers() {
        let mut record = valid_record();
        record.publishers = vec![];
        assert_eq!(has_publisher(&record, &config()).unwrap().kind, Kind::NoPublisher);
        record.publishers = vec![String::new()];
        assert!(has_publisher(&record, &config()).is_some());
        record.publishers = vec!["Acme".to_string(), String::new()];
        assert!(has_publisher(&record, &config()).is_some());
        record.publishers = vec!["Acme".to_string(), "Beta".to_string()];
        assert!(has_publisher(&record, &config()).is_none());
    }

    #[test]
    fn test_author_checks_in_order() {
        let check = |name: &str| {
            let record = Record {
                authors: vec![Author::named(name)],
                ..valid_record()
            };
            feasible_author(&record, &config()).map(|issue| issue.kind)
        };
        assert_eq!(check("Doe"), Some(Kind::ShortAuthorName));
        assert_eq!(check("Et Al."), Some(Kind::EtAlAuthorName));
        assert_eq!(check("Smith &NA; John"), Some(Kind::NAInAuthorName));
        assert_eq!(check("      "), Some(Kind::WhitespaceAuthor));
        assert_eq!(check("M&uuml;ller, Hans"), Some(Kind::HTMLEntityInAuthorName));
        assert_eq!(check("Müller, Hans"), None);
    }

    #[test]
    fn test_first_bad_author_is_reported() {
        let record = Record {
            authors: vec![
                Author::named("Jane Doe"),
                Author::named("et al"),
                Author::named("X"),
            ],
            ..valid_record()
        };
        let issue = feasible_author(&record, &config()).unwrap();
        assert_eq!(issue.kind, Kind::EtAlAuthorName);
        assert_eq!(issue.message, "et al");
    }

    #[test]
    fn test_doi_url_and_issn() {
        let mut record = valid_record();
        record.doi = "10.1000//182".to_string();
        record.urls = vec![];
        record.eissn = vec!["12345678".to_string()];
        assert_eq!(
            kinds(&record),
            vec![Kind::RepeatedSlash, Kind::NoURL, Kind::NonCanonicalISSN]
        );

        let mut record = valid_record();
        record.urls = vec![
            "http://ok.example".to_string(),
            "http://exa mple.org/".to_string(),
        ];
        let issue = valid_url(&record, &config()).unwrap();
        assert_eq!(issue.kind, Kind::InvalidURL);
        assert_eq!(issue.message, "http://exa mple.org/");
    }

    #[test]
    fn test_valid_url_rejects_control_characters() {
        let mut record = valid_record();
        record.urls = vec!["http://exa\nmple.org/".to_string()];
        assert!(valid_url(&record, &config()).is_some());
        record.urls = vec!["/relative/path".to_string(), "mailto:a@b.example".to_string()];
        assert!(valid_url(&record, &config()).is_none());
    }

    #[test]
    fn test_issues_follow_rule_order() {
        let record = Record {
            record_id: "x".repeat(300),
            start_page: "100".to_string(),
            end_page: "50".to_string(),
            urls: vec![],
            ..valid_record()
        };
        assert_eq!(
            kinds(&record),
            vec![Kind::KeyTooLong, Kind::EndPageBeforeStartPage, Kind::NoURL]
        );
    }

    #[test]
    fn test_select_rules() {
        let rules = RuleSet::select(config(), &["HasURL", "KeyLength"]).unwrap();
        assert_eq!(rules.names().collect::<Vec<_>>(), vec!["KeyLength", "HasURL"]);
        assert_eq!(rules.len(), 2);

        let err = RuleSet::select(config(), &["KeyLength", "Bogus"]).unwrap_err();
        assert!(matches!(err, LintError::UnknownRule(name) if name == "Bogus"));
    }

    #[test]
    fn test_rule_names_are_unique() {
        let names: HashSet<_> = DEFAULT_RULES.iter().map(|rule| rule.name).collect();
        assert_eq!(names.len(), DEFAULT_RULES.len());
    }
}
