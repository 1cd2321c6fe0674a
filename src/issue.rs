//! Issue taxonomy: the closed set of defect kinds and the issue value.
//!
//! A [`Kind`] names a category of quality defect. Discriminants are explicit
//! and stable: new kinds are appended at the end and existing kinds are never
//! renumbered, so ordering and any persisted numeric form stay comparable
//! between releases.
//!
//! # Examples
//!
//! ```
//! use islint::{Issue, Kind};
//!
//! let issue = Issue::new(Kind::RepeatedSlash, "ai-49-aHR0cDovL2R4", "10.1000//182");
//! assert_eq!(issue.to_tsv(), "ai-49-aHR0cDovL2R4\tRepeatedSlash\t10.1000//182");
//! assert_eq!("RepeatedSlash".parse::<Kind>().unwrap(), Kind::RepeatedSlash);
//! ```

use crate::error::LintError;
use std::fmt;
use std::str::FromStr;

/// Category of a quality defect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Kind {
    /// Record identifier exceeds the storage key length limit.
    KeyTooLong = 0,
    /// Start page is too long or not a number.
    InvalidStartPage = 1,
    /// End page is too long or not a number.
    InvalidEndPage = 2,
    /// End page is smaller than the start page.
    EndPageBeforeStartPage = 3,
    /// A URL does not parse.
    InvalidURL = 4,
    /// Page range is implausibly large.
    SuspiciousPageCount = 5,
    /// Publication date before the earliest accepted date.
    PublicationDateTooEarly = 6,
    /// Publication date after the latest accepted date.
    PublicationDateTooLate = 7,
    /// Collection name is not on the allow-list.
    InvalidCollection = 8,
    /// Subtitle is repeated inside the title.
    RepeatedSubtitle = 9,
    /// Title contains a price.
    CurrencyInTitle = 10,
    /// Title contains long runs of punctuation.
    ExcessivePunctuation = 11,
    /// No publisher, or an empty publisher entry.
    NoPublisher = 12,
    /// Author name is too short to be a name.
    ShortAuthorName = 13,
    /// Author name starts with "et al".
    EtAlAuthorName = 14,
    /// Author name contains a "&na;" placeholder.
    NAInAuthorName = 15,
    /// Author name consists of whitespace only.
    WhitespaceAuthor = 16,
    /// DOI contains a double slash.
    RepeatedSlash = 17,
    /// Record has no URL.
    NoURL = 18,
    /// ISSN is not in `NNNN-NNNX` form.
    NonCanonicalISSN = 19,
    /// Author name contains an HTML character entity.
    HTMLEntityInAuthorName = 20,
}

impl Kind {
    /// All kinds in discriminant order.
    pub const ALL: [Kind; 21] = [
        Kind::KeyTooLong,
        Kind::InvalidStartPage,
        Kind::InvalidEndPage,
        Kind::EndPageBeforeStartPage,
        Kind::InvalidURL,
        Kind::SuspiciousPageCount,
        Kind::PublicationDateTooEarly,
        Kind::PublicationDateTooLate,
        Kind::InvalidCollection,
        Kind::RepeatedSubtitle,
        Kind::CurrencyInTitle,
        Kind::ExcessivePunctuation,
        Kind::NoPublisher,
        Kind::ShortAuthorName,
        Kind::EtAlAuthorName,
        Kind::NAInAuthorName,
        Kind::WhitespaceAuthor,
        Kind::RepeatedSlash,
        Kind::NoURL,
        Kind::NonCanonicalISSN,
        Kind::HTMLEntityInAuthorName,
    ];

    /// Canonical name, used in TSV and JSON output.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Kind::KeyTooLong => "KeyTooLong",
            Kind::InvalidStartPage => "InvalidStartPage",
            Kind::InvalidEndPage => "InvalidEndPage",
            Kind::EndPageBeforeStartPage => "EndPageBeforeStartPage",
            Kind::InvalidURL => "InvalidURL",
            Kind::SuspiciousPageCount => "SuspiciousPageCount",
            Kind::PublicationDateTooEarly => "PublicationDateTooEarly",
            Kind::PublicationDateTooLate => "PublicationDateTooLate",
            Kind::InvalidCollection => "InvalidCollection",
            Kind::RepeatedSubtitle => "RepeatedSubtitle",
            Kind::CurrencyInTitle => "CurrencyInTitle",
            Kind::ExcessivePunctuation => "ExcessivePunctuation",
            Kind::NoPublisher => "NoPublisher",
            Kind::ShortAuthorName => "ShortAuthorName",
            Kind::EtAlAuthorName => "EtAlAuthorName",
            Kind::NAInAuthorName => "NAInAuthorName",
            Kind::WhitespaceAuthor => "WhitespaceAuthor",
            Kind::RepeatedSlash => "RepeatedSlash",
            Kind::NoURL => "NoURL",
            Kind::NonCanonicalISSN => "NonCanonicalISSN",
            Kind::HTMLEntityInAuthorName => "HTMLEntityInAuthorName",
        }
    }

    /// Stable numeric identity.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// All kind names, sorted alphabetically.
    #[must_use]
    pub fn sorted_names() -> Vec<&'static str> {
        let mut names: Vec<_> = Kind::ALL.iter().map(|k| k.name()).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Kind {
    type Err = LintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Kind::ALL
            .iter()
            .copied()
            .find(|k| k.name() == s)
            .ok_or_else(|| LintError::UnknownKind(s.to_string()))
    }
}

/// One concrete defect found in one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    /// Defect category.
    pub kind: Kind,
    /// Identifier of the offending record.
    pub record_id: String,
    /// Free-text detail, often the offending value.
    pub message: String,
}

impl Issue {
    /// Create a new issue.
    pub fn new(kind: Kind, record_id: impl Into<String>, message: impl Into<String>) -> Self {
        Issue {
            kind,
            record_id: record_id.into(),
            message: message.into(),
        }
    }

    /// Render as a `RecordID<TAB>Kind<TAB>Message` line, without newline.
    #[must_use]
    pub fn to_tsv(&self) -> String {
        format!("{}\t{}\t{}", self.record_id, self.kind, self.message)
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.record_id, self.kind, self.message)
    }
}
