//! Intermediate schema records.
//!
//! Only the fields the rules inspect are decoded; every other key in the JSON
//! object is ignored. All fields default to empty values so that sparse
//! records still decode.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer};
use std::fmt;

/// A normalized bibliographic record, one per input line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Record {
    /// Record identifier, used as storage key downstream.
    #[serde(rename = "finc.record_id", default)]
    pub record_id: String,

    /// Publication date, if any.
    #[serde(rename = "x.date", default, deserialize_with = "deserialize_date")]
    pub date: Option<NaiveDate>,

    /// Volume.
    #[serde(rename = "rft.volume", default)]
    pub volume: String,

    /// Issue number (of the journal, not a quality issue).
    #[serde(rename = "rft.issue", default)]
    pub issue: String,

    /// Start page.
    #[serde(rename = "rft.spage", default)]
    pub start_page: String,

    /// End page.
    #[serde(rename = "rft.epage", default)]
    pub end_page: String,

    /// Mega collection name.
    #[serde(rename = "finc.mega_collection", default)]
    pub mega_collection: String,

    /// Article title.
    #[serde(rename = "rft.atitle", default)]
    pub article_title: String,

    /// Article subtitle.
    #[serde(rename = "x.subtitle", default)]
    pub article_subtitle: String,

    /// Authors.
    #[serde(rename = "authors", default)]
    pub authors: Vec<Author>,

    /// Publisher names.
    #[serde(rename = "rft.pub", default)]
    pub publishers: Vec<String>,

    /// DOI.
    #[serde(rename = "doi", default)]
    pub doi: String,

    /// Links to the item.
    #[serde(rename = "url", default)]
    pub urls: Vec<String>,

    /// Print ISSNs.
    #[serde(rename = "rft.issn", default)]
    pub issn: Vec<String>,

    /// Electronic ISSNs.
    #[serde(rename = "rft.eissn", default)]
    pub eissn: Vec<String>,
}

impl Record {
    /// Decode a record from one line of JSON.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if the line is not a valid record object.
    pub fn from_json_slice(line: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(line)
    }

    /// Print and electronic ISSNs, in that order.
    pub fn all_issns(&self) -> impl Iterator<Item = &str> {
        self.issn
            .iter()
            .chain(self.eissn.iter())
            .map(String::as_str)
    }
}

/// One author entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Author {
    /// Authority identifier.
    #[serde(rename = "x.id", default)]
    pub id: String,
    /// Full name, when given as a single string.
    #[serde(rename = "rft.au", default)]
    pub name: String,
    /// Last name.
    #[serde(rename = "rft.aulast", default)]
    pub last_name: String,
    /// First name.
    #[serde(rename = "rft.aufirst", default)]
    pub first_name: String,
    /// Initials.
    #[serde(rename = "rft.auinit", default)]
    pub initials: String,
    /// Corporate author.
    #[serde(rename = "rft.aucorp", default)]
    pub corporation: String,
}

impl Author {
    /// Author with just a full name.
    pub fn named(name: impl Into<String>) -> Self {
        Author {
            name: name.into(),
            ..Author::default()
        }
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.name.is_empty() {
            return f.write_str(&self.name);
        }
        match (self.last_name.is_empty(), self.first_name.is_empty()) {
            (false, false) => write!(f, "{}, {}", self.last_name, self.first_name),
            (false, true) => f.write_str(&self.last_name),
            (true, false) => f.write_str(&self.first_name),
            (true, true) => f.write_str(&self.corporation),
        }
    }
}

/// Accept `YYYY-MM-DD` as well as full RFC 3339 timestamps; `null` and the
/// empty string mean no date.
fn deserialize_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(Some(date));
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| Some(dt.date_naive()))
        .map_err(|e| serde::de::Error::custom(format!("invalid date {raw:?}: {e}")))
}
