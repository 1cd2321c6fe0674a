//! Common test helpers shared across the integration test suite.

use chrono::NaiveDate;
use islint::{LintConfig, RuleSet};
use serde_json::{json, Value};
use std::collections::HashSet;

/// Collection name accepted by [`test_config`].
pub const COLLECTION: &str = "Example Journals";

/// Configuration with a fixed reference date and a one-entry allow-list.
pub fn test_config() -> LintConfig {
    let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let allowed: HashSet<String> = [COLLECTION.to_string()].into_iter().collect();
    LintConfig::with_reference_date(today, Some(allowed))
}

/// All default rules over [`test_config`].
pub fn test_rules() -> RuleSet {
    RuleSet::new(test_config())
}

/// A record that passes every rule.
pub fn valid_record(id: &str) -> Value {
    json!({
        "finc.record_id": id,
        "finc.mega_collection": COLLECTION,
        "x.date": "2010-04-01T00:00:00Z",
        "rft.atitle": "Measuring the quality of bibliographic metadata",
        "rft.spage": "1",
        "rft.epage": "12",
        "authors": [{"rft.aulast": "Doe", "rft.aufirst": "Jane"}],
        "rft.pub": ["Example Press"],
        "doi": "10.1000/182",
        "url": ["https://doi.org/10.1000/182"],
        "rft.issn": ["1234-567X"],
    })
}

/// Serialize records as newline-delimited JSON.
pub fn to_ldj(records: &[Value]) -> String {
    let mut out = String::new();
    for record in records {
        out.push_str(&record.to_string());
        out.push('\n');
    }
    out
}

/// A corpus of `n` records where every third one has a defect.
#[allow(dead_code)]
pub fn mixed_corpus(n: usize) -> String {
    let records: Vec<Value> = (0..n)
        .map(|i| {
            let mut record = valid_record(&format!("ai-{i}"));
            match i % 6 {
                0 => record["doi"] = json!("10.1000//182"),
                3 => {
                    record["rft.spage"] = json!("100");
                    record["rft.epage"] = json!("50");
                    record["url"] = json!([]);
                },
                _ => {},
            }
            record
        })
        .collect();
    to_ldj(&records)
}
