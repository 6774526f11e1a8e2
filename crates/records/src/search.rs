//! Emedgene sample-search responses.
//!
//! Searching a sample name returns every case that references it. Cases are listed
//! oldest first and the case identifier (`EMG…`) is carried in each hit's `note`.

use crate::{from_json_with_path, RecordsResult};
use serde::Deserialize;

/// Parsed response of a sample search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SampleSearch {
    total: u64,
    case_ids: Vec<String>,
}

impl SampleSearch {
    /// Parse the JSON body of a sample search.
    pub fn parse(json_text: &str) -> RecordsResult<Self> {
        let wire: SampleSearchWire = from_json_with_path("sample search", json_text)?;
        Ok(Self {
            total: wire.total,
            case_ids: wire.hits.into_iter().filter_map(|h| h.note).collect(),
        })
    }

    /// Number of cases the service reported.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Whether the sample is referenced by more than one case.
    pub fn is_ambiguous(&self) -> bool {
        self.total > 1
    }

    /// The most recent case referencing the sample, if any.
    pub fn latest_case_id(&self) -> Option<&str> {
        if self.total == 0 {
            return None;
        }
        self.case_ids
            .last()
            .map(String::as_str)
            .filter(|id| !id.trim().is_empty())
    }
}

#[derive(Deserialize)]
struct SampleSearchWire {
    total: u64,
    #[serde(default)]
    hits: Vec<SearchHitWire>,
}

#[derive(Deserialize)]
struct SearchHitWire {
    #[serde(default)]
    note: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RecordsError;

    #[test]
    fn no_hits_means_no_case() {
        let search = SampleSearch::parse(r#"{"total": 0, "hits": []}"#).unwrap();
        assert_eq!(search.latest_case_id(), None);
        assert!(!search.is_ambiguous());
    }

    #[test]
    fn single_hit_returns_its_note() {
        let search =
            SampleSearch::parse(r#"{"total": 1, "hits": [{"note": "EMG123456"}]}"#).unwrap();
        assert_eq!(search.latest_case_id(), Some("EMG123456"));
    }

    #[test]
    fn several_hits_return_the_most_recent() {
        let search = SampleSearch::parse(
            r#"{"total": 2, "hits": [{"note": "EMG000001"}, {"note": "EMG000002"}]}"#,
        )
        .unwrap();
        assert!(search.is_ambiguous());
        assert_eq!(search.latest_case_id(), Some("EMG000002"));
    }

    #[test]
    fn missing_total_is_schema_mismatch() {
        let err = SampleSearch::parse(r#"{"hits": []}"#).expect_err("total is required");
        assert!(matches!(err, RecordsError::SchemaMismatch { .. }));
    }
}
