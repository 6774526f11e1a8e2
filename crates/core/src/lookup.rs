//! Seam between sample resolution and the external case and phenotype services.
//!
//! Core code resolves samples through [`CaseLookup`] only. The HTTP implementation lives in
//! the clients crate; tests use in-memory fakes.

use crate::LabResult;
use records::phenotips_id_from_notes;
use serde_json::Value;

/// Case matched by a sample search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaseMatch {
    /// The most recent matching case.
    pub case_id: String,
    /// Number of cases the search returned.
    pub candidates: u64,
}

impl CaseMatch {
    pub fn is_ambiguous(&self) -> bool {
        self.candidates > 1
    }
}

/// Blocking access to case documents and phenotype terms.
///
/// Methods take `&mut self` so implementations can hold session state such as an
/// authorization token.
pub trait CaseLookup {
    /// Case containing `sample`, or `None` if the sample has no case.
    fn find_case(&mut self, sample: &str) -> LabResult<Option<CaseMatch>>;

    /// Full case document, as received.
    fn case_document(&mut self, case_id: &str) -> LabResult<Value>;

    /// Observed HPO terms of a Phenotips patient, comma-joined.
    fn hpo_terms(&mut self, phenotips_id: &str) -> LabResult<String>;
}

/// Observed HPO terms recorded for `sample`, found through its most recent case.
///
/// Returns `None` when the sample has no case or the case notes carry no Phenotips
/// identifier.
pub fn phenotypes_for_sample<L: CaseLookup + ?Sized>(
    lookup: &mut L,
    sample: &str,
) -> LabResult<Option<String>> {
    let Some(case) = lookup.find_case(sample)? else {
        tracing::warn!(sample, "no case found");
        return Ok(None);
    };
    let document = lookup.case_document(&case.case_id)?;
    let phenotips_id = document
        .get("notes")
        .and_then(Value::as_str)
        .and_then(phenotips_id_from_notes);
    match phenotips_id {
        Some(id) => Ok(Some(lookup.hpo_terms(&id)?)),
        None => {
            tracing::warn!(sample, case = %case.case_id, "case notes carry no Phenotips identifier");
            Ok(None)
        }
    }
}
