//! Wire/boundary support for the laboratory operations toolkit.
//!
//! This crate provides **wire models** and **format/translation helpers** for every
//! document that crosses the toolkit boundary:
//! - Emedgene case documents and sample searches (JSON)
//! - Phenotips patient features (JSON)
//! - HiFi WGS workflow sample sheets (JSON)
//! - PED pedigree files (tab-separated text)
//! - GeneYX assignment payloads, responses and credential files (JSON/YAML)
//!
//! This crate focuses on:
//! - strict shape validation at the boundary, reporting the failing path
//! - serialisation/deserialisation
//! - translation between domain primitives and wire structs
//!
//! It contains no resolution logic and performs no network I/O.

pub mod case;
pub mod geneyx;
pub mod pedigree;
pub mod phenotips;
pub mod samplesheet;
pub mod search;

pub use case::{
    phenotips_id_from_notes, CaseDocument, CaseMember, CaseRecord, Gender, MemberLabel, Phenotype,
};
pub use geneyx::{
    samples_from_response, AssignmentOutcome, GeneyxCredentials, GroupAssignmentRequest,
};
pub use pedigree::{PedMember, Pedigree, SexCode};
pub use phenotips::PhenotipsPatient;
pub use samplesheet::{FamilyBlock, FamilySheet, FamilySheetSample, SingletonSheet};
pub use search::SampleSearch;

/// Errors returned by the `records` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum RecordsError {
    /// A document does not have the shape the toolkit expects.
    #[error("{document} schema mismatch at {path}: {message}")]
    SchemaMismatch {
        document: &'static str,
        path: String,
        message: String,
    },

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("invalid YAML: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    /// A value is well-formed but outside the recognised vocabulary.
    #[error("unrecognized input: {0}")]
    Unrecognized(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Type alias for Results that can fail with a [`RecordsError`].
pub type RecordsResult<T> = Result<T, RecordsError>;

/// Deserialize `T` from JSON text, reporting the failing field path on mismatch.
pub(crate) fn from_json_with_path<T>(document: &'static str, text: &str) -> RecordsResult<T>
where
    T: serde::de::DeserializeOwned,
{
    let mut deserializer = serde_json::Deserializer::from_str(text);
    serde_path_to_error::deserialize::<_, T>(&mut deserializer)
        .map_err(|err| schema_mismatch(document, err))
}

/// Deserialize `T` from an already-parsed JSON value, reporting the failing path.
pub(crate) fn from_value_with_path<T>(
    document: &'static str,
    value: &serde_json::Value,
) -> RecordsResult<T>
where
    T: serde::de::DeserializeOwned,
{
    serde_path_to_error::deserialize::<_, T>(value)
        .map_err(|err| schema_mismatch(document, err))
}

pub(crate) fn schema_mismatch<E: std::fmt::Display>(
    document: &'static str,
    err: serde_path_to_error::Error<E>,
) -> RecordsError {
    let path = err.path().to_string();
    let source = err.into_inner();
    let path = if path.is_empty() || path == "." {
        "<root>".to_string()
    } else {
        path
    };
    RecordsError::SchemaMismatch {
        document,
        path,
        message: source.to_string(),
    }
}
