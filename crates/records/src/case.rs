//! Emedgene case document wire models and boundary validation.
//!
//! A case document is the JSON returned by the case-management API for a single case.
//! Two parts of it matter to the toolkit:
//! - `patients`, a mapping from family-role label to member entry (the case record)
//! - `notes`, free text that carries the Phenotips identifier of the proband
//!
//! Upstream payloads are loosely shaped, so validation is explicit: every principal
//! member must be an object carrying a `fastq_sample` key, otherwise parsing fails with
//! [`RecordsError::SchemaMismatch`] naming the offending path. Unknown keys are
//! tolerated because the upstream service adds fields freely.

use crate::{from_value_with_path, RecordsError, RecordsResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Label under which non-principal relatives are listed.
pub const OTHER_LABEL: &str = "other";

// ============================================================================
// Public domain-level types
// ============================================================================

/// Gender as reported by the case-management service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Case-record spelling (`Male` / `Female`).
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }

    /// Sample-sheet spelling (`MALE` / `FEMALE`).
    pub fn sheet_value(self) -> &'static str {
        match self {
            Gender::Male => "MALE",
            Gender::Female => "FEMALE",
        }
    }

    /// Parse the spellings used by case records and sample lists.
    ///
    /// `null`, `Unknown` and empty strings mean "not reported" and map to `Ok(None)`.
    pub fn parse_reported(value: &str) -> RecordsResult<Option<Self>> {
        match value.trim() {
            "Male" | "MALE" | "male" => Ok(Some(Gender::Male)),
            "Female" | "FEMALE" | "female" => Ok(Some(Gender::Female)),
            "" | "null" | "None" | "Unknown" | "unknown" => Ok(None),
            other => Err(RecordsError::Unrecognized(format!("gender '{other}'"))),
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Family-role label of a case member.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum MemberLabel {
    Proband,
    Mother,
    Father,
    /// A principal entry under a label the toolkit has no role for.
    Unlisted(String),
}

impl MemberLabel {
    fn from_key(key: &str) -> Self {
        match key {
            "proband" => MemberLabel::Proband,
            "mother" => MemberLabel::Mother,
            "father" => MemberLabel::Father,
            other => MemberLabel::Unlisted(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            MemberLabel::Proband => "proband",
            MemberLabel::Mother => "mother",
            MemberLabel::Father => "father",
            MemberLabel::Unlisted(label) => label,
        }
    }
}

/// A single phenotype entry attached to a member.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Phenotype {
    pub name: Option<String>,
}

/// A principal family member of a case.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaseMember {
    pub label: MemberLabel,
    /// Sequencing sample bound to this member; `None` when the key is present but null.
    pub fastq_sample: Option<String>,
    pub gender: Option<Gender>,
    /// Gender text outside the `Male`/`Female` vocabulary, kept as received.
    pub unrecognized_gender: Option<String>,
    pub phenotypes: Vec<Phenotype>,
}

/// Validated `patients` section of a case document.
///
/// Principal members keep the order in which the upstream document lists them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaseRecord {
    members: Vec<CaseMember>,
    other_populated: bool,
}

impl CaseRecord {
    /// Validate a `patients` mapping.
    ///
    /// # Errors
    ///
    /// Returns [`RecordsError::SchemaMismatch`] if `patients` is not a mapping, or if any
    /// principal entry is not an object with a `fastq_sample` key, or has an unexpected
    /// phenotype shape. A gender outside the known vocabulary is not an error: the member
    /// keeps it in [`CaseMember::unrecognized_gender`].
    pub fn from_value(patients: &Value) -> RecordsResult<Self> {
        let entries = patients.as_object().ok_or_else(|| RecordsError::SchemaMismatch {
            document: "case",
            path: "patients".into(),
            message: "expected a mapping of family members".into(),
        })?;

        let mut members = Vec::with_capacity(entries.len());
        let mut other_populated = false;

        for (key, entry) in entries {
            if key == OTHER_LABEL {
                other_populated = !is_empty_entry(entry);
                continue;
            }

            let path = format!("patients.{key}");
            let object = entry.as_object().ok_or_else(|| RecordsError::SchemaMismatch {
                document: "case",
                path: path.clone(),
                message: "expected a member object".into(),
            })?;
            if !object.contains_key("fastq_sample") {
                return Err(RecordsError::SchemaMismatch {
                    document: "case",
                    path,
                    message: "member has no fastq_sample".into(),
                });
            }

            let wire: CaseMemberWire =
                from_value_with_path("case", entry).map_err(|e| prefix_path(e, &path))?;
            let (gender, unrecognized_gender) = reported_gender(wire.gender);

            members.push(CaseMember {
                label: MemberLabel::from_key(key),
                fastq_sample: wire.fastq_sample,
                gender,
                unrecognized_gender,
                phenotypes: wire
                    .phenotypes
                    .unwrap_or_default()
                    .into_iter()
                    .map(|p| Phenotype { name: p.name })
                    .collect(),
            });
        }

        Ok(Self {
            members,
            other_populated,
        })
    }

    /// Principal members (everything except `other`), in document order.
    pub fn members(&self) -> &[CaseMember] {
        &self.members
    }

    /// Number of principal members.
    pub fn principal_count(&self) -> usize {
        self.members.len()
    }

    /// Whether the `other` entry lists anyone.
    pub fn has_populated_other(&self) -> bool {
        self.other_populated
    }

    /// The member listed under `proband`, if any.
    pub fn proband(&self) -> Option<&CaseMember> {
        self.members
            .iter()
            .find(|m| m.label == MemberLabel::Proband)
    }
}

/// A full case document with its validated case record.
#[derive(Clone, Debug, PartialEq)]
pub struct CaseDocument {
    raw: Value,
    record: Option<CaseRecord>,
    notes: Option<String>,
}

impl CaseDocument {
    /// Parse a case document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`RecordsError::InvalidJson`] if the text is not JSON, or
    /// [`RecordsError::SchemaMismatch`] if the `patients` section fails validation.
    pub fn parse(json_text: &str) -> RecordsResult<Self> {
        let raw: Value = serde_json::from_str(json_text)?;
        Self::from_value(raw)
    }

    /// Validate an already-decoded case document.
    pub fn from_value(raw: Value) -> RecordsResult<Self> {
        let record = match raw.get("patients") {
            Some(patients) => Some(CaseRecord::from_value(patients)?),
            None => None,
        };
        let notes = raw
            .get("notes")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(Self { raw, record, notes })
    }

    /// The document exactly as received, for diagnostics.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// The validated `patients` section; `None` when the document has none.
    pub fn record(&self) -> Option<&CaseRecord> {
        self.record.as_ref()
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Phenotips identifier embedded in the case notes.
    pub fn phenotips_id(&self) -> Option<String> {
        self.notes().and_then(phenotips_id_from_notes)
    }
}

/// Extract a Phenotips identifier (`P` followed by seven characters, e.g. `P0001234`)
/// from case notes.
///
/// The notes either consist of the identifier alone, or contain it at the start of a
/// line segment beginning with `P0`.
pub fn phenotips_id_from_notes(notes: &str) -> Option<String> {
    const ID_LEN: usize = 8;

    let trimmed = notes.trim();
    if trimmed.starts_with("P00") && trimmed.len() == ID_LEN {
        return Some(trimmed.to_string());
    }

    let start = notes.find("P0")?;
    let candidate = notes[start..]
        .split(['\n', '\r'])
        .next()
        .unwrap_or_default()
        .trim_end();
    (candidate.len() == ID_LEN).then(|| candidate.to_string())
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Deserialize)]
struct CaseMemberWire {
    fastq_sample: Option<String>,
    #[serde(default)]
    gender: Option<Value>,
    #[serde(default)]
    phenotypes: Option<Vec<PhenotypeWire>>,
}

#[derive(Deserialize)]
struct PhenotypeWire {
    #[serde(default)]
    name: Option<String>,
}

/// Split a member's gender into a known value and, when it is outside the vocabulary,
/// the text as received.
fn reported_gender(value: Option<Value>) -> (Option<Gender>, Option<String>) {
    match value {
        None | Some(Value::Null) => (None, None),
        Some(Value::String(text)) => match Gender::parse_reported(&text) {
            Ok(gender) => (gender, None),
            Err(_) => (None, Some(text)),
        },
        Some(other) => (None, Some(other.to_string())),
    }
}

fn is_empty_entry(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::String(text) => text.trim().is_empty(),
        _ => false,
    }
}

fn prefix_path(err: RecordsError, prefix: &str) -> RecordsError {
    match err {
        RecordsError::SchemaMismatch {
            document,
            path,
            message,
        } => {
            let path = if path == "<root>" {
                prefix.to_string()
            } else {
                format!("{prefix}.{path}")
            };
            RecordsError::SchemaMismatch {
                document,
                path,
                message,
            }
        }
        other => other,
    }
}
