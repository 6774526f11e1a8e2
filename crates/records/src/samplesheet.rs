//! HiFi human WGS workflow sample sheets.
//!
//! Two shapes are produced:
//! - a flat singleton sheet whose keys are prefixed `humanwgs_singleton.`
//! - a family sheet whose keys are prefixed `humanwgs_family.`, listing every member
//!   with the proband first
//!
//! Sheets are rendered with four-space indentation and a fixed key order, so the
//! same input always yields byte-identical output.

use crate::{from_json_with_path, RecordsError, RecordsResult};
use serde::{Deserialize, Deserializer, Serialize};

/// Input sheet for a single-sample run of the workflow.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingletonSheet {
    #[serde(rename = "humanwgs_singleton.sample_id")]
    pub sample_id: String,

    /// `MALE`, `FEMALE` or null when the gender is not known.
    #[serde(rename = "humanwgs_singleton.sex")]
    pub sex: Option<String>,

    #[serde(rename = "humanwgs_singleton.hifi_reads")]
    pub hifi_reads: Vec<String>,

    #[serde(rename = "humanwgs_singleton.phenotypes")]
    pub phenotypes: String,

    #[serde(rename = "humanwgs_singleton.ref_map_file")]
    pub ref_map_file: String,

    #[serde(rename = "humanwgs_singleton.backend")]
    pub backend: String,
}

impl SingletonSheet {
    pub fn render(&self) -> RecordsResult<String> {
        to_pretty_json(self)
    }

    pub fn parse(json_text: &str) -> RecordsResult<Self> {
        from_json_with_path("singleton sample sheet", json_text)
    }
}

/// Input sheet for a joint family run of the workflow.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilySheet {
    #[serde(rename = "humanwgs_family.family")]
    pub family: FamilyBlock,

    /// Proband phenotypes (comma-joined HPO terms).
    #[serde(rename = "humanwgs_family.phenotypes", default)]
    pub phenotypes: String,

    #[serde(rename = "humanwgs_family.ref_map_file", default)]
    pub ref_map_file: String,

    #[serde(rename = "humanwgs_family.tertiary_map_file", default)]
    pub tertiary_map_file: String,

    #[serde(rename = "humanwgs_family.backend", default)]
    pub backend: String,
}

/// The `family` block of a family sheet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyBlock {
    pub family_id: String,
    pub samples: Vec<FamilySheetSample>,
}

/// One member of a family sheet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilySheetSample {
    pub sample_id: String,

    #[serde(default)]
    pub sex: Option<String>,

    pub hifi_reads: Vec<String>,

    #[serde(default)]
    pub fail_reads: Vec<String>,

    #[serde(deserialize_with = "deserialize_affected")]
    pub affected: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub father_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mother_id: Option<String>,
}

impl FamilySheet {
    pub fn render(&self) -> RecordsResult<String> {
        to_pretty_json(self)
    }

    /// Parse a family sheet, including sheets written by earlier tooling where
    /// `affected` is the string `"True"` / `"False"`.
    pub fn parse(json_text: &str) -> RecordsResult<Self> {
        from_json_with_path("family sample sheet", json_text)
    }

    /// The proband entry (always listed first).
    pub fn proband(&self) -> RecordsResult<&FamilySheetSample> {
        self.family.samples.first().ok_or_else(|| {
            RecordsError::InvalidInput(format!(
                "family sheet {} lists no samples",
                self.family.family_id
            ))
        })
    }
}

fn to_pretty_json<T: Serialize>(value: &T) -> RecordsResult<String> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer)?;
    String::from_utf8(out).map_err(|e| RecordsError::InvalidInput(e.to_string()))
}

fn deserialize_affected<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Affected {
        Flag(bool),
        Text(String),
    }

    match Affected::deserialize(deserializer)? {
        Affected::Flag(flag) => Ok(flag),
        Affected::Text(text) => match text.as_str() {
            "True" | "true" => Ok(true),
            "False" | "false" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "affected must be a boolean, got '{other}'"
            ))),
        },
    }
}
