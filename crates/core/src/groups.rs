//! GeneYX sample groups and the subject-to-serial join.

use crate::{LabError, LabResult};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// Group a GeneYX sample can be assigned to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GeneyxGroup {
    Pragmatiq,
    Decodeur,
    ControleParent,
    Validation,
}

impl GeneyxGroup {
    /// Code sent in the assignment request.
    pub fn code(self) -> &'static str {
        match self {
            GeneyxGroup::Pragmatiq => "prag",
            GeneyxGroup::Decodeur => "decode",
            GeneyxGroup::ControleParent => "controle",
            GeneyxGroup::Validation => "validation",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            GeneyxGroup::Pragmatiq => "Pragmatiq",
            GeneyxGroup::Decodeur => "Decodeur",
            GeneyxGroup::ControleParent => "ControleParent",
            GeneyxGroup::Validation => "Validation",
        }
    }
}

impl std::fmt::Display for GeneyxGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

impl std::str::FromStr for GeneyxGroup {
    type Err = LabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "prag" => Ok(GeneyxGroup::Pragmatiq),
            "decode" => Ok(GeneyxGroup::Decodeur),
            "controle" => Ok(GeneyxGroup::ControleParent),
            "validation" => Ok(GeneyxGroup::Validation),
            other => Err(LabError::UnrecognizedInput(format!(
                "GeneYX group code '{other}' (expected prag, decode, controle or validation)"
            ))),
        }
    }
}

#[derive(Deserialize)]
struct ExportRow {
    id: String,
    subject: String,
}

/// Serial numbers of the exported GeneYX samples whose subject is in `subjects`.
///
/// `export` is a header-less `ID,Subject` CSV export of every sample on GeneYX. Serials
/// keep the export order and each `(ID, Subject)` pair is reported once.
pub fn serials_for_subjects(export: &Path, subjects: &[String]) -> LabResult<Vec<String>> {
    let wanted: HashSet<&str> = subjects.iter().map(|s| s.trim()).collect();

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_path(export)?;

    let mut seen = HashSet::new();
    let mut serials = Vec::new();
    for result in reader.deserialize() {
        let row: ExportRow = result?;
        if !wanted.contains(row.subject.as_str()) {
            continue;
        }
        if seen.insert((row.id.clone(), row.subject)) {
            serials.push(row.id);
        }
    }

    tracing::info!(
        requested = wanted.len(),
        matched = serials.len(),
        "subjects joined against GeneYX export"
    );
    Ok(serials)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn codes_map_to_display_names() {
        let cases = [
            ("prag", "Pragmatiq"),
            ("decode", "Decodeur"),
            ("controle", "ControleParent"),
            ("validation", "Validation"),
        ];
        for (code, name) in cases {
            let group: GeneyxGroup = code.parse().unwrap();
            assert_eq!(group.code(), code);
            assert_eq!(group.display_name(), name);
        }
    }

    #[test]
    fn unknown_code_is_unrecognized() {
        let err = "research".parse::<GeneyxGroup>().expect_err("unknown code");
        assert!(matches!(err, LabError::UnrecognizedInput(_)));
    }

    #[test]
    fn join_keeps_export_order_and_dedupes() {
        let dir = TempDir::new().unwrap();
        let export = dir.path().join("geneYXnamesList.csv");
        std::fs::write(
            &export,
            "VCF-3,GM003\nVCF-1,GM001\nVCF-9,GM009\nVCF-1,GM001\nVCF-2, GM002\n",
        )
        .unwrap();
        let subjects = vec!["GM001".to_string(), "GM002".to_string(), "GM003".to_string()];

        let serials = serials_for_subjects(&export, &subjects).unwrap();

        assert_eq!(serials, vec!["VCF-3", "VCF-1", "VCF-2"]);
    }
}
