//! Sample identity and pedigree-role resolution.
//!
//! Given a validated case record and a target sample name, [`CaseResolver`] determines the
//! family status of the case and the role, gender and affected status of the target. The
//! result is always returned with the diagnostics raised along the way; questionable data
//! never aborts resolution, and nothing here writes files.
//!
//! Decodeur cohort samples bypass the case record: their family role is encoded in a
//! two-digit suffix of the sample name.

use crate::config::CoreConfig;
use crate::constants::HEALTHY_PHENOTYPE;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::{LabError, LabResult};
use records::{CaseDocument, CaseMember, CaseRecord, Gender, MemberLabel, Phenotype};
use serde_json::Value;

/// Family structure of the case a sample belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FamilyStatus {
    Singleton,
    Duo,
    Trio,
    Decodeur,
    Unknown,
}

impl FamilyStatus {
    /// Status implied by the number of principal members of a case.
    pub fn from_principal_count(count: usize) -> Self {
        match count {
            1 => FamilyStatus::Singleton,
            2 => FamilyStatus::Duo,
            3 => FamilyStatus::Trio,
            _ => FamilyStatus::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FamilyStatus::Singleton => "Singleton",
            FamilyStatus::Duo => "Duo",
            FamilyStatus::Trio => "Trio",
            FamilyStatus::Decodeur => "Decodeur",
            FamilyStatus::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for FamilyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FamilyStatus {
    type Err = LabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Singleton" => Ok(FamilyStatus::Singleton),
            "Duo" => Ok(FamilyStatus::Duo),
            "Trio" => Ok(FamilyStatus::Trio),
            "Decodeur" => Ok(FamilyStatus::Decodeur),
            "Unknown" => Ok(FamilyStatus::Unknown),
            other => Err(LabError::UnrecognizedInput(format!(
                "family status '{other}'"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParentRole {
    Mother,
    Father,
}

impl ParentRole {
    pub fn as_str(self) -> &'static str {
        match self {
            ParentRole::Mother => "mother",
            ParentRole::Father => "father",
        }
    }

    /// Gender a parent in this role is expected to have.
    pub fn expected_gender(self) -> Gender {
        match self {
            ParentRole::Mother => Gender::Female,
            ParentRole::Father => Gender::Male,
        }
    }
}

impl std::fmt::Display for ParentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role of a sample within its family.
///
/// Parents carry the proband they are annotated against. The `"father of GM001"` text is
/// produced by `Display` for people reading logs and sample lists; code works with the
/// structured pair.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RoleBinding {
    Unknown,
    Proband,
    Parent {
        parent: ParentRole,
        proband_id: Option<String>,
    },
}

impl RoleBinding {
    /// Bare role token: `proband`, `mother`, `father` or `Unknown`.
    pub fn token(&self) -> &'static str {
        match self {
            RoleBinding::Unknown => "Unknown",
            RoleBinding::Proband => "proband",
            RoleBinding::Parent { parent, .. } => parent.as_str(),
        }
    }

    pub fn parent(&self) -> Option<ParentRole> {
        match self {
            RoleBinding::Parent { parent, .. } => Some(*parent),
            _ => None,
        }
    }

    pub fn proband_id(&self) -> Option<&str> {
        match self {
            RoleBinding::Parent { proband_id, .. } => proband_id.as_deref(),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, RoleBinding::Unknown)
    }

    /// Rebuild a binding from the separate role and proband columns of a sample list.
    pub fn from_parts(token: &str, proband_id: Option<&str>) -> LabResult<Self> {
        let proband_id = proband_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string);
        match token.trim() {
            "proband" => Ok(RoleBinding::Proband),
            "mother" => Ok(RoleBinding::Parent {
                parent: ParentRole::Mother,
                proband_id,
            }),
            "father" => Ok(RoleBinding::Parent {
                parent: ParentRole::Father,
                proband_id,
            }),
            "Unknown" | "" => Ok(RoleBinding::Unknown),
            other => Err(LabError::UnrecognizedInput(format!("family role '{other}'"))),
        }
    }
}

impl std::fmt::Display for RoleBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoleBinding::Parent {
                parent,
                proband_id: Some(proband),
            } => write!(f, "{parent} of {proband}"),
            other => f.write_str(other.token()),
        }
    }
}

/// Resolved status of one sample.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaseStatus {
    pub status: FamilyStatus,
    pub role: RoleBinding,
    pub gender: Option<Gender>,
    /// `None` when the sample is not bound to any member.
    pub affected: Option<bool>,
}

impl CaseStatus {
    pub fn unknown() -> Self {
        Self {
            status: FamilyStatus::Unknown,
            role: RoleBinding::Unknown,
            gender: None,
            affected: None,
        }
    }

    /// Status assumed for a sample that has no case: a validation run, always an
    /// affected singleton proband.
    pub fn validation_singleton() -> Self {
        Self {
            status: FamilyStatus::Singleton,
            role: RoleBinding::Proband,
            gender: None,
            affected: Some(true),
        }
    }
}

/// A resolved status together with the findings raised while resolving it.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolution {
    pub status: CaseStatus,
    pub diagnostics: Vec<Diagnostic>,
}

impl Resolution {
    fn without_diagnostics(status: CaseStatus) -> Self {
        Self {
            status,
            diagnostics: Vec::new(),
        }
    }
}

/// Resolves samples against case records.
#[derive(Clone, Debug)]
pub struct CaseResolver {
    decodeur_prefix: String,
}

impl CaseResolver {
    pub fn new(cfg: &CoreConfig) -> Self {
        Self {
            decodeur_prefix: cfg.decodeur_prefix().to_string(),
        }
    }

    /// Resolve `target` from a raw case document.
    ///
    /// Decodeur samples are resolved from their name and the document is ignored.
    ///
    /// # Errors
    ///
    /// Returns `LabError::SchemaMismatch` (carrying `raw`) if a principal member fails
    /// boundary validation, and `LabError::UnrecognizedInput` for a Decodeur name with an
    /// unknown suffix.
    pub fn resolve(&self, raw: Value, target: &str) -> LabResult<Resolution> {
        if let Some(resolution) = self.decodeur(target)? {
            return Ok(resolution);
        }
        self.resolve_value(raw, target)
    }

    /// Validate a raw case document and resolve `target` against it.
    pub fn resolve_value(&self, raw: Value, target: &str) -> LabResult<Resolution> {
        let document = CaseDocument::from_value(raw.clone())
            .map_err(|err| LabError::from_records(err, target, Some(&raw)))?;
        Ok(self.resolve_document(&document, target))
    }

    /// Resolve `target` against an already validated case document.
    pub fn resolve_document(&self, document: &CaseDocument, target: &str) -> Resolution {
        match document.record() {
            Some(record) => self.resolve_record(record, target, Some(document.raw())),
            None => {
                let diagnostic = Diagnostic::new(
                    DiagnosticKind::UnresolvedAttribute,
                    target,
                    format!("case document for {target} contains no patient information"),
                )
                .with_raw_record(document.raw());
                Resolution {
                    status: CaseStatus::unknown(),
                    diagnostics: vec![diagnostic],
                }
            }
        }
    }

    /// Resolve `target` against a case record.
    ///
    /// `raw` is attached to diagnostics that warrant keeping the upstream document.
    pub fn resolve_record(
        &self,
        record: &CaseRecord,
        target: &str,
        raw: Option<&Value>,
    ) -> Resolution {
        let mut diagnostics = Vec::new();
        let attach = |diagnostic: Diagnostic| match raw {
            Some(raw) => diagnostic.with_raw_record(raw),
            None => diagnostic,
        };

        let status = if record.has_populated_other() {
            FamilyStatus::Unknown
        } else {
            FamilyStatus::from_principal_count(record.principal_count())
        };

        let mut proband_id: Option<&str> = None;
        let mut bound: Option<&CaseMember> = None;
        for member in record.members() {
            if member.label == MemberLabel::Proband {
                proband_id = member.fastq_sample.as_deref();
            }
            if member.fastq_sample.as_deref() != Some(target) {
                continue;
            }
            match bound {
                None => bound = Some(member),
                Some(first) => diagnostics.push(Diagnostic::new(
                    DiagnosticKind::AmbiguousBinding,
                    target,
                    format!(
                        "{target} is listed as both {} and {}; keeping {}",
                        first.label.as_str(),
                        member.label.as_str(),
                        first.label.as_str()
                    ),
                )),
            }
        }

        let Some(member) = bound else {
            diagnostics.push(attach(Diagnostic::new(
                DiagnosticKind::UnresolvedAttribute,
                target,
                format!("{target} is not a member of its case (status {status})"),
            )));
            return Resolution {
                status: CaseStatus {
                    status,
                    ..CaseStatus::unknown()
                },
                diagnostics,
            };
        };

        let gender = member.gender;
        if let Some(reported) = &member.unrecognized_gender {
            diagnostics.push(attach(Diagnostic::new(
                DiagnosticKind::UnresolvedAttribute,
                target,
                format!("{target} has gender '{reported}', which is neither Male nor Female"),
            )));
        }
        let affected = is_affected(&member.phenotypes);
        let role = match &member.label {
            MemberLabel::Proband => RoleBinding::Proband,
            MemberLabel::Mother => RoleBinding::Parent {
                parent: ParentRole::Mother,
                proband_id: proband_id.map(str::to_string),
            },
            MemberLabel::Father => RoleBinding::Parent {
                parent: ParentRole::Father,
                proband_id: proband_id.map(str::to_string),
            },
            MemberLabel::Unlisted(label) => {
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::UnresolvedAttribute,
                    target,
                    format!("{target} is listed under unsupported role '{label}'"),
                ));
                RoleBinding::Unknown
            }
        };

        if let (Some(parent), Some(gender)) = (role.parent(), gender) {
            if parent.expected_gender() != gender {
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::RoleGenderMismatch,
                    target,
                    format!("{target} has role {parent} but gender {gender}"),
                ));
            }
        }

        if role.parent().is_some() {
            if role.proband_id().is_none() {
                diagnostics.push(attach(Diagnostic::new(
                    DiagnosticKind::UnresolvedAttribute,
                    target,
                    format!("{target} is a parent but its case lists no proband sample"),
                )));
            }
            if affected {
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::AffectedParent,
                    target,
                    format!("{target} is an affected parent"),
                ));
            }
        }

        if !role.is_resolved() || gender.is_none() || status == FamilyStatus::Unknown {
            diagnostics.push(attach(Diagnostic::new(
                DiagnosticKind::UnresolvedAttribute,
                target,
                format!(
                    "status, role or gender of {target} could not be determined \
                     (status {status}, role {role}, gender {})",
                    gender.map_or("null", Gender::as_str)
                ),
            )));
        }

        Resolution {
            status: CaseStatus {
                status,
                role,
                gender,
                affected: Some(affected),
            },
            diagnostics,
        }
    }

    /// Resolve a Decodeur cohort sample from its name.
    ///
    /// Returns `Ok(None)` when `target` does not follow the Decodeur naming convention
    /// (site prefix followed by an identifier ending in two digits).
    ///
    /// # Errors
    ///
    /// Returns `LabError::UnrecognizedInput` when the name follows the convention but its
    /// suffix is not one of `01` to `04`.
    pub fn decodeur(&self, target: &str) -> LabResult<Option<Resolution>> {
        let Some(rest) = target.strip_prefix(self.decodeur_prefix.as_str()) else {
            return Ok(None);
        };
        let bytes = rest.as_bytes();
        if bytes.len() < 3 || !bytes[bytes.len() - 2..].iter().all(u8::is_ascii_digit) {
            return Ok(None);
        }
        let suffix = &target[target.len() - 2..];

        let proband_id = || Some(format!("{}-03", decodeur_family_prefix(target)));
        let (role, gender) = match suffix {
            "01" => (
                RoleBinding::Parent {
                    parent: ParentRole::Father,
                    proband_id: proband_id(),
                },
                Some(Gender::Male),
            ),
            "02" => (
                RoleBinding::Parent {
                    parent: ParentRole::Mother,
                    proband_id: proband_id(),
                },
                Some(Gender::Female),
            ),
            "03" | "04" => (RoleBinding::Proband, None),
            other => {
                return Err(LabError::UnrecognizedInput(format!(
                    "Decodeur sample {target} has unknown family suffix '{other}'"
                )))
            }
        };

        tracing::debug!(sample = target, role = %role, "resolved from Decodeur naming convention");
        Ok(Some(Resolution::without_diagnostics(CaseStatus {
            status: FamilyStatus::Decodeur,
            role,
            gender,
            affected: Some(false),
        })))
    }
}

/// Family part of a Decodeur name.
///
/// `HSJ-010-02` is split at its separator (`HSJ-010`). The compact form `HSJ-0102` shares
/// the family number's last digit with the suffix, so only the member digit is dropped
/// (`HSJ-010`).
fn decodeur_family_prefix(name: &str) -> &str {
    let without_suffix = &name[..name.len() - 2];
    match without_suffix.strip_suffix(['-', '_']) {
        Some(family) => family,
        None => &name[..name.len() - 1],
    }
}

/// An empty phenotype list, or a single `Healthy` entry, means unaffected.
fn is_affected(phenotypes: &[Phenotype]) -> bool {
    match phenotypes {
        [] => false,
        [only] => only.name.as_deref() != Some(HEALTHY_PHENOTYPE),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelinePaths;
    use serde_json::json;
    use std::path::PathBuf;

    fn resolver() -> CaseResolver {
        let paths = PipelinePaths {
            run_dir: PathBuf::from("/runs"),
            sample_sheet_dir: PathBuf::from("/sheets"),
            ref_map_file: "ref.tsv".into(),
            tertiary_map_file: "tert.tsv".into(),
            diagnostics_dir: PathBuf::from("/diag"),
        };
        let cfg = CoreConfig::new(paths, "HPC".into(), "HSJ".into()).unwrap();
        CaseResolver::new(&cfg)
    }

    fn trio() -> Value {
        json!({"patients": {
            "proband": {"fastq_sample": "GM001", "gender": "Male", "phenotypes": []},
            "mother": {"fastq_sample": "GM002", "gender": "Female", "phenotypes": [{"name": "Healthy"}]},
            "father": {"fastq_sample": "GM003", "gender": "Male", "phenotypes": [{"name": "Seizures"}]}
        }})
    }

    fn kinds(resolution: &Resolution) -> Vec<DiagnosticKind> {
        resolution.diagnostics.iter().map(|d| d.kind).collect()
    }

    #[test]
    fn trio_father_is_affected_parent_of_proband() {
        let resolution = resolver().resolve(trio(), "GM003").unwrap();
        let status = &resolution.status;

        assert_eq!(status.status, FamilyStatus::Trio);
        assert_eq!(status.role.to_string(), "father of GM001");
        assert_eq!(status.gender, Some(Gender::Male));
        assert_eq!(status.affected, Some(true));
        assert_eq!(kinds(&resolution), vec![DiagnosticKind::AffectedParent]);
    }

    #[test]
    fn healthy_mother_and_proband_without_phenotypes_are_unaffected() {
        let mother = resolver().resolve(trio(), "GM002").unwrap();
        assert_eq!(mother.status.role.to_string(), "mother of GM001");
        assert_eq!(mother.status.affected, Some(false));
        assert!(mother.diagnostics.is_empty());

        let proband = resolver().resolve(trio(), "GM001").unwrap();
        assert_eq!(proband.status.role, RoleBinding::Proband);
        assert_eq!(proband.status.affected, Some(false));
    }

    #[test]
    fn status_follows_principal_count() {
        let member = |id: &str| json!({"fastq_sample": id, "gender": "Male", "phenotypes": []});
        let cases = [
            (json!({"proband": member("A")}), FamilyStatus::Singleton),
            (json!({"proband": member("A"), "mother": member("B")}), FamilyStatus::Duo),
            (
                json!({"proband": member("A"), "mother": member("B"), "father": member("C")}),
                FamilyStatus::Trio,
            ),
            (
                json!({"proband": member("A"), "mother": member("B"), "father": member("C"), "other": []}),
                FamilyStatus::Trio,
            ),
            (
                json!({"proband": member("A"), "mother": member("B"), "father": member("C"),
                       "other": [{"fastq_sample": "D"}]}),
                FamilyStatus::Unknown,
            ),
            (
                json!({"proband": member("A"), "mother": member("B"), "father": member("C"),
                       "sibling": member("D")}),
                FamilyStatus::Unknown,
            ),
        ];

        for (patients, expected) in cases {
            let resolution = resolver()
                .resolve(json!({ "patients": patients }), "A")
                .unwrap();
            assert_eq!(resolution.status.status, expected, "{patients}");
        }
    }

    #[test]
    fn affected_inference_from_phenotypes() {
        let cases = [
            (json!([]), false),
            (json!([{"name": "Healthy"}]), false),
            (json!([{"name": "Seizures"}]), true),
            (json!([{"name": "Healthy"}, {"name": "Seizures"}]), true),
            (json!([{"id": "HP:0001250"}]), true),
        ];
        for (phenotypes, expected) in cases {
            let raw = json!({"patients": {"proband": {"fastq_sample": "A", "gender": "Female", "phenotypes": phenotypes}}});
            let resolution = resolver().resolve(raw, "A").unwrap();
            assert_eq!(resolution.status.affected, Some(expected), "{phenotypes}");
        }
    }

    #[test]
    fn first_binding_wins() {
        let raw = json!({"patients": {
            "proband": {"fastq_sample": "GM001", "gender": "Male", "phenotypes": []},
            "mother": {"fastq_sample": "GM001", "gender": "Female", "phenotypes": []}
        }});
        let resolution = resolver().resolve(raw, "GM001").unwrap();

        assert_eq!(resolution.status.role, RoleBinding::Proband);
        assert_eq!(resolution.status.gender, Some(Gender::Male));
        assert_eq!(kinds(&resolution), vec![DiagnosticKind::AmbiguousBinding]);
    }

    #[test]
    fn role_gender_mismatch_keeps_parsed_values() {
        let raw = json!({"patients": {
            "proband": {"fastq_sample": "GM001", "gender": "Male", "phenotypes": []},
            "father": {"fastq_sample": "GM003", "gender": "Female", "phenotypes": []}
        }});
        let resolution = resolver().resolve(raw, "GM003").unwrap();

        assert_eq!(resolution.status.role.to_string(), "father of GM001");
        assert_eq!(resolution.status.gender, Some(Gender::Female));
        assert_eq!(kinds(&resolution), vec![DiagnosticKind::RoleGenderMismatch]);
    }

    #[test]
    fn unbound_target_is_unresolved_with_raw_record() {
        let resolution = resolver().resolve(trio(), "GM999").unwrap();

        assert_eq!(resolution.status.status, FamilyStatus::Trio);
        assert_eq!(resolution.status.role, RoleBinding::Unknown);
        assert_eq!(resolution.status.affected, None);
        let diagnostic = &resolution.diagnostics[0];
        assert_eq!(diagnostic.kind, DiagnosticKind::UnresolvedAttribute);
        assert_eq!(diagnostic.raw_record.as_ref(), Some(&trio()));
    }

    #[test]
    fn null_gender_is_unresolved_but_returned() {
        let raw = json!({"patients": {"proband": {"fastq_sample": "A", "gender": null, "phenotypes": []}}});
        let resolution = resolver().resolve(raw, "A").unwrap();

        assert_eq!(resolution.status.status, FamilyStatus::Singleton);
        assert_eq!(resolution.status.role, RoleBinding::Proband);
        assert_eq!(resolution.status.gender, None);
        assert_eq!(kinds(&resolution), vec![DiagnosticKind::UnresolvedAttribute]);
    }

    #[test]
    fn foreign_gender_on_another_member_does_not_block_the_target() {
        let raw = json!({"patients": {
            "proband": {"fastq_sample": "GM001", "gender": "Male", "phenotypes": [{"name": "Seizures"}]},
            "mother": {"fastq_sample": "GM002", "gender": "Female", "phenotypes": []},
            "father": {"fastq_sample": "GM003", "gender": "Unspecified", "phenotypes": []}
        }});
        let resolution = resolver().resolve(raw, "GM001").unwrap();

        assert_eq!(resolution.status.status, FamilyStatus::Trio);
        assert_eq!(resolution.status.role, RoleBinding::Proband);
        assert_eq!(resolution.status.gender, Some(Gender::Male));
        assert_eq!(resolution.status.affected, Some(true));
        assert!(resolution.diagnostics.is_empty());
    }

    #[test]
    fn foreign_gender_on_the_target_is_unresolved_with_raw_record() {
        let raw = json!({"patients": {
            "proband": {"fastq_sample": "GM001", "gender": "Male", "phenotypes": []},
            "father": {"fastq_sample": "GM003", "gender": "Unspecified", "phenotypes": []}
        }});
        let resolution = resolver().resolve(raw.clone(), "GM003").unwrap();

        assert_eq!(resolution.status.role.to_string(), "father of GM001");
        assert_eq!(resolution.status.gender, None);
        let diagnostic = &resolution.diagnostics[0];
        assert_eq!(diagnostic.kind, DiagnosticKind::UnresolvedAttribute);
        assert!(diagnostic.message.contains("Unspecified"));
        assert_eq!(diagnostic.raw_record.as_ref(), Some(&raw));
    }

    #[test]
    fn missing_patients_section_is_unknown() {
        let resolution = resolver().resolve(json!({"notes": "P0001234"}), "A").unwrap();
        assert_eq!(resolution.status, CaseStatus::unknown());
        assert_eq!(kinds(&resolution), vec![DiagnosticKind::UnresolvedAttribute]);
    }

    #[test]
    fn member_without_fastq_sample_is_fatal() {
        let raw = json!({"patients": {
            "proband": {"fastq_sample": "A", "gender": "Male", "phenotypes": []},
            "mother": {"gender": "Female"}
        }});
        let err = resolver().resolve(raw, "A").expect_err("schema mismatch");
        match err {
            LabError::SchemaMismatch { subject, path, .. } => {
                assert_eq!(subject, "A");
                assert_eq!(path, "case:patients.mother");
            }
            other => panic!("expected SchemaMismatch, got {other:?}"),
        }
    }

    #[test]
    fn decodeur_compact_mother() {
        let resolution = resolver().resolve(Value::Null, "HSJ-0102").unwrap();
        let status = resolution.status;

        assert_eq!(status.status, FamilyStatus::Decodeur);
        assert_eq!(status.role.to_string(), "mother of HSJ-010-03");
        assert_eq!(status.gender, Some(Gender::Female));
        assert_eq!(status.affected, Some(false));
    }

    #[test]
    fn decodeur_suffix_table() {
        let cases = [
            ("HSJ-010-01", "father of HSJ-010-03", Some(Gender::Male)),
            ("HSJ-010-02", "mother of HSJ-010-03", Some(Gender::Female)),
            ("HSJ-010-03", "proband", None),
            ("HSJ-010-04", "proband", None),
        ];
        for (name, role, gender) in cases {
            let status = resolver().decodeur(name).unwrap().expect("decodeur").status;
            assert_eq!(status.role.to_string(), role, "{name}");
            assert_eq!(status.gender, gender, "{name}");
            assert_eq!(status.affected, Some(false));
        }
    }

    #[test]
    fn decodeur_unknown_suffix_is_fatal() {
        let err = resolver().decodeur("HSJ-010-07").expect_err("bad suffix");
        assert!(matches!(err, LabError::UnrecognizedInput(_)));
    }

    #[test]
    fn non_decodeur_names_fall_through() {
        assert!(resolver().decodeur("GM001").unwrap().is_none());
        assert!(resolver().decodeur("HSJ-ABC").unwrap().is_none());
        assert!(resolver().decodeur("HSJ").unwrap().is_none());
    }

    #[test]
    fn role_binding_round_trips_through_sample_list_columns() {
        let role = RoleBinding::from_parts("father", Some("GM001")).unwrap();
        assert_eq!(role.to_string(), "father of GM001");
        assert_eq!(role.token(), "father");
        assert_eq!(RoleBinding::from_parts("Unknown", None).unwrap(), RoleBinding::Unknown);
        assert!(RoleBinding::from_parts("sibling", None).is_err());
    }
}
