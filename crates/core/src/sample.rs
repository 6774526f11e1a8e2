//! Sequenced samples and their singleton sample sheets.
//!
//! A [`Sample`] ties a sequencing name to where its reads live on disk and to its resolved
//! case status. Samples are either resolved against the case and phenotype services
//! ([`Sample::resolve`]) or rebuilt from a previously written sample list with a known
//! status ([`Sample::new`]).

use crate::config::CoreConfig;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::lookup::CaseLookup;
use crate::resolver::{CaseResolver, CaseStatus};
use crate::{LabError, LabResult};
use labops_types::Identifier;
use records::{CaseDocument, FamilySheetSample, SingletonSheet};
use std::path::{Path, PathBuf};

/// Where a sample's reads were written by the instrument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SampleLocation {
    /// Run identifier, e.g. `r84196_20250224_170647`.
    pub run_id: String,
    /// Well directory name, e.g. `1_A01`.
    pub well: String,
    pub bam_path: PathBuf,
    pub fail_bam_path: Option<PathBuf>,
}

impl SampleLocation {
    /// Barcode encoded in the BAM file name: the text after the last `bc`, without `.bam`.
    ///
    /// `m84196_250224_170647_s1.hifi_reads.bc2001.bam` has barcode `2001`.
    pub fn barcode(&self) -> LabResult<String> {
        let file_name = self
            .bam_path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                LabError::InvalidInput(format!(
                    "BAM path {} has no file name",
                    self.bam_path.display()
                ))
            })?;
        let (_, tail) = file_name.rsplit_once("bc").ok_or_else(|| {
            LabError::InvalidInput(format!("BAM file name {file_name} carries no barcode"))
        })?;
        Ok(tail.strip_suffix(".bam").unwrap_or(tail).to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sample {
    name: Identifier,
    location: SampleLocation,
    barcode: String,
    status: CaseStatus,
    /// Comma-joined HPO terms; empty for unaffected samples.
    phenotypes: String,
}

/// A sample resolved against the external services, with the findings raised on the way.
#[derive(Clone, Debug)]
pub struct ResolvedSample {
    pub sample: Sample,
    pub diagnostics: Vec<Diagnostic>,
}

impl Sample {
    /// Build a sample whose status is already known.
    pub fn new(
        name: Identifier,
        location: SampleLocation,
        status: CaseStatus,
        phenotypes: String,
    ) -> LabResult<Self> {
        let barcode = location.barcode()?;
        Ok(Self {
            name,
            location,
            barcode,
            status,
            phenotypes,
        })
    }

    /// Resolve a sample's status through `lookup`.
    ///
    /// - Decodeur samples are resolved from their name; no service is contacted.
    /// - A sample without a case is a validation sample: an affected singleton proband.
    /// - Otherwise the case document is validated and resolved, and HPO terms are fetched
    ///   from Phenotips when the sample is affected.
    ///
    /// # Errors
    ///
    /// Returns `LabError::SchemaMismatch` (carrying the raw case document) when the case
    /// fails boundary validation, and propagates lookup failures unchanged.
    pub fn resolve<L: CaseLookup + ?Sized>(
        cfg: &CoreConfig,
        lookup: &mut L,
        name: Identifier,
        location: SampleLocation,
    ) -> LabResult<ResolvedSample> {
        let resolver = CaseResolver::new(cfg);
        let target = name.as_str();

        if let Some(resolution) = resolver.decodeur(target)? {
            return Ok(ResolvedSample {
                sample: Self::new(name, location, resolution.status, String::new())?,
                diagnostics: resolution.diagnostics,
            });
        }

        let Some(case) = lookup.find_case(target)? else {
            tracing::info!(sample = target, "no case found, treating as validation sample");
            return Ok(ResolvedSample {
                sample: Self::new(
                    name,
                    location,
                    CaseStatus::validation_singleton(),
                    String::new(),
                )?,
                diagnostics: Vec::new(),
            });
        };

        let mut diagnostics = Vec::new();
        if case.is_ambiguous() {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::AmbiguousCase,
                target,
                format!(
                    "{target} matches {} cases; using the most recent ({})",
                    case.candidates, case.case_id
                ),
            ));
        }

        let raw = lookup.case_document(&case.case_id)?;
        let document = CaseDocument::from_value(raw.clone())
            .map_err(|err| LabError::from_records(err, target, Some(&raw)))?;
        let resolution = resolver.resolve_document(&document, target);
        diagnostics.extend(resolution.diagnostics);

        let mut phenotypes = String::new();
        if resolution.status.affected == Some(true) {
            match document.phenotips_id() {
                Some(phenotips_id) => phenotypes = lookup.hpo_terms(&phenotips_id)?,
                None => diagnostics.push(
                    Diagnostic::new(
                        DiagnosticKind::UnresolvedAttribute,
                        target,
                        format!("case {} notes carry no Phenotips identifier", case.case_id),
                    )
                    .with_raw_record(document.raw()),
                ),
            }
        }

        tracing::debug!(
            sample = target,
            case = %case.case_id,
            status = %resolution.status.status,
            role = %resolution.status.role,
            "sample resolved"
        );

        Ok(ResolvedSample {
            sample: Self::new(name, location, resolution.status, phenotypes)?,
            diagnostics,
        })
    }

    /// Replace the phenotype string, e.g. with terms supplied by hand.
    pub fn with_phenotypes(mut self, phenotypes: impl Into<String>) -> Self {
        self.phenotypes = phenotypes.into();
        self
    }

    pub fn name(&self) -> &Identifier {
        &self.name
    }

    pub fn location(&self) -> &SampleLocation {
        &self.location
    }

    pub fn run_id(&self) -> &str {
        &self.location.run_id
    }

    pub fn well(&self) -> &str {
        &self.location.well
    }

    pub fn bam_path(&self) -> &Path {
        &self.location.bam_path
    }

    pub fn fail_bam_path(&self) -> Option<&Path> {
        self.location.fail_bam_path.as_deref()
    }

    pub fn barcode(&self) -> &str {
        &self.barcode
    }

    pub fn status(&self) -> &CaseStatus {
        &self.status
    }

    pub fn phenotypes(&self) -> &str {
        &self.phenotypes
    }

    /// File name of this sample's singleton sheet: `<run>_<well>_<sample>.json`.
    pub fn singleton_sheet_name(&self) -> String {
        format!("{}_{}_{}.json", self.run_id(), self.well(), self.name)
    }

    /// Singleton sheet for this sample.
    ///
    /// # Errors
    ///
    /// Returns `LabError::PreconditionViolation` if the sample's role is unresolved.
    pub fn singleton_sheet(&self, cfg: &CoreConfig) -> LabResult<SingletonSheet> {
        if !self.status.role.is_resolved() {
            return Err(LabError::PreconditionViolation(format!(
                "cannot write a sample sheet for {}: role is unresolved",
                self.name
            )));
        }

        Ok(SingletonSheet {
            sample_id: self.name.to_string(),
            sex: self.status.gender.map(|g| g.sheet_value().to_string()),
            hifi_reads: vec![path_text(self.bam_path())?],
            phenotypes: self.phenotypes.clone(),
            ref_map_file: cfg.ref_map_file().to_string(),
            backend: cfg.backend().to_string(),
        })
    }

    /// Write the singleton sheet into the configured sheet directory.
    ///
    /// The sheet is fully rendered before the file is created, so a failure leaves no
    /// partial file behind.
    pub fn write_singleton_sheet(&self, cfg: &CoreConfig) -> LabResult<PathBuf> {
        let text = self.singleton_sheet(cfg)?.render()?;
        let dir = cfg.sample_sheet_dir();
        std::fs::create_dir_all(dir).map_err(|source| LabError::FileWrite {
            path: dir.to_path_buf(),
            source,
        })?;

        let path = dir.join(self.singleton_sheet_name());
        std::fs::write(&path, text).map_err(|source| LabError::FileWrite {
            path: path.clone(),
            source,
        })?;
        tracing::info!(sample = %self.name, path = %path.display(), "singleton sample sheet written");
        Ok(path)
    }

    /// This sample's entry in a family sheet, without parent references.
    ///
    /// # Errors
    ///
    /// Returns `LabError::PreconditionViolation` if the role or affected status is
    /// unresolved.
    pub fn family_sheet_entry(&self) -> LabResult<FamilySheetSample> {
        let affected = self.status.affected.ok_or_else(|| {
            LabError::PreconditionViolation(format!(
                "affected status of {} is unresolved",
                self.name
            ))
        })?;
        if !self.status.role.is_resolved() {
            return Err(LabError::PreconditionViolation(format!(
                "role of {} is unresolved",
                self.name
            )));
        }

        Ok(FamilySheetSample {
            sample_id: self.name.to_string(),
            sex: self.status.gender.map(|g| g.sheet_value().to_string()),
            hifi_reads: vec![path_text(self.bam_path())?],
            fail_reads: self
                .fail_bam_path()
                .map(path_text)
                .transpose()?
                .into_iter()
                .collect(),
            affected,
            father_id: None,
            mother_id: None,
        })
    }
}

fn path_text(path: &Path) -> LabResult<String> {
    path.to_str().map(str::to_string).ok_or_else(|| {
        LabError::InvalidInput(format!("path {} is not valid UTF-8", path.display()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_core_config;
    use crate::lookup::fakes::FakeLookup;
    use crate::lookup::CaseMatch;
    use crate::resolver::{FamilyStatus, RoleBinding};
    use records::Gender;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    fn location(well: &str) -> SampleLocation {
        SampleLocation {
            run_id: "r84196_20250224_170647".into(),
            well: well.into(),
            bam_path: PathBuf::from(format!(
                "/runs/r84196_20250224_170647/{well}/hifi_reads/m84196_250224_170647_s1.hifi_reads.bc2001.bam"
            )),
            fail_bam_path: None,
        }
    }

    fn name(text: &str) -> Identifier {
        Identifier::new(text).unwrap()
    }

    fn trio_case() -> Value {
        json!({
            "patients": {
                "proband": {"fastq_sample": "GM001", "gender": "Male", "phenotypes": [{"name": "Seizures"}]},
                "mother": {"fastq_sample": "GM002", "gender": "Female", "phenotypes": [{"name": "Healthy"}]},
                "father": {"fastq_sample": "GM003", "gender": "Male", "phenotypes": []}
            },
            "notes": "P0001234"
        })
    }

    #[test]
    fn barcode_follows_last_bc_marker() {
        assert_eq!(location("1_A01").barcode().unwrap(), "2001");
    }

    #[test]
    fn affected_proband_gets_hpo_terms() {
        let dir = TempDir::new().unwrap();
        let cfg = test_core_config(dir.path());
        let mut lookup = FakeLookup::default()
            .with_case("GM001", "EMG1", trio_case())
            .with_hpo("P0001234", "HP:0001250,HP:0001263");

        let resolved = Sample::resolve(&cfg, &mut lookup, name("GM001"), location("1_A01")).unwrap();

        let status = resolved.sample.status();
        assert_eq!(status.status, FamilyStatus::Trio);
        assert_eq!(status.role, RoleBinding::Proband);
        assert_eq!(resolved.sample.phenotypes(), "HP:0001250,HP:0001263");
        assert!(resolved.diagnostics.is_empty());
    }

    #[test]
    fn unaffected_parent_skips_phenotips() {
        let dir = TempDir::new().unwrap();
        let cfg = test_core_config(dir.path());
        let mut lookup = FakeLookup::default().with_case("GM002", "EMG1", trio_case());

        let resolved = Sample::resolve(&cfg, &mut lookup, name("GM002"), location("1_B01")).unwrap();

        assert_eq!(resolved.sample.status().role.to_string(), "mother of GM001");
        assert_eq!(resolved.sample.phenotypes(), "");
        assert!(!lookup.calls.iter().any(|c| c.starts_with("hpo_terms")));
    }

    #[test]
    fn sample_without_case_is_validation_singleton() {
        let dir = TempDir::new().unwrap();
        let cfg = test_core_config(dir.path());
        let mut lookup = FakeLookup::default();

        let resolved = Sample::resolve(&cfg, &mut lookup, name("NA24385"), location("1_C01")).unwrap();

        assert_eq!(resolved.sample.status(), &CaseStatus::validation_singleton());
        assert_eq!(lookup.calls, vec!["find_case:NA24385"]);
    }

    #[test]
    fn decodeur_sample_contacts_no_service() {
        let dir = TempDir::new().unwrap();
        let cfg = test_core_config(dir.path());
        let mut lookup = FakeLookup::default();

        let resolved = Sample::resolve(&cfg, &mut lookup, name("HSJ-010-01"), location("1_D01")).unwrap();

        assert_eq!(resolved.sample.status().status, FamilyStatus::Decodeur);
        assert_eq!(resolved.sample.status().gender, Some(Gender::Male));
        assert!(lookup.calls.is_empty());
    }

    #[test]
    fn ambiguous_case_search_is_reported() {
        let dir = TempDir::new().unwrap();
        let cfg = test_core_config(dir.path());
        let mut lookup = FakeLookup::default().with_case("GM003", "EMG7", trio_case());
        lookup.cases_by_sample.insert(
            "GM003".into(),
            CaseMatch {
                case_id: "EMG7".into(),
                candidates: 2,
            },
        );

        let resolved = Sample::resolve(&cfg, &mut lookup, name("GM003"), location("1_A01")).unwrap();

        assert!(resolved
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::AmbiguousCase));
    }

    #[test]
    fn malformed_case_is_schema_mismatch_with_raw_record() {
        let dir = TempDir::new().unwrap();
        let cfg = test_core_config(dir.path());
        let broken = json!({"patients": {"proband": {"gender": "Male"}}});
        let mut lookup = FakeLookup::default().with_case("GM001", "EMG1", broken.clone());

        let err = Sample::resolve(&cfg, &mut lookup, name("GM001"), location("1_A01"))
            .expect_err("member without fastq_sample");

        assert_eq!(err.raw_record(), Some(&broken));
    }

    #[test]
    fn writes_singleton_sheet_with_upper_case_sex() {
        let dir = TempDir::new().unwrap();
        let cfg = test_core_config(dir.path());
        let status = CaseStatus {
            status: FamilyStatus::Singleton,
            role: RoleBinding::Proband,
            gender: Some(Gender::Female),
            affected: Some(true),
        };
        let sample = Sample::new(name("GM010"), location("1_A01"), status, "HP:0001250".into()).unwrap();

        let path = sample.write_singleton_sheet(&cfg).unwrap();

        assert_eq!(
            path,
            dir.path().join("sheets/r84196_20250224_170647_1_A01_GM010.json")
        );
        let sheet = SingletonSheet::parse(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(sheet.sex.as_deref(), Some("FEMALE"));
        assert_eq!(sheet.phenotypes, "HP:0001250");
        assert_eq!(sheet.backend, "HPC");
    }

    #[test]
    fn unresolved_role_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let cfg = test_core_config(dir.path());
        let sample = Sample::new(name("GM011"), location("1_A01"), CaseStatus::unknown(), String::new()).unwrap();

        let err = sample.write_singleton_sheet(&cfg).expect_err("unresolved role");

        assert!(matches!(err, LabError::PreconditionViolation(_)));
        assert!(!dir.path().join("sheets").exists());
    }

    #[test]
    fn phenotype_override_replaces_fetched_terms() {
        let sample = Sample::new(
            name("GM010"),
            location("1_A01"),
            CaseStatus::validation_singleton(),
            "HP:1".into(),
        )
        .unwrap()
        .with_phenotypes("HP:2");
        assert_eq!(sample.phenotypes(), "HP:2");
    }
}
