//! End-to-end processing of one sequencing run.
//!
//! For every well of the run, [`RunProcessor`] locates the reads, resolves the sample
//! through a [`CaseLookup`], persists the raw records behind any diagnostics, and writes the
//! singleton sample sheet. A failing well is recorded and the run continues; the run index
//! and the sample list are written from the samples that resolved.

use crate::config::CoreConfig;
use crate::constants::RUN_INDEX_SUFFIX;
use crate::diagnostics::{persist_raw_record, Diagnostic};
use crate::lookup::CaseLookup;
use crate::run::{inspect_well, list_wells};
use crate::sample::Sample;
use crate::sample_list::append_samples;
use crate::{LabError, LabResult};
use labops_types::Identifier;
use std::path::PathBuf;

/// What to produce besides the resolved samples.
#[derive(Clone, Debug)]
pub struct RunOptions {
    /// Sample list to append to; `None` leaves it untouched.
    pub sample_list: Option<PathBuf>,
    pub write_sheets: bool,
}

/// A well that could not be turned into a sample sheet.
#[derive(Debug)]
pub struct SampleFailure {
    pub well: String,
    pub sample: Option<String>,
    pub error: LabError,
}

#[derive(Debug, Default)]
pub struct RunReport {
    /// Resolved samples, in well order.
    pub samples: Vec<Sample>,
    pub failures: Vec<SampleFailure>,
    pub diagnostics: Vec<Diagnostic>,
    pub sheets: Vec<PathBuf>,
    pub index: Option<PathBuf>,
}

impl RunReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct RunProcessor<'a, L: CaseLookup> {
    cfg: &'a CoreConfig,
    lookup: L,
}

impl<'a, L: CaseLookup> RunProcessor<'a, L> {
    pub fn new(cfg: &'a CoreConfig, lookup: L) -> Self {
        Self { cfg, lookup }
    }

    /// Process every well of `run_id`.
    ///
    /// # Errors
    ///
    /// Fails only when the run directory cannot be listed or the run index or sample list
    /// cannot be written. Per-well problems are reported in [`RunReport::failures`].
    pub fn process(&mut self, run_id: &str, options: &RunOptions) -> LabResult<RunReport> {
        let run_path = self.cfg.run_path(run_id);
        let wells = list_wells(&run_path)?;
        tracing::info!(run = run_id, wells = wells.len(), "processing run");

        let mut report = RunReport::default();
        let mut indexed = Vec::new();

        for well in wells {
            let sample = match self.resolve_well(run_id, &well, &mut report) {
                Ok(sample) => sample,
                Err((sample, error)) => {
                    tracing::error!(run = run_id, well = %well, error = %error, "well skipped");
                    report.failures.push(SampleFailure { well, sample, error });
                    continue;
                }
            };

            if options.write_sheets {
                match sample.write_singleton_sheet(self.cfg) {
                    Ok(path) => {
                        indexed.push(sample.name().to_string());
                        report.sheets.push(path);
                    }
                    Err(error) => {
                        tracing::error!(sample = %sample.name(), error = %error, "sample sheet not written");
                        report.failures.push(SampleFailure {
                            well: well.clone(),
                            sample: Some(sample.name().to_string()),
                            error,
                        });
                    }
                }
            }
            report.samples.push(sample);
        }

        if options.write_sheets {
            report.index = Some(self.write_run_index(run_id, &report.samples, &indexed)?);
        }
        if let Some(list) = &options.sample_list {
            append_samples(list, &report.samples)?;
        }

        tracing::info!(
            run = run_id,
            resolved = report.samples.len(),
            failed = report.failures.len(),
            diagnostics = report.diagnostics.len(),
            "run processed"
        );
        Ok(report)
    }

    /// Give back the lookup, e.g. to reuse its authenticated session.
    pub fn into_lookup(self) -> L {
        self.lookup
    }

    fn resolve_well(
        &mut self,
        run_id: &str,
        well: &str,
        report: &mut RunReport,
    ) -> Result<Sample, (Option<String>, LabError)> {
        let run_path = self.cfg.run_path(run_id);
        let reads = inspect_well(&run_path, run_id, well).map_err(|e| (None, e))?;
        let name = reads.biosample_name.ok_or_else(|| {
            (
                None,
                LabError::InvalidInput(format!("no sample name recorded for {run_id}/{well}")),
            )
        })?;
        let identifier = Identifier::new(&name).map_err(|e| (Some(name.clone()), e.into()))?;

        match Sample::resolve(self.cfg, &mut self.lookup, identifier, reads.location) {
            Ok(resolved) => {
                let mut persisted = false;
                for diagnostic in resolved.diagnostics {
                    diagnostic.log();
                    if let (false, Some(raw)) = (persisted, &diagnostic.raw_record) {
                        self.persist(&name, raw);
                        persisted = true;
                    }
                    report.diagnostics.push(diagnostic);
                }
                Ok(resolved.sample)
            }
            Err(error) => {
                if let Some(raw) = error.raw_record() {
                    self.persist(&name, raw);
                }
                Err((Some(name), error))
            }
        }
    }

    fn persist(&self, sample: &str, raw: &serde_json::Value) {
        if let Err(err) = persist_raw_record(self.cfg.diagnostics_dir(), sample, raw) {
            tracing::error!(sample, error = %err, "could not keep raw record");
        }
    }

    /// Rewrite `<sheet_dir>/<run>_samples` with one `name,sheet` line per written sheet.
    fn write_run_index(
        &self,
        run_id: &str,
        samples: &[Sample],
        indexed: &[String],
    ) -> LabResult<PathBuf> {
        let text: String = samples
            .iter()
            .filter(|s| indexed.iter().any(|name| name == s.name().as_str()))
            .map(|sample| format!("{},{}\n", sample.name(), sample.singleton_sheet_name()))
            .collect();

        let dir = self.cfg.sample_sheet_dir();
        std::fs::create_dir_all(dir).map_err(|source| LabError::FileWrite {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = dir.join(format!("{run_id}{RUN_INDEX_SUFFIX}"));
        std::fs::write(&path, text).map_err(|source| LabError::FileWrite {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_core_config;
    use crate::lookup::fakes::FakeLookup;
    use crate::resolver::{FamilyStatus, RoleBinding};
    use crate::run::fixtures::make_well;
    use crate::sample_list::read_samples;
    use serde_json::json;
    use tempfile::TempDir;

    const RUN: &str = "r84196_20250224_170647";

    fn trio_case() -> serde_json::Value {
        json!({
            "patients": {
                "proband": {"fastq_sample": "GM001", "gender": "Male", "phenotypes": [{"name": "Seizures"}]},
                "mother": {"fastq_sample": "GM002", "gender": "Female", "phenotypes": [{"name": "Healthy"}]},
                "father": {"fastq_sample": "GM003", "gender": null, "phenotypes": []}
            },
            "notes": "P0001234"
        })
    }

    fn lookup() -> FakeLookup {
        FakeLookup::default()
            .with_case("GM001", "EMG1", trio_case())
            .with_case("GM002", "EMG1", trio_case())
            .with_case("GM003", "EMG1", trio_case())
            .with_case("GM004", "EMG2", json!({"patients": {"proband": {"gender": "Male"}}}))
            .with_hpo("P0001234", "HP:0001250")
    }

    fn options(root: &std::path::Path) -> RunOptions {
        RunOptions {
            sample_list: Some(root.join("mySampleList.txt")),
            write_sheets: true,
        }
    }

    #[test]
    fn processes_run_and_continues_past_failures() {
        let root = TempDir::new().unwrap();
        let cfg = test_core_config(root.path());
        let run_dir = cfg.run_path(RUN);
        make_well(&run_dir, "1_A01", "2001", Some("GM001"), true);
        make_well(&run_dir, "1_B01", "2002", Some("GM002"), false);
        make_well(&run_dir, "1_C01", "2003", Some("GM003"), false);
        make_well(&run_dir, "1_D01", "2004", Some("GM004"), false);
        make_well(&run_dir, "2_A01", "2005", None, false);

        let mut processor = RunProcessor::new(&cfg, lookup());
        let report = processor.process(RUN, &options(root.path())).unwrap();

        let names: Vec<_> = report.samples.iter().map(|s| s.name().as_str()).collect();
        assert_eq!(names, vec!["GM001", "GM002", "GM003"]);
        assert_eq!(report.samples[0].phenotypes(), "HP:0001250");
        assert_eq!(report.samples[2].status().role.to_string(), "father of GM001");

        let failed: Vec<_> = report.failures.iter().map(|f| f.well.as_str()).collect();
        assert_eq!(failed, vec!["1_D01", "2_A01"]);
        assert!(matches!(report.failures[0].error, LabError::SchemaMismatch { .. }));
        assert!(root.path().join("diagnostics/GM004_error.json").exists());

        // Father has no gender: recoverable, raw record kept.
        assert!(root.path().join("diagnostics/GM003_error.json").exists());
        assert_eq!(report.sheets.len(), 3);
    }

    #[test]
    fn run_index_is_rewritten_per_run() {
        let root = TempDir::new().unwrap();
        let cfg = test_core_config(root.path());
        let run_dir = cfg.run_path(RUN);
        make_well(&run_dir, "1_B01", "2002", Some("GM002"), false);
        make_well(&run_dir, "1_A01", "2001", Some("GM001"), false);

        let mut processor = RunProcessor::new(&cfg, lookup());
        processor.process(RUN, &options(root.path())).unwrap();
        let report = processor.process(RUN, &options(root.path())).unwrap();

        let index = std::fs::read_to_string(report.index.unwrap()).unwrap();
        assert_eq!(
            index,
            format!("GM001,{RUN}_1_A01_GM001.json\nGM002,{RUN}_1_B01_GM002.json\n")
        );

        // The sample list is appended, not rewritten.
        let listed = read_samples(&root.path().join("mySampleList.txt")).unwrap();
        assert_eq!(listed.len(), 4);
        assert_eq!(listed[1].status().role, RoleBinding::Parent {
            parent: crate::resolver::ParentRole::Mother,
            proband_id: Some("GM001".into()),
        });
    }

    #[test]
    fn validation_samples_are_affected_singletons() {
        let root = TempDir::new().unwrap();
        let cfg = test_core_config(root.path());
        make_well(&cfg.run_path(RUN), "1_A01", "2001", Some("NA24385"), false);

        let mut processor = RunProcessor::new(&cfg, FakeLookup::default());
        let report = processor
            .process(
                RUN,
                &RunOptions {
                    sample_list: None,
                    write_sheets: false,
                },
            )
            .unwrap();

        assert!(report.is_clean());
        assert_eq!(report.samples[0].status().status, FamilyStatus::Singleton);
        assert_eq!(report.samples[0].status().affected, Some(true));
        assert!(report.index.is_none());
        assert!(!root.path().join("sheets").exists());
    }

    #[test]
    fn missing_run_directory_is_an_error() {
        let root = TempDir::new().unwrap();
        let cfg = test_core_config(root.path());
        let mut processor = RunProcessor::new(&cfg, FakeLookup::default());
        assert!(processor.process("r_missing", &options(root.path())).is_err());
    }
}
