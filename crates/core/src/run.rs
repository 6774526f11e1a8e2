//! Discovery of samples in a sequencing run directory.
//!
//! The instrument writes one directory per well below the run directory:
//!
//! ```text
//! <run_path>/<run>/<well>/hifi_reads/<movie>.hifi_reads.bc2001.bam
//! <run_path>/<run>/<well>/fail_reads/<movie>.fail_reads.bc2001.bam      (optional)
//! <run_path>/<run>/<well>/pb_formats/<movie>.hifi_reads.bc2001.consensusreadset.xml
//! ```
//!
//! The consensus read set XML carries the sample name in its `BioSample Name="..."`
//! attribute.

use crate::constants::{
    BIOSAMPLE_NAME_ATTR, CONSENSUS_XML_SUFFIX, FAIL_READS_DIR, HIFI_READS_DIR, PB_FORMATS_DIR,
};
use crate::sample::SampleLocation;
use crate::{LabError, LabResult};
use std::path::{Path, PathBuf};

/// Reads found in one well, with the sample name reported by the instrument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WellReads {
    pub location: SampleLocation,
    /// `None` when the metadata file is missing or carries no BioSample name.
    pub biosample_name: Option<String>,
}

/// Well directory names of a run, sorted case-insensitively (`1_A01`, `1_B01`, ...).
pub fn list_wells(run_path: &Path) -> LabResult<Vec<String>> {
    let entries = std::fs::read_dir(run_path).map_err(|source| LabError::DirRead {
        path: run_path.to_path_buf(),
        source,
    })?;

    let mut wells = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| LabError::DirRead {
            path: run_path.to_path_buf(),
            source,
        })?;
        if !entry.path().is_dir() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            wells.push(name.to_string());
        }
    }

    wells.sort_by_key(|well| well.to_lowercase());
    Ok(wells)
}

/// Locate the read files of one well.
///
/// # Errors
///
/// Returns `LabError::InvalidInput` if the well has no barcoded HiFi BAM.
pub fn locate_reads(run_path: &Path, run_id: &str, well: &str) -> LabResult<SampleLocation> {
    let well_dir = run_path.join(well);
    let bam_path = find_barcoded_file(&well_dir.join(HIFI_READS_DIR), ".bam")?.ok_or_else(|| {
        LabError::InvalidInput(format!("could not find a BAM file for {run_id}/{well}"))
    })?;
    let fail_bam_path = find_barcoded_file(&well_dir.join(FAIL_READS_DIR), ".bam")?;

    Ok(SampleLocation {
        run_id: run_id.to_string(),
        well: well.to_string(),
        bam_path,
        fail_bam_path,
    })
}

/// Sample name recorded by the instrument for a well.
pub fn biosample_name(well_dir: &Path) -> LabResult<Option<String>> {
    let Some(xml_path) = find_barcoded_file(&well_dir.join(PB_FORMATS_DIR), CONSENSUS_XML_SUFFIX)?
    else {
        return Ok(None);
    };

    let text = std::fs::read_to_string(&xml_path).map_err(|source| LabError::FileRead {
        path: xml_path.clone(),
        source,
    })?;
    Ok(extract_biosample_name(&text))
}

/// Reads and instrument-reported sample name of one well.
pub fn inspect_well(run_path: &Path, run_id: &str, well: &str) -> LabResult<WellReads> {
    let location = locate_reads(run_path, run_id, well)?;
    let biosample_name = biosample_name(&run_path.join(well))?;
    if biosample_name.is_none() {
        tracing::warn!(run = run_id, well, "no BioSample name in well metadata");
    }
    Ok(WellReads {
        location,
        biosample_name,
    })
}

fn extract_biosample_name(xml: &str) -> Option<String> {
    let start = xml.find(BIOSAMPLE_NAME_ATTR)? + BIOSAMPLE_NAME_ATTR.len();
    let rest = &xml[start..];
    let name = &rest[..rest.find('"')?];
    (!name.trim().is_empty()).then(|| name.trim().to_string())
}

/// First file (by name) in `dir` whose name contains `bc` and ends with `suffix`.
///
/// A missing directory yields `Ok(None)`.
fn find_barcoded_file(dir: &Path, suffix: &str) -> LabResult<Option<PathBuf>> {
    if !dir.is_dir() {
        return Ok(None);
    }
    let entries = std::fs::read_dir(dir).map_err(|source| LabError::DirRead {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut candidates = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| LabError::DirRead {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let matches = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.contains("bc") && name.ends_with(suffix));
        if matches && path.is_file() {
            candidates.push(path);
        }
    }

    candidates.sort();
    Ok(candidates.into_iter().next())
}


#[cfg(test)]
mod tests {
    use super::*;
    use super::fixtures::make_well;
    use crate::config::test_core_config;
    use std::fs;
    use tempfile::TempDir;

    const RUN: &str = "r84196_20250224_170647";

    #[test]
    fn wells_are_sorted_case_insensitively_and_files_skipped() {
        let dir = TempDir::new().unwrap();
        for well in ["1_b01", "1_A01", "2_C01"] {
            fs::create_dir_all(dir.path().join(well)).unwrap();
        }
        fs::write(dir.path().join("run.transferdone"), b"").unwrap();

        assert_eq!(list_wells(dir.path()).unwrap(), vec!["1_A01", "1_b01", "2_C01"]);
    }

    #[test]
    fn discovers_reads_and_names() {
        let root = TempDir::new().unwrap();
        let cfg = test_core_config(root.path());
        let run_dir = cfg.run_path(RUN);
        make_well(&run_dir, "1_B01", "2002", Some("GM002"), false);
        make_well(&run_dir, "1_A01", "2001", Some("GM001"), true);

        let run_path = cfg.run_path(RUN);
        let wells: Vec<WellReads> = list_wells(&run_path)
            .unwrap()
            .iter()
            .map(|well| inspect_well(&run_path, RUN, well).unwrap())
            .collect();

        assert_eq!(wells.len(), 2);
        assert_eq!(wells[0].biosample_name.as_deref(), Some("GM001"));
        assert_eq!(wells[0].location.barcode().unwrap(), "2001");
        assert!(wells[0].location.fail_bam_path.is_some());
        assert_eq!(wells[1].location.well, "1_B01");
        assert!(wells[1].location.fail_bam_path.is_none());
    }

    #[test]
    fn missing_metadata_gives_no_name() {
        let root = TempDir::new().unwrap();
        make_well(root.path(), "1_A01", "2001", None, false);
        assert_eq!(biosample_name(&root.path().join("1_A01")).unwrap(), None);
    }

    #[test]
    fn well_without_bam_is_an_error() {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("1_A01").join(HIFI_READS_DIR)).unwrap();
        let err = locate_reads(root.path(), RUN, "1_A01").expect_err("no BAM");
        assert!(matches!(err, LabError::InvalidInput(_)));
    }

    #[test]
    fn extracts_name_attribute() {
        assert_eq!(
            extract_biosample_name(r#"<BioSample Name="24-01142-T1" Description="x"/>"#),
            Some("24-01142-T1".into())
        );
        assert_eq!(extract_biosample_name("<BioSample/>"), None);
    }
}
