//! The sample list: resolved samples accumulated across runs.
//!
//! Each processed run appends one `;`-separated line per sample:
//!
//! ```text
//! name;well;barcode;run;gender;status;role;phenotypes;bam;affected;proband;fail_bam
//! GM003;1_C01;2003;r84196_20250224_170647;Male;Trio;father;;/runs/.../bc2003.bam;False;GM001;
//! ```
//!
//! Role and proband are separate columns so that families can be regrouped later without
//! parsing display text. Gender is written `null` and affected `None` when unresolved.

use crate::resolver::{CaseStatus, FamilyStatus, RoleBinding};
use crate::sample::{Sample, SampleLocation};
use crate::{LabError, LabResult};
use labops_types::Identifier;
use records::Gender;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

/// One line of the sample list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleListEntry {
    pub name: String,
    pub well: String,
    pub barcode: String,
    pub run_id: String,
    pub gender: String,
    pub status: String,
    pub role: String,
    pub phenotypes: String,
    pub bam_path: String,
    pub affected: String,
    #[serde(default)]
    pub proband_id: String,
    #[serde(default)]
    pub fail_bam_path: String,
}

impl SampleListEntry {
    pub fn from_sample(sample: &Sample) -> LabResult<Self> {
        let status = sample.status();
        Ok(Self {
            name: sample.name().to_string(),
            well: sample.well().to_string(),
            barcode: sample.barcode().to_string(),
            run_id: sample.run_id().to_string(),
            gender: status.gender.map_or("null", Gender::as_str).to_string(),
            status: status.status.to_string(),
            role: status.role.token().to_string(),
            phenotypes: sample.phenotypes().to_string(),
            bam_path: path_text(sample.bam_path())?,
            affected: match status.affected {
                Some(true) => "True",
                Some(false) => "False",
                None => "None",
            }
            .to_string(),
            proband_id: status.role.proband_id().unwrap_or_default().to_string(),
            fail_bam_path: sample
                .fail_bam_path()
                .map(path_text)
                .transpose()?
                .unwrap_or_default(),
        })
    }

    /// Rebuild the sample this line was written from.
    ///
    /// # Errors
    ///
    /// Returns `LabError::UnrecognizedInput` if the gender, status, role or affected column
    /// holds a value outside its vocabulary.
    pub fn to_sample(&self) -> LabResult<Sample> {
        let status = CaseStatus {
            status: self.status.parse::<FamilyStatus>()?,
            role: self.role_binding()?,
            gender: Gender::parse_reported(&self.gender)?,
            affected: parse_affected(&self.affected)?,
        };
        let location = SampleLocation {
            run_id: self.run_id.clone(),
            well: self.well.clone(),
            bam_path: PathBuf::from(&self.bam_path),
            fail_bam_path: (!self.fail_bam_path.trim().is_empty())
                .then(|| PathBuf::from(self.fail_bam_path.trim())),
        };
        Sample::new(
            Identifier::new(&self.name)?,
            location,
            status,
            self.phenotypes.clone(),
        )
    }

    /// Lines written before the proband column existed carry `father of GM001` in the
    /// role column; those are split into the role and its proband.
    fn role_binding(&self) -> LabResult<RoleBinding> {
        if self.proband_id.trim().is_empty() {
            if let Some((token, proband)) = self.role.trim().split_once(" of ") {
                return RoleBinding::from_parts(token, Some(proband));
            }
        }
        RoleBinding::from_parts(&self.role, Some(&self.proband_id))
    }
}

fn parse_affected(value: &str) -> LabResult<Option<bool>> {
    match value.trim() {
        "True" | "true" => Ok(Some(true)),
        "False" | "false" => Ok(Some(false)),
        "None" | "" => Ok(None),
        other => Err(LabError::UnrecognizedInput(format!(
            "affected status '{other}'"
        ))),
    }
}

fn path_text(path: &Path) -> LabResult<String> {
    path.to_str().map(str::to_string).ok_or_else(|| {
        LabError::InvalidInput(format!("path {} is not valid UTF-8", path.display()))
    })
}

/// Append `samples` to the list at `path`, creating it if needed.
pub fn append_samples(path: &Path, samples: &[Sample]) -> LabResult<()> {
    let entries = samples
        .iter()
        .map(SampleListEntry::from_sample)
        .collect::<LabResult<Vec<_>>>()?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LabError::FileWrite {
            path: path.to_path_buf(),
            source,
        })?;
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .from_writer(file);
    for entry in &entries {
        writer.serialize(entry)?;
    }
    writer.flush().map_err(|source| LabError::FileWrite {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!(path = %path.display(), samples = entries.len(), "sample list updated");
    Ok(())
}

/// Read every line of the sample list at `path`.
pub fn read_sample_list(path: &Path) -> LabResult<Vec<SampleListEntry>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut entries = Vec::new();
    for result in reader.deserialize() {
        entries.push(result?);
    }
    Ok(entries)
}

/// Read the sample list at `path` back into samples.
pub fn read_samples(path: &Path) -> LabResult<Vec<Sample>> {
    read_sample_list(path)?
        .iter()
        .map(SampleListEntry::to_sample)
        .collect()
}

/// Find a proband and the parents annotated against it.
///
/// A sample that was sequenced more than once appears on several lines; the latest line
/// wins. Parents keep the order in which their role first appears in the list.
///
/// # Errors
///
/// Returns `LabError::InvalidInput` if `proband` is not in the list.
pub fn family_members<'a>(
    samples: &'a [Sample],
    proband: &str,
) -> LabResult<(&'a Sample, Vec<&'a Sample>)> {
    let proband_sample = samples
        .iter()
        .rev()
        .find(|s| s.name().as_str() == proband)
        .ok_or_else(|| {
            LabError::InvalidInput(format!("proband {proband} is not in the sample list"))
        })?;

    let mut parents: Vec<&'a Sample> = Vec::new();
    for sample in samples {
        let role = &sample.status().role;
        let (Some(parent), Some(annotated)) = (role.parent(), role.proband_id()) else {
            continue;
        };
        if annotated != proband {
            continue;
        }
        match parents
            .iter_mut()
            .find(|p| p.status().role.parent() == Some(parent))
        {
            Some(slot) => *slot = sample,
            None => parents.push(sample),
        }
    }

    Ok((proband_sample, parents))
}

/// Read a plain list of names, one per line; blank lines and `#` comments are skipped.
pub fn read_name_list(path: &Path) -> LabResult<Vec<String>> {
    let text = std::fs::read_to_string(path).map_err(|source| LabError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}
