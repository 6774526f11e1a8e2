//! Family assembly: joint sample sheets and pedigrees.
//!
//! A [`Family`] groups a proband with one or two parents that were resolved individually.
//! The joint sheet lists the proband first, annotated with the identifiers of its parents,
//! followed by the parents in the order they were given.

use crate::config::CoreConfig;
use crate::resolver::{ParentRole, RoleBinding};
use crate::sample::Sample;
use crate::{LabError, LabResult};
use labops_types::Identifier;
use records::{FamilyBlock, FamilySheet, Pedigree};
use std::path::{Path, PathBuf};

#[derive(Clone, Debug)]
pub struct Family<'a> {
    family_id: Identifier,
    proband: &'a Sample,
    parents: Vec<(ParentRole, &'a Sample)>,
}

impl<'a> Family<'a> {
    /// Group a proband with its parents.
    ///
    /// Each parent's role is taken from its own resolved status.
    ///
    /// # Errors
    ///
    /// Returns `LabError::PreconditionViolation` if there is no parent, if the proband is
    /// not resolved as a proband, if a parent is not resolved as a mother or father, or if
    /// two parents share a role.
    pub fn new(family_id: Identifier, proband: &'a Sample, parents: &[&'a Sample]) -> LabResult<Self> {
        if parents.is_empty() {
            return Err(LabError::PreconditionViolation(format!(
                "family {family_id} needs at least one parent"
            )));
        }
        if proband.status().role != RoleBinding::Proband {
            return Err(LabError::PreconditionViolation(format!(
                "{} is resolved as {}, not as a proband",
                proband.name(),
                proband.status().role
            )));
        }

        let mut bound: Vec<(ParentRole, &'a Sample)> = Vec::with_capacity(parents.len());
        for parent in parents {
            let role = parent.status().role.parent().ok_or_else(|| {
                LabError::PreconditionViolation(format!(
                    "{} is resolved as {}, not as a parent",
                    parent.name(),
                    parent.status().role
                ))
            })?;
            if bound.iter().any(|(existing, _)| *existing == role) {
                return Err(LabError::PreconditionViolation(format!(
                    "family {family_id} has more than one {role}"
                )));
            }
            if let Some(annotated) = parent.status().role.proband_id() {
                if annotated != proband.name().as_str() {
                    tracing::warn!(
                        family = %family_id,
                        parent = %parent.name(),
                        proband = %proband.name(),
                        "parent is annotated against proband {annotated}"
                    );
                }
            }
            bound.push((role, *parent));
        }

        Ok(Self {
            family_id,
            proband,
            parents: bound,
        })
    }

    pub fn family_id(&self) -> &Identifier {
        &self.family_id
    }

    pub fn proband(&self) -> &Sample {
        self.proband
    }

    pub fn parents(&self) -> &[(ParentRole, &'a Sample)] {
        &self.parents
    }

    /// Joint sample sheet of the family.
    ///
    /// # Errors
    ///
    /// Returns `LabError::PreconditionViolation` if any member's affected status is
    /// unresolved.
    pub fn sheet(&self, cfg: &CoreConfig) -> LabResult<FamilySheet> {
        let mut proband_entry = self.proband.family_sheet_entry()?;
        let mut samples = Vec::with_capacity(self.parents.len() + 1);

        for (role, parent) in &self.parents {
            let parent_id = parent.name().to_string();
            match role {
                ParentRole::Father => proband_entry.father_id = Some(parent_id),
                ParentRole::Mother => proband_entry.mother_id = Some(parent_id),
            }
        }
        samples.push(proband_entry);
        for (_, parent) in &self.parents {
            samples.push(parent.family_sheet_entry()?);
        }

        Ok(FamilySheet {
            family: FamilyBlock {
                family_id: self.family_id.to_string(),
                samples,
            },
            phenotypes: self.proband.phenotypes().to_string(),
            ref_map_file: cfg.ref_map_file().to_string(),
            tertiary_map_file: cfg.tertiary_map_file().to_string(),
            backend: cfg.backend().to_string(),
        })
    }

    /// Write the joint sheet to `<sheet_dir>/<family_id>.json`.
    ///
    /// Nothing is written if the sheet cannot be built.
    pub fn write_joint_sheet(&self, cfg: &CoreConfig) -> LabResult<PathBuf> {
        let text = self.sheet(cfg)?.render()?;
        let path = cfg
            .sample_sheet_dir()
            .join(format!("{}.json", self.family_id));
        write_text(&path, &text)?;
        tracing::info!(family = %self.family_id, path = %path.display(), "family sample sheet written");
        Ok(path)
    }
}

/// Read a family sheet written by [`Family::write_joint_sheet`] (or earlier tooling).
pub fn read_family_sheet(path: &Path) -> LabResult<FamilySheet> {
    let text = std::fs::read_to_string(path).map_err(|source| LabError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(FamilySheet::parse(&text)?)
}

/// Write the pedigree of `sheet` to `<dir>/<family_id>.ped`.
///
/// # Errors
///
/// Returns `LabError::UnrecognizedInput` if the proband's sex cannot be mapped to a PED
/// code. Nothing is written in that case.
pub fn write_pedigree(dir: &Path, family_id: &Identifier, sheet: &FamilySheet) -> LabResult<PathBuf> {
    let pedigree = Pedigree::from_family_sheet(family_id.as_str(), sheet)?;
    let path = dir.join(format!("{family_id}.ped"));
    write_text(&path, &pedigree.render())?;
    tracing::info!(family = %family_id, path = %path.display(), "pedigree written");
    Ok(path)
}

/// Read a single-family PED file.
pub fn read_pedigree(path: &Path) -> LabResult<Pedigree> {
    let text = std::fs::read_to_string(path).map_err(|source| LabError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Pedigree::parse(&text)?)
}

fn write_text(path: &Path, text: &str) -> LabResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| LabError::FileWrite {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, text).map_err(|source| LabError::FileWrite {
        path: path.to_path_buf(),
        source,
    })
}
