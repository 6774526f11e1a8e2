//! # Labops Core
//!
//! Core business logic of the laboratory operations toolkit.
//!
//! This crate turns sequencing runs into workflow inputs:
//! - discovery of samples in instrument run directories
//! - resolution of each sample's family status, role, gender and affected status
//! - singleton and family sample sheets, pedigrees and the cross-run sample list
//! - GeneYX group codes and the subject-to-serial join
//!
//! **No network concerns**: the case-management and phenotype services are reached through
//! the [`CaseLookup`] trait, implemented over HTTP in `labops-clients`.

pub mod batch;
pub mod config;
pub mod constants;
pub mod diagnostics;
pub mod error;
pub mod family;
pub mod groups;
pub mod lookup;
pub mod resolver;
pub mod run;
pub mod sample;
pub mod sample_list;
pub mod validation;

pub use batch::{RunOptions, RunProcessor, RunReport, SampleFailure};
pub use config::{
    load_config, load_geneyx_credentials, resolve_config_path, CoreConfig, EmedgeneSettings,
    GeneyxSettings, HttpSettings, LabConfig, PhenotipsSettings, PipelinePaths,
};
pub use diagnostics::{persist_raw_record, Diagnostic, DiagnosticKind};
pub use error::{LabError, LabResult};
pub use family::{read_family_sheet, read_pedigree, write_pedigree, Family};
pub use groups::{serials_for_subjects, GeneyxGroup};
pub use lookup::{phenotypes_for_sample, CaseLookup, CaseMatch};
pub use resolver::{
    CaseResolver, CaseStatus, FamilyStatus, ParentRole, Resolution, RoleBinding,
};
pub use sample::{ResolvedSample, Sample, SampleLocation};
pub use sample_list::{
    append_samples, family_members, read_name_list, read_sample_list, read_samples,
    SampleListEntry,
};

pub use labops_types::{Identifier, NonEmptyText};
pub use records::Gender;
