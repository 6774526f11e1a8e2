//! Constants used throughout the labops core crate.
//!
//! This module contains path, filename and vocabulary constants to ensure
//! consistency across the codebase and make maintenance easier.

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".myconf.json";

/// Default sample list that accumulates resolved samples across runs.
pub const DEFAULT_SAMPLE_LIST: &str = "mySampleList.txt";

/// Workflow backend written into every sample sheet unless configured otherwise.
pub const DEFAULT_BACKEND: &str = "HPC";

/// Site prefix of Decodeur cohort identifiers.
pub const DEFAULT_DECODEUR_PREFIX: &str = "HSJ";

/// Timeout applied to every external request unless configured otherwise.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Directory (inside a well) holding the HiFi read BAM.
pub const HIFI_READS_DIR: &str = "hifi_reads";

/// Directory (inside a well) holding the failed-reads BAM.
pub const FAIL_READS_DIR: &str = "fail_reads";

/// Directory (inside a well) holding instrument metadata XML files.
pub const PB_FORMATS_DIR: &str = "pb_formats";

/// Suffix of the consensus read set metadata file carrying the BioSample name.
pub const CONSENSUS_XML_SUFFIX: &str = ".consensusreadset.xml";

/// Attribute prefix of the sample name inside the consensus read set XML.
pub const BIOSAMPLE_NAME_ATTR: &str = "BioSample Name=\"";

/// Phenotype name used by the case-management service for unaffected members.
pub const HEALTHY_PHENOTYPE: &str = "Healthy";

/// Suffix of the per-run index of written singleton sheets (`<run>_samples`).
pub const RUN_INDEX_SUFFIX: &str = "_samples";

/// Suffix of the side file holding a raw record kept for diagnosis.
pub const DIAGNOSTIC_FILE_SUFFIX: &str = "_error.json";
