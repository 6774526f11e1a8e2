//! Core runtime configuration.
//!
//! This module defines configuration that is resolved once at process startup and then
//! passed into core services. Nothing below the binaries reads the configuration file or
//! environment variables again; every component receives the values it needs explicitly.
//!
//! The configuration file is JSON (or YAML when the extension is `.yml`/`.yaml`) with one
//! section per external system:
//!
//! ```json
//! {
//!   "Emedgene":  {"username": "...", "password": "...", "endpoint": "https://..."},
//!   "Phenotips": {"auth": "...", "secret": "...", "endpoint": "https://..."},
//!   "Paths":     {"run_path": "/runs/", "sample_sheet_path": "/sheets",
//!                 "ref_maps": "/refs/ref_map.tsv", "tertiary_maps": "/refs/tertiary.tsv"},
//!   "GeneYX":    {"server": "https://...", "apiUserId": "...", "apiUserKey": "..."}
//! }
//! ```

use crate::constants::{
    DEFAULT_BACKEND, DEFAULT_CONFIG_FILE, DEFAULT_DECODEUR_PREFIX, DEFAULT_HTTP_TIMEOUT_SECS,
};
use crate::validation::{normalise_endpoint, validate_site_prefix};
use crate::{LabError, LabResult};
use records::GeneyxCredentials;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Filesystem locations and pipeline references used when writing sheets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelinePaths {
    /// Directory containing one sub-directory per sequencing run.
    pub run_dir: PathBuf,
    /// Directory receiving singleton and family sample sheets.
    pub sample_sheet_dir: PathBuf,
    /// Reference map written verbatim into every sheet.
    pub ref_map_file: String,
    /// Tertiary analysis map written verbatim into family sheets.
    pub tertiary_map_file: String,
    /// Directory receiving raw records kept for diagnosis.
    pub diagnostics_dir: PathBuf,
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    paths: PipelinePaths,
    backend: String,
    decodeur_prefix: String,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `LabError::Config` if the backend is blank or the Decodeur site prefix is
    /// not three ASCII letters.
    pub fn new(paths: PipelinePaths, backend: String, decodeur_prefix: String) -> LabResult<Self> {
        if backend.trim().is_empty() {
            return Err(LabError::Config("backend cannot be empty".into()));
        }
        validate_site_prefix(&decodeur_prefix)?;

        Ok(Self {
            paths,
            backend,
            decodeur_prefix,
        })
    }

    pub fn run_dir(&self) -> &Path {
        &self.paths.run_dir
    }

    /// Directory of a single sequencing run.
    pub fn run_path(&self, run_id: &str) -> PathBuf {
        self.paths.run_dir.join(run_id)
    }

    pub fn sample_sheet_dir(&self) -> &Path {
        &self.paths.sample_sheet_dir
    }

    pub fn ref_map_file(&self) -> &str {
        &self.paths.ref_map_file
    }

    pub fn tertiary_map_file(&self) -> &str {
        &self.paths.tertiary_map_file
    }

    pub fn diagnostics_dir(&self) -> &Path {
        &self.paths.diagnostics_dir
    }

    pub fn backend(&self) -> &str {
        &self.backend
    }

    pub fn decodeur_prefix(&self) -> &str {
        &self.decodeur_prefix
    }
}

/// Emedgene API access.
#[derive(Clone)]
pub struct EmedgeneSettings {
    pub username: String,
    pub password: String,
    /// Base URL without trailing slash.
    pub endpoint: String,
}

impl std::fmt::Debug for EmedgeneSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmedgeneSettings")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Phenotips REST access.
#[derive(Clone)]
pub struct PhenotipsSettings {
    /// Value of the `authorization` header.
    pub auth: String,
    /// Value of the `X-Gene42-Secret` header.
    pub secret: String,
    pub endpoint: String,
}

impl std::fmt::Debug for PhenotipsSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhenotipsSettings")
            .field("auth", &"<redacted>")
            .field("secret", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// GeneYX analysis API access.
#[derive(Clone, Debug)]
pub struct GeneyxSettings {
    pub server: String,
    pub credentials: GeneyxCredentials,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HttpSettings {
    pub timeout: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

/// Everything read from the configuration file.
///
/// Service sections are optional so that offline commands (e.g. PED emission) work with a
/// file that only carries `Paths`. Accessors fail with `LabError::Config` when a command
/// needs a section the file does not provide.
#[derive(Clone, Debug)]
pub struct LabConfig {
    core: CoreConfig,
    emedgene: Option<EmedgeneSettings>,
    phenotips: Option<PhenotipsSettings>,
    geneyx: Option<GeneyxSettings>,
    http: HttpSettings,
}

impl LabConfig {
    pub fn core(&self) -> &CoreConfig {
        &self.core
    }

    pub fn emedgene(&self) -> LabResult<&EmedgeneSettings> {
        self.emedgene
            .as_ref()
            .ok_or_else(|| missing_section("Emedgene"))
    }

    pub fn phenotips(&self) -> LabResult<&PhenotipsSettings> {
        self.phenotips
            .as_ref()
            .ok_or_else(|| missing_section("Phenotips"))
    }

    pub fn geneyx(&self) -> LabResult<&GeneyxSettings> {
        self.geneyx.as_ref().ok_or_else(|| missing_section("GeneYX"))
    }

    pub fn http(&self) -> HttpSettings {
        self.http
    }
}

/// Configuration rooted at `root`, with `runs/`, `sheets/` and `diagnostics/` below it.
#[cfg(test)]
pub(crate) fn test_core_config(root: &Path) -> CoreConfig {
    let paths = PipelinePaths {
        run_dir: root.join("runs"),
        sample_sheet_dir: root.join("sheets"),
        ref_map_file: "/refs/GRCh38.ref_map.v2p0p0.tsv".into(),
        tertiary_map_file: "/refs/GRCh38.tertiary_map.v2p0p0.tsv".into(),
        diagnostics_dir: root.join("diagnostics"),
    };
    CoreConfig::new(paths, DEFAULT_BACKEND.into(), DEFAULT_DECODEUR_PREFIX.into())
        .expect("valid test configuration")
}

fn missing_section(name: &str) -> LabError {
    LabError::Config(format!("configuration has no {name} section"))
}

/// Locate the configuration file without reading environment variables.
///
/// If `override_path` is provided it must be an existing file. Otherwise this looks for
/// `.myconf.json` in the current working directory and then in each of its ancestors.
pub fn resolve_config_path(override_path: Option<PathBuf>) -> LabResult<PathBuf> {
    if let Some(path) = override_path {
        if path.is_file() {
            return Ok(path);
        }
        return Err(LabError::Config(format!(
            "configuration file {} does not exist",
            path.display()
        )));
    }

    let cwd = std::env::current_dir().map_err(|source| LabError::DirRead {
        path: PathBuf::from("."),
        source,
    })?;
    for ancestor in cwd.ancestors() {
        let candidate = ancestor.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            return Ok(candidate);
        }
    }

    Err(LabError::Config(format!(
        "could not locate {DEFAULT_CONFIG_FILE} in the working directory or its parents"
    )))
}

/// Read and validate the configuration file.
///
/// # Errors
///
/// Returns `LabError::FileRead` if the file cannot be read and `LabError::Config` if it
/// does not parse or fails validation. Parse errors name the failing field path.
pub fn load_config(path: &Path) -> LabResult<LabConfig> {
    let text = std::fs::read_to_string(path).map_err(|source| LabError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let wire: ConfigWire = if is_yaml(path) {
        let deserializer = serde_yaml::Deserializer::from_str(&text);
        serde_path_to_error::deserialize(deserializer)
            .map_err(|err| config_parse_error(path, err))?
    } else {
        let mut deserializer = serde_json::Deserializer::from_str(&text);
        serde_path_to_error::deserialize(&mut deserializer)
            .map_err(|err| config_parse_error(path, err))?
    };

    wire.into_config()
}

/// Read GeneYX credentials from a standalone client configuration file (`ga.config.yml`).
pub fn load_geneyx_credentials(path: &Path) -> LabResult<GeneyxCredentials> {
    let text = std::fs::read_to_string(path).map_err(|source| LabError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(GeneyxCredentials::parse_yaml(&text)?)
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yml" | "yaml")
    )
}

fn config_parse_error<E: std::fmt::Display>(
    path: &Path,
    err: serde_path_to_error::Error<E>,
) -> LabError {
    let field = err.path().to_string();
    LabError::Config(format!(
        "{} at {}: {}",
        path.display(),
        if field.is_empty() { "<root>" } else { field.as_str() },
        err.inner()
    ))
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Deserialize)]
struct ConfigWire {
    #[serde(rename = "Emedgene", default)]
    emedgene: Option<EmedgeneWire>,
    #[serde(rename = "Phenotips", default)]
    phenotips: Option<PhenotipsWire>,
    #[serde(rename = "Paths")]
    paths: PathsWire,
    #[serde(rename = "GeneYX", default)]
    geneyx: Option<GeneyxWire>,
    #[serde(rename = "Decodeur", default)]
    decodeur: Option<DecodeurWire>,
    #[serde(rename = "Http", default)]
    http: Option<HttpWire>,
}

#[derive(Deserialize)]
struct EmedgeneWire {
    username: String,
    password: String,
    endpoint: String,
}

#[derive(Deserialize)]
struct PhenotipsWire {
    auth: String,
    secret: String,
    endpoint: String,
}

#[derive(Deserialize)]
struct PathsWire {
    run_path: PathBuf,
    sample_sheet_path: PathBuf,
    ref_maps: String,
    tertiary_maps: String,
    #[serde(default)]
    diagnostics_path: Option<PathBuf>,
    #[serde(default)]
    backend: Option<String>,
}

#[derive(Deserialize)]
struct GeneyxWire {
    server: String,
    #[serde(flatten)]
    credentials: GeneyxCredentials,
}

#[derive(Deserialize)]
struct DecodeurWire {
    prefix: String,
}

#[derive(Deserialize)]
struct HttpWire {
    timeout_secs: u64,
}

impl ConfigWire {
    fn into_config(self) -> LabResult<LabConfig> {
        let paths = PipelinePaths {
            run_dir: self.paths.run_path,
            sample_sheet_dir: self.paths.sample_sheet_path,
            ref_map_file: self.paths.ref_maps,
            tertiary_map_file: self.paths.tertiary_maps,
            diagnostics_dir: self
                .paths
                .diagnostics_path
                .unwrap_or_else(|| PathBuf::from(".")),
        };
        let core = CoreConfig::new(
            paths,
            self.paths
                .backend
                .unwrap_or_else(|| DEFAULT_BACKEND.to_string()),
            self.decodeur
                .map(|d| d.prefix)
                .unwrap_or_else(|| DEFAULT_DECODEUR_PREFIX.to_string()),
        )?;

        let emedgene = self
            .emedgene
            .map(|wire| -> LabResult<_> {
                Ok(EmedgeneSettings {
                    endpoint: normalise_endpoint("Emedgene", &wire.endpoint)?,
                    username: wire.username,
                    password: wire.password,
                })
            })
            .transpose()?;

        let phenotips = self
            .phenotips
            .map(|wire| -> LabResult<_> {
                Ok(PhenotipsSettings {
                    endpoint: normalise_endpoint("Phenotips", &wire.endpoint)?,
                    auth: wire.auth,
                    secret: wire.secret,
                })
            })
            .transpose()?;

        let geneyx = self
            .geneyx
            .map(|wire| -> LabResult<_> {
                Ok(GeneyxSettings {
                    server: normalise_endpoint("GeneYX", &wire.server)?,
                    credentials: wire.credentials,
                })
            })
            .transpose()?;

        let http = match self.http {
            Some(HttpWire { timeout_secs: 0 }) => {
                return Err(LabError::Config(
                    "Http.timeout_secs must be greater than zero".into(),
                ))
            }
            Some(HttpWire { timeout_secs }) => HttpSettings {
                timeout: Duration::from_secs(timeout_secs),
            },
            None => HttpSettings::default(),
        };

        Ok(LabConfig {
            core,
            emedgene,
            phenotips,
            geneyx,
            http,
        })
    }
}
