//! Recoverable findings raised while resolving samples.
//!
//! Resolution never writes files or aborts on questionable upstream data. Instead it returns
//! [`Diagnostic`] values next to its result; the caller decides whether to log them, persist
//! the attached raw record, or both.

use crate::constants::DIAGNOSTIC_FILE_SUFFIX;
use crate::{LabError, LabResult};
use serde_json::Value;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// The target sample is bound to more than one member; the first binding is kept.
    AmbiguousBinding,
    /// A father reported as Female or a mother reported as Male.
    RoleGenderMismatch,
    /// Status, role or gender could not be determined.
    UnresolvedAttribute,
    /// A parent carries phenotypes other than `Healthy`.
    AffectedParent,
    /// The sample search matched more than one case; the most recent is used.
    AmbiguousCase,
}

impl DiagnosticKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticKind::AmbiguousBinding => "ambiguous_binding",
            DiagnosticKind::RoleGenderMismatch => "role_gender_mismatch",
            DiagnosticKind::UnresolvedAttribute => "unresolved_attribute",
            DiagnosticKind::AffectedParent => "affected_parent",
            DiagnosticKind::AmbiguousCase => "ambiguous_case",
        }
    }
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Sample the finding is about.
    pub subject: String,
    pub message: String,
    /// Upstream document the finding was raised on, when it is worth keeping.
    pub raw_record: Option<Value>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, subject: &str, message: impl Into<String>) -> Self {
        Self {
            kind,
            subject: subject.to_string(),
            message: message.into(),
            raw_record: None,
        }
    }

    pub fn with_raw_record(mut self, raw: &Value) -> Self {
        self.raw_record = Some(raw.clone());
        self
    }

    /// Emit the diagnostic as a `warn` event.
    pub fn log(&self) {
        tracing::warn!(
            kind = %self.kind,
            sample = %self.subject,
            has_raw_record = self.raw_record.is_some(),
            "{}",
            self.message
        );
    }
}

/// Path of the side file holding the raw record for `subject`.
pub fn diagnostic_path(dir: &Path, subject: &str) -> PathBuf {
    dir.join(format!("{subject}{DIAGNOSTIC_FILE_SUFFIX}"))
}

/// Write `raw` as pretty JSON to `<dir>/<subject>_error.json`, replacing any earlier file.
pub fn persist_raw_record(dir: &Path, subject: &str, raw: &Value) -> LabResult<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|source| LabError::FileWrite {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = diagnostic_path(dir, subject);
    let text = serde_json::to_string_pretty(raw).map_err(LabError::Serialization)?;
    std::fs::write(&path, text).map_err(|source| LabError::FileWrite {
        path: path.clone(),
        source,
    })?;

    tracing::info!(path = %path.display(), "raw record kept for diagnosis");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn persists_raw_record_under_subject_name() {
        let dir = TempDir::new().unwrap();
        let raw = json!({"patients": {"proband": {"fastq_sample": "GM001"}}});

        let path = persist_raw_record(dir.path(), "GM001", &raw).expect("written");

        assert_eq!(path, dir.path().join("GM001_error.json"));
        let reread: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(reread, raw);
    }

    #[test]
    fn builder_attaches_raw_record() {
        let diagnostic = Diagnostic::new(DiagnosticKind::UnresolvedAttribute, "GM002", "no role")
            .with_raw_record(&json!({"patients": {}}));
        assert_eq!(diagnostic.kind.as_str(), "unresolved_attribute");
        assert!(diagnostic.raw_record.is_some());
    }
}
