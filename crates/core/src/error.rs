use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum LabError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("configuration error: {0}")]
    Config(String),

    /// An upstream record lacks a field needed to continue resolution.
    #[error("schema mismatch for {subject} at {path}: {message}")]
    SchemaMismatch {
        subject: String,
        path: String,
        message: String,
        /// The offending document, kept so the caller can persist it.
        raw_record: Option<Box<serde_json::Value>>,
    },
    /// Invalid group code, gender string or naming-convention suffix.
    #[error("unrecognized input: {0}")]
    UnrecognizedInput(String),
    #[error(
        "{service} unavailable{status}: {detail}",
        status = http_status_suffix(status)
    )]
    UpstreamUnavailable {
        service: &'static str,
        status: Option<u16>,
        detail: String,
    },
    /// The service answered, but with a body that cannot be read. Retrying will not help.
    #[error("{service} sent an unreadable response: {detail}")]
    InvalidUpstreamResponse {
        service: &'static str,
        detail: String,
    },
    #[error("precondition violated: {0}")]
    PreconditionViolation(String),

    #[error("failed to read {path}: {source}", path = path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}", path = path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to list directory {path}: {source}", path = path.display())]
    DirRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize JSON: {0}")]
    Serialization(serde_json::Error),
    #[error("invalid sample list: {0}")]
    Csv(#[from] csv::Error),
    #[error("record error: {0}")]
    Records(records::RecordsError),
}

fn http_status_suffix(status: &Option<u16>) -> String {
    status
        .map(|code| format!(" (HTTP {code})"))
        .unwrap_or_default()
}

impl LabError {
    /// Build a [`LabError::SchemaMismatch`] from a boundary error, attaching the raw record.
    pub fn from_records(
        err: records::RecordsError,
        subject: &str,
        raw_record: Option<&serde_json::Value>,
    ) -> Self {
        match err {
            records::RecordsError::SchemaMismatch {
                document,
                path,
                message,
            } => LabError::SchemaMismatch {
                subject: subject.to_string(),
                path: format!("{document}:{path}"),
                message,
                raw_record: raw_record.map(|v| Box::new(v.clone())),
            },
            other => other.into(),
        }
    }

    /// 401/403 from an upstream service: re-authenticate before retrying.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            LabError::UpstreamUnavailable {
                status: Some(401 | 403),
                ..
            }
        )
    }

    /// Timeouts, connection failures and 5xx responses.
    pub fn is_transient(&self) -> bool {
        match self {
            LabError::UpstreamUnavailable { status, .. } => match status {
                None => true,
                Some(code) => *code >= 500,
            },
            _ => false,
        }
    }

    /// Raw upstream document attached to the error, if any.
    pub fn raw_record(&self) -> Option<&serde_json::Value> {
        match self {
            LabError::SchemaMismatch { raw_record, .. } => raw_record.as_deref(),
            _ => None,
        }
    }
}

impl From<records::RecordsError> for LabError {
    fn from(err: records::RecordsError) -> Self {
        match err {
            records::RecordsError::Unrecognized(message) => LabError::UnrecognizedInput(message),
            records::RecordsError::SchemaMismatch {
                document,
                path,
                message,
            } => LabError::SchemaMismatch {
                subject: document.to_string(),
                path,
                message,
                raw_record: None,
            },
            other => LabError::Records(other),
        }
    }
}

impl From<labops_types::TextError> for LabError {
    fn from(err: labops_types::TextError) -> Self {
        LabError::InvalidInput(err.to_string())
    }
}

pub type LabResult<T> = std::result::Result<T, LabError>;
