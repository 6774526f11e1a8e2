use labops_core::LabError;
use records::RecordsError;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("{service} request failed: {source}")]
    Http {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{service} answered HTTP {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },
    #[error("{service} refused the request (HTTP {status}): {detail}")]
    Unauthorized {
        service: &'static str,
        status: u16,
        detail: String,
    },
    #[error("{service} sent an unreadable response: {detail}")]
    InvalidResponse {
        service: &'static str,
        detail: String,
    },
    #[error(transparent)]
    Records(#[from] RecordsError),
    #[error(transparent)]
    Lab(#[from] LabError),
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Attach the service name to a transport error.
pub(crate) fn transport(service: &'static str) -> impl FnOnce(reqwest::Error) -> ClientError {
    move |source| ClientError::Http { service, source }
}

impl From<ClientError> for LabError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Http { service, source } => LabError::UpstreamUnavailable {
                service,
                status: source.status().map(|s| s.as_u16()),
                detail: source.to_string(),
            },
            ClientError::Status {
                service,
                status,
                body,
            } => LabError::UpstreamUnavailable {
                service,
                status: Some(status),
                detail: body,
            },
            ClientError::Unauthorized {
                service,
                status,
                detail,
            } => LabError::UpstreamUnavailable {
                service,
                status: Some(status),
                detail,
            },
            ClientError::InvalidResponse { service, detail } => {
                LabError::InvalidUpstreamResponse { service, detail }
            }
            ClientError::Records(err) => LabError::from(err),
            ClientError::Lab(err) => err,
        }
    }
}
