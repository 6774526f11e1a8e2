//! # Labops Clients
//!
//! Blocking HTTP clients for the services the toolkit talks to:
//! - **Emedgene**: sample search and case documents, behind a session token
//! - **Phenotips**: observed HPO terms of a patient
//! - **GeneYX**: group assignment and sample listing
//!
//! [`CaseServices`] bundles the Emedgene and Phenotips clients into the
//! [`labops_core::CaseLookup`] used by sample resolution.

pub mod emedgene;
pub mod error;
pub mod geneyx;
pub mod phenotips;
pub mod services;

pub use emedgene::EmedgeneClient;
pub use error::{ClientError, ClientResult};
pub use geneyx::{AssignmentReport, GeneyxClient};
pub use phenotips::PhenotipsClient;
pub use services::CaseServices;

use labops_core::HttpSettings;
use reqwest::blocking::{Client, Response};

/// Longest response excerpt kept in an error message.
const MAX_ERROR_BODY: usize = 300;

pub(crate) fn http_client(settings: &HttpSettings) -> ClientResult<Client> {
    Client::builder()
        .timeout(settings.timeout)
        .build()
        .map_err(error::transport("HTTP client"))
}

/// Read the body of `response`, failing on a non-success status.
pub(crate) fn read_body(service: &'static str, response: Response) -> ClientResult<String> {
    let status = response.status().as_u16();
    let body = response.text().map_err(error::transport(service))?;
    check_status(service, status, body)
}

fn check_status(service: &'static str, status: u16, body: String) -> ClientResult<String> {
    match status {
        200..=299 => Ok(body),
        401 | 403 => Err(ClientError::Unauthorized {
            service,
            status,
            detail: excerpt(&body),
        }),
        _ => Err(ClientError::Status {
            service,
            status,
            body: excerpt(&body),
        }),
    }
}

fn excerpt(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((end, _)) => format!("{}...", &body[..end]),
        None => body.to_string(),
    }
}
