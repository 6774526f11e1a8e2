//! Input validation utilities.
//!
//! This module contains functions for validating configuration values before they are
//! used to build file names, request URLs or identifier patterns.

use crate::{LabError, LabResult};

/// Validates a Decodeur site prefix.
///
/// The prefix is matched against the start of every sample name, so it must be exactly
/// three ASCII letters (e.g. `HSJ`).
///
/// # Errors
///
/// Returns a `LabError::Config` if the prefix is invalid.
pub fn validate_site_prefix(prefix: &str) -> LabResult<()> {
    const SITE_PREFIX_LEN: usize = 3;

    if prefix.len() != SITE_PREFIX_LEN || !prefix.bytes().all(|b| b.is_ascii_alphabetic()) {
        return Err(LabError::Config(format!(
            "site prefix '{prefix}' must be exactly {SITE_PREFIX_LEN} ASCII letters"
        )));
    }

    Ok(())
}

/// Validates and normalises a service endpoint.
///
/// Endpoints are joined with request paths (`{endpoint}/api/...`), so they must be an
/// `http`/`https` URL without surrounding whitespace. A trailing `/` is removed.
///
/// # Errors
///
/// Returns a `LabError::Config` if the endpoint is empty or not an HTTP URL.
pub fn normalise_endpoint(service: &str, endpoint: &str) -> LabResult<String> {
    let trimmed = endpoint.trim();
    if trimmed.is_empty() {
        return Err(LabError::Config(format!("{service} endpoint cannot be empty")));
    }

    if !(trimmed.starts_with("https://") || trimmed.starts_with("http://")) {
        return Err(LabError::Config(format!(
            "{service} endpoint must start with http:// or https://"
        )));
    }

    if trimmed.chars().any(char::is_whitespace) {
        return Err(LabError::Config(format!(
            "{service} endpoint contains whitespace"
        )));
    }

    Ok(trimmed.trim_end_matches('/').to_string())
}
