//! GeneYX analysis API: group assignment and sample listing.
//!
//! Every request is a JSON `POST` carrying the API user id and key in its body.

use crate::error::{transport, ClientError, ClientResult};
use crate::{http_client, read_body};
use labops_core::{GeneyxGroup, GeneyxSettings, HttpSettings};
use records::{samples_from_response, AssignmentOutcome, GroupAssignmentRequest};
use reqwest::blocking::{Client, Request};
use serde_json::Value;

const SERVICE: &str = "GeneYX";

/// Result of assigning a batch of samples to a group.
#[derive(Debug, Default)]
pub struct AssignmentReport {
    pub assigned: Vec<String>,
    /// Serial number and the reason it was not assigned.
    pub rejected: Vec<(String, String)>,
}

impl AssignmentReport {
    pub fn is_complete(&self) -> bool {
        self.rejected.is_empty()
    }
}

pub struct GeneyxClient {
    http: Client,
    settings: GeneyxSettings,
}

impl GeneyxClient {
    pub fn new(settings: GeneyxSettings, http: &HttpSettings) -> ClientResult<Self> {
        Ok(Self {
            http: http_client(http)?,
            settings,
        })
    }

    /// Assign one sample to `group`.
    pub fn assign_group(
        &self,
        serial_number: &str,
        group: GeneyxGroup,
    ) -> ClientResult<AssignmentOutcome> {
        let request = self
            .assignment_request(serial_number, group)
            .map_err(transport(SERVICE))?;
        let response = self.http.execute(request).map_err(transport(SERVICE))?;
        let body = read_body(SERVICE, response)?;
        Ok(AssignmentOutcome::from_response(&body))
    }

    /// Assign every serial to `group`, continuing past rejected samples.
    ///
    /// # Errors
    ///
    /// Stops at the first refused request: the remaining calls would be refused too.
    pub fn assign_all(
        &self,
        serial_numbers: &[String],
        group: GeneyxGroup,
    ) -> ClientResult<AssignmentReport> {
        let mut report = AssignmentReport::default();
        for serial in serial_numbers {
            match self.assign_group(serial, group) {
                Ok(AssignmentOutcome::Success(_)) => {
                    tracing::info!(serial = %serial, group = %group, "sample assigned");
                    report.assigned.push(serial.clone());
                }
                Ok(AssignmentOutcome::Rejected(body)) => {
                    tracing::warn!(serial = %serial, group = %group, response = %body, "assignment rejected");
                    report.rejected.push((serial.clone(), body));
                }
                Err(err @ ClientError::Unauthorized { .. }) => return Err(err),
                Err(err) => {
                    tracing::error!(serial = %serial, error = %err, "assignment failed");
                    report.rejected.push((serial.clone(), err.to_string()));
                }
            }
        }
        Ok(report)
    }

    /// Every sample visible to the API user, as listed by GeneYX.
    pub fn list_samples(&self) -> ClientResult<Vec<Value>> {
        let request = self
            .http
            .post(format!("{}/api/Samples", self.settings.server))
            .json(&self.settings.credentials.to_request_body())
            .build()
            .map_err(transport(SERVICE))?;
        let response = self.http.execute(request).map_err(transport(SERVICE))?;
        let body = read_body(SERVICE, response)?;
        let samples = samples_from_response(&body)?;
        tracing::info!(samples = samples.len(), "listed GeneYX samples");
        Ok(samples)
    }

    fn assignment_request(
        &self,
        serial_number: &str,
        group: GeneyxGroup,
    ) -> reqwest::Result<Request> {
        let payload = GroupAssignmentRequest::new(
            serial_number,
            group.code(),
            group.display_name(),
            &self.settings.credentials,
        );
        self.http
            .post(format!("{}/api/SampleAssignment", self.settings.server))
            .json(&payload)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use records::GeneyxCredentials;
    use serde_json::json;

    #[test]
    fn assignment_request_names_the_group() {
        let client = GeneyxClient::new(
            GeneyxSettings {
                server: "https://analysis.geneyx.com".into(),
                credentials: GeneyxCredentials {
                    api_user_id: "user-1".into(),
                    api_user_key: "key-1".into(),
                },
            },
            &HttpSettings::default(),
        )
        .unwrap();

        let request = client
            .assignment_request("VCF-42", GeneyxGroup::ControleParent)
            .unwrap();

        assert_eq!(
            request.url().as_str(),
            "https://analysis.geneyx.com/api/SampleAssignment"
        );
        let body: Value =
            serde_json::from_slice(request.body().and_then(|b| b.as_bytes()).unwrap()).unwrap();
        assert_eq!(
            body,
            json!({
                "SerialNumber": "VCF-42",
                "GroupAssignment": [{"Code": "controle", "Name": "ControleParent"}],
                "ApiUserId": "user-1",
                "ApiUserKey": "key-1"
            })
        );
    }

    #[test]
    fn report_tracks_rejections() {
        let mut report = AssignmentReport::default();
        assert!(report.is_complete());
        report.rejected.push(("VCF-1".into(), "{\"Code\":\"error\"}".into()));
        assert!(!report.is_complete());
    }
}
