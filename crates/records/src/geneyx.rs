//! GeneYX analysis API payloads.
//!
//! Every GeneYX request carries the API user id and key in its JSON body. The service
//! answers with a `Code` field that contains `error` when the call was rejected.

use crate::{from_json_with_path, RecordsError, RecordsResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// API credentials for GeneYX.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneyxCredentials {
    #[serde(rename = "apiUserId")]
    pub api_user_id: String,
    #[serde(rename = "apiUserKey")]
    pub api_user_key: String,
}

impl std::fmt::Debug for GeneyxCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneyxCredentials")
            .field("api_user_id", &self.api_user_id)
            .field("api_user_key", &"<redacted>")
            .finish()
    }
}

impl GeneyxCredentials {
    /// Parse a GeneYX client configuration file (`ga.config.yml`).
    ///
    /// Only `apiUserId` and `apiUserKey` are read; other keys are ignored.
    pub fn parse_yaml(yaml_text: &str) -> RecordsResult<Self> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);
        serde_path_to_error::deserialize::<_, Self>(deserializer)
            .map_err(|err| crate::schema_mismatch("geneyx config", err))
    }

    /// Request body for calls that only need the credentials (e.g. sample listing).
    pub fn to_request_body(&self) -> Value {
        serde_json::json!({
            "ApiUserId": self.api_user_id,
            "ApiUserKey": self.api_user_key,
        })
    }
}

/// Request body assigning one sample to a GeneYX group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GroupAssignmentRequest {
    pub serial_number: String,
    pub group_assignment: Vec<GroupAssignmentWire>,
    pub api_user_id: String,
    pub api_user_key: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GroupAssignmentWire {
    pub code: String,
    pub name: String,
}

impl GroupAssignmentRequest {
    pub fn new(
        serial_number: impl Into<String>,
        code: &str,
        display_name: &str,
        credentials: &GeneyxCredentials,
    ) -> Self {
        Self {
            serial_number: serial_number.into(),
            group_assignment: vec![GroupAssignmentWire {
                code: code.to_string(),
                name: display_name.to_string(),
            }],
            api_user_id: credentials.api_user_id.clone(),
            api_user_key: credentials.api_user_key.clone(),
        }
    }
}

/// Verdict on a GeneYX response body.
#[derive(Clone, Debug, PartialEq)]
pub enum AssignmentOutcome {
    Success(Value),
    Rejected(String),
}

impl AssignmentOutcome {
    /// Classify a response body. A body that is not JSON, or whose `Code`
    /// mentions `error`, counts as rejected.
    pub fn from_response(body: &str) -> Self {
        let Ok(value) = serde_json::from_str::<Value>(body) else {
            return AssignmentOutcome::Rejected(body.to_string());
        };
        let code = value.get("Code").and_then(Value::as_str).unwrap_or_default();
        if code.to_ascii_lowercase().contains("error") {
            AssignmentOutcome::Rejected(body.to_string())
        } else {
            AssignmentOutcome::Success(value)
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AssignmentOutcome::Success(_))
    }
}

/// Extract the `Data` array of a sample listing response.
pub fn samples_from_response(body: &str) -> RecordsResult<Vec<Value>> {
    if let AssignmentOutcome::Rejected(text) = AssignmentOutcome::from_response(body) {
        return Err(RecordsError::InvalidInput(format!(
            "GeneYX rejected the sample listing: {text}"
        )));
    }

    #[derive(Deserialize)]
    struct SamplesWire {
        #[serde(rename = "Data")]
        data: Vec<Value>,
    }

    let wire: SamplesWire = from_json_with_path("geneyx samples", body)?;
    Ok(wire.data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> GeneyxCredentials {
        GeneyxCredentials {
            api_user_id: "user-1".into(),
            api_user_key: "secret".into(),
        }
    }

    #[test]
    fn assignment_request_uses_pascal_case_keys() {
        let request = GroupAssignmentRequest::new("VCF-42", "prag", "Pragmatiq", &creds());
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["SerialNumber"], "VCF-42");
        assert_eq!(value["GroupAssignment"][0]["Code"], "prag");
        assert_eq!(value["GroupAssignment"][0]["Name"], "Pragmatiq");
        assert_eq!(value["ApiUserId"], "user-1");
        assert_eq!(value["ApiUserKey"], "secret");
    }

    #[test]
    fn error_code_is_rejected() {
        let outcome = AssignmentOutcome::from_response(r#"{"Code": "error", "Message": "bad"}"#);
        assert!(!outcome.is_success());
        let outcome = AssignmentOutcome::from_response(r#"{"Code": "ok"}"#);
        assert!(outcome.is_success());
        assert!(!AssignmentOutcome::from_response("<html>").is_success());
    }

    #[test]
    fn credentials_parse_from_yaml() {
        let creds = GeneyxCredentials::parse_yaml(
            "server: https://analysis.geneyx.com\napiUserId: abc\napiUserKey: xyz\n",
        )
        .unwrap();
        assert_eq!(creds.api_user_id, "abc");
        assert!(!format!("{creds:?}").contains("xyz"));
    }

    #[test]
    fn sample_listing_returns_data() {
        let samples =
            samples_from_response(r#"{"Code": "Success", "Data": [{"Id": 1}, {"Id": 2}]}"#)
                .unwrap();
        assert_eq!(samples.len(), 2);
        assert!(samples_from_response(r#"{"Code": "error"}"#).is_err());
    }
}
