//! Emedgene case-management API.
//!
//! Calls carry an `Authorization` token obtained from `/api/auth/api_login/`. Tokens expire
//! after a few hours, after which the service answers 401 or 403; the client then logs in
//! again and retries the call once.

use crate::error::{transport, ClientError, ClientResult};
use crate::{http_client, read_body};
use labops_core::{CaseMatch, EmedgeneSettings, HttpSettings};
use records::SampleSearch;
use reqwest::blocking::{Client, Request};
use reqwest::header::AUTHORIZATION;
use serde_json::Value;

const SERVICE: &str = "Emedgene";

pub struct EmedgeneClient {
    http: Client,
    settings: EmedgeneSettings,
    token: Option<String>,
}

impl EmedgeneClient {
    pub fn new(settings: EmedgeneSettings, http: &HttpSettings) -> ClientResult<Self> {
        Ok(Self {
            http: http_client(http)?,
            settings,
            token: None,
        })
    }

    /// Log in and keep the session token.
    pub fn login(&mut self) -> ClientResult<()> {
        let url = format!("{}/api/auth/api_login/", self.settings.endpoint);
        let payload = serde_json::json!({
            "username": self.settings.username,
            "password": self.settings.password,
        });
        let response = self
            .http
            .post(url)
            .json(&payload)
            .send()
            .map_err(transport(SERVICE))?;
        let body = read_body(SERVICE, response)?;
        self.token = Some(token_from_login(&body)?);
        tracing::debug!(username = %self.settings.username, "logged in to Emedgene");
        Ok(())
    }

    /// Most recent case referencing `sample`, or `None` if no case does.
    pub fn find_case(&mut self, sample: &str) -> ClientResult<Option<CaseMatch>> {
        let body = self.send_authorized(|client, token| client.search_request(sample, token))?;
        let search = SampleSearch::parse(&body)?;

        match search.latest_case_id() {
            Some(case_id) => Ok(Some(CaseMatch {
                case_id: case_id.to_string(),
                candidates: search.total(),
            })),
            None => {
                if search.total() > 0 {
                    tracing::warn!(sample, total = search.total(), "search hits carry no case id");
                }
                Ok(None)
            }
        }
    }

    /// Full case document, as received.
    pub fn case_document(&mut self, case_id: &str) -> ClientResult<Value> {
        let body = self.send_authorized(|client, token| client.case_request(case_id, token))?;
        serde_json::from_str(&body).map_err(|err| ClientError::InvalidResponse {
            service: SERVICE,
            detail: format!("case {case_id} is not JSON: {err}"),
        })
    }

    fn search_request(&self, sample: &str, token: &str) -> reqwest::Result<Request> {
        self.http
            .get(format!("{}/api/sample/", self.settings.endpoint))
            .query(&[("query", sample), ("sampleType", "fastq")])
            .header(AUTHORIZATION, token)
            .build()
    }

    fn case_request(&self, case_id: &str, token: &str) -> reqwest::Result<Request> {
        self.http
            .get(format!("{}/api/test/{case_id}/", self.settings.endpoint))
            .header(AUTHORIZATION, token)
            .build()
    }

    /// Send the request built by `build`, logging in first if needed and once more if the
    /// session was refused.
    fn send_authorized<F>(&mut self, build: F) -> ClientResult<String>
    where
        F: Fn(&Self, &str) -> reqwest::Result<Request>,
    {
        let mut relogged = false;
        loop {
            let token = match &self.token {
                Some(token) => token.clone(),
                None => {
                    self.login()?;
                    relogged = true;
                    self.token.clone().unwrap_or_default()
                }
            };

            let request = build(&*self, &token).map_err(transport(SERVICE))?;
            let response = self.http.execute(request).map_err(transport(SERVICE))?;
            match read_body(SERVICE, response) {
                Err(ClientError::Unauthorized { .. }) if !relogged => {
                    tracing::info!("Emedgene session refused, logging in again");
                    self.token = None;
                }
                result => return result,
            }
        }
    }
}

fn token_from_login(body: &str) -> ClientResult<String> {
    let value: Value = serde_json::from_str(body).unwrap_or(Value::Null);
    value
        .get("Authorization")
        .and_then(Value::as_str)
        .filter(|token| !token.trim().is_empty())
        .map(str::to_string)
        .ok_or_else(|| ClientError::Unauthorized {
            service: SERVICE,
            status: 401,
            detail: "login response carried no Authorization token".into(),
        })
}
