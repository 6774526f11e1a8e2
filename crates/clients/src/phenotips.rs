//! Phenotips REST API: patient phenotype features.

use crate::error::{transport, ClientResult};
use crate::{http_client, read_body};
use labops_core::{HttpSettings, PhenotipsSettings};
use records::PhenotipsPatient;
use reqwest::blocking::{Client, Request};
use reqwest::header::{ACCEPT, AUTHORIZATION};

const SERVICE: &str = "Phenotips";
const SECRET_HEADER: &str = "X-Gene42-Secret";

pub struct PhenotipsClient {
    http: Client,
    settings: PhenotipsSettings,
}

impl PhenotipsClient {
    pub fn new(settings: PhenotipsSettings, http: &HttpSettings) -> ClientResult<Self> {
        Ok(Self {
            http: http_client(http)?,
            settings,
        })
    }

    pub fn patient(&self, phenotips_id: &str) -> ClientResult<PhenotipsPatient> {
        let request = self.patient_request(phenotips_id).map_err(transport(SERVICE))?;
        let response = self.http.execute(request).map_err(transport(SERVICE))?;
        let body = read_body(SERVICE, response)?;
        Ok(PhenotipsPatient::parse(&body)?)
    }

    /// Observed HPO terms of a patient, comma-joined.
    pub fn hpo_terms(&self, phenotips_id: &str) -> ClientResult<String> {
        let terms = self.patient(phenotips_id)?.hpo_string();
        tracing::debug!(phenotips_id, terms = %terms, "fetched HPO terms");
        Ok(terms)
    }

    fn patient_request(&self, phenotips_id: &str) -> reqwest::Result<Request> {
        self.http
            .get(format!("{}/rest/patients/{phenotips_id}", self.settings.endpoint))
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, self.settings.auth.as_str())
            .header(SECRET_HEADER, self.settings.secret.as_str())
            .build()
    }
}
