use crate::{ClientResult, EmedgeneClient, PhenotipsClient};
use labops_core::{CaseLookup, CaseMatch, LabConfig, LabResult};
use serde_json::Value;

/// Case lookup backed by Emedgene (cases) and Phenotips (phenotypes).
pub struct CaseServices {
    emedgene: EmedgeneClient,
    phenotips: PhenotipsClient,
}

impl CaseServices {
    pub fn new(emedgene: EmedgeneClient, phenotips: PhenotipsClient) -> Self {
        Self {
            emedgene,
            phenotips,
        }
    }

    /// Build both clients from the configuration file.
    ///
    /// # Errors
    ///
    /// Fails if the `Emedgene` or `Phenotips` section is missing.
    pub fn from_config(config: &LabConfig) -> ClientResult<Self> {
        let http = config.http();
        Ok(Self::new(
            EmedgeneClient::new(config.emedgene()?.clone(), &http)?,
            PhenotipsClient::new(config.phenotips()?.clone(), &http)?,
        ))
    }
}

impl CaseLookup for CaseServices {
    fn find_case(&mut self, sample: &str) -> LabResult<Option<CaseMatch>> {
        Ok(self.emedgene.find_case(sample)?)
    }

    fn case_document(&mut self, case_id: &str) -> LabResult<Value> {
        Ok(self.emedgene.case_document(case_id)?)
    }

    fn hpo_terms(&mut self, phenotips_id: &str) -> LabResult<String> {
        Ok(self.phenotips.hpo_terms(phenotips_id)?)
    }
}
