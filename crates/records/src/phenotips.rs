//! Phenotips patient feature lists.

use crate::{from_json_with_path, RecordsResult};
use serde::Deserialize;

/// Observed and excluded phenotype features of one Phenotips patient.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhenotipsPatient {
    features: Vec<Feature>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Feature {
    id: String,
    observed: bool,
}

impl PhenotipsPatient {
    /// Parse the JSON body of a `rest/patients/<id>` response.
    pub fn parse(json_text: &str) -> RecordsResult<Self> {
        let wire: PatientWire = from_json_with_path("phenotips patient", json_text)?;
        Ok(Self {
            features: wire
                .features
                .into_iter()
                .map(|f| Feature {
                    id: f.id,
                    observed: f.observed.as_deref() == Some("yes"),
                })
                .collect(),
        })
    }

    /// Observed HPO terms in upstream order.
    pub fn observed_terms(&self) -> impl Iterator<Item = &str> {
        self.features
            .iter()
            .filter(|f| f.observed)
            .map(|f| f.id.as_str())
    }

    /// Observed HPO terms as the comma-joined string sample sheets expect,
    /// e.g. `HP:0001250,HP:0001263`. Quote characters are stripped.
    pub fn hpo_string(&self) -> String {
        self.observed_terms()
            .collect::<Vec<_>>()
            .join(",")
            .replace(['\'', '"'], "")
    }
}

#[derive(Deserialize)]
struct PatientWire {
    #[serde(default)]
    features: Vec<FeatureWire>,
}

#[derive(Deserialize)]
struct FeatureWire {
    id: String,
    #[serde(default)]
    observed: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_observed_terms() {
        let patient = PhenotipsPatient::parse(
            r#"{"id": "P0001234", "features": [
                {"id": "HP:0001250", "observed": "yes", "label": "Seizure"},
                {"id": "HP:0000252", "observed": "no"},
                {"id": "HP:0001263", "observed": "yes"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(patient.hpo_string(), "HP:0001250,HP:0001263");
    }

    #[test]
    fn strips_quote_characters() {
        let patient = PhenotipsPatient::parse(
            r#"{"features": [{"id": "'HP:0001250'", "observed": "yes"}]}"#,
        )
        .unwrap();
        assert_eq!(patient.hpo_string(), "HP:0001250");
    }

    #[test]
    fn patient_without_features_has_empty_string() {
        let patient = PhenotipsPatient::parse(r#"{"id": "P0001234"}"#).unwrap();
        assert_eq!(patient.hpo_string(), "");
    }
}
