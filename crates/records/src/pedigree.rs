//! PED pedigree files.
//!
//! A PED file has one tab-separated line per individual:
//!
//! ```text
//! family  individual  father  mother  sex  affected
//! p054    25-01142-T1 25-01144-T1 25-01146-T1 1 2
//! p054    25-01146-T1         2   1
//! p054    25-01144-T1         1   1
//! ```
//!
//! Sex is `1` (male) or `2` (female); affected is `2` (affected) or `1` (unaffected).
//! Family pedigrees are derived from a family sample sheet: the proband is affected and
//! parents are written as unaffected founders.

use crate::samplesheet::FamilySheet;
use crate::{RecordsError, RecordsResult};

/// PED sex column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SexCode {
    Male,
    Female,
}

impl SexCode {
    /// Map a sample-sheet sex value (`Male`, `MALE`, `M`, `Female`, `FEMALE`, `F`).
    pub fn from_sheet_value(value: &str) -> RecordsResult<Self> {
        match value {
            "Male" | "MALE" | "M" => Ok(SexCode::Male),
            "Female" | "FEMALE" | "F" => Ok(SexCode::Female),
            other => Err(RecordsError::Unrecognized(format!(
                "could not infer sex code from '{other}'"
            ))),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            SexCode::Male => 1,
            SexCode::Female => 2,
        }
    }

    fn from_code(code: &str) -> RecordsResult<Self> {
        match code {
            "1" => Ok(SexCode::Male),
            "2" => Ok(SexCode::Female),
            other => Err(RecordsError::Unrecognized(format!("PED sex code '{other}'"))),
        }
    }
}

/// One PED line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PedMember {
    pub individual_id: String,
    pub father_id: Option<String>,
    pub mother_id: Option<String>,
    pub sex: SexCode,
    pub affected: bool,
}

/// A single-family pedigree. The proband is the first member.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pedigree {
    pub family_id: String,
    pub members: Vec<PedMember>,
}

impl Pedigree {
    /// Build the pedigree of a family sample sheet.
    ///
    /// # Errors
    ///
    /// Returns [`RecordsError::Unrecognized`] if the proband's sex cannot be mapped to a
    /// PED code, and [`RecordsError::InvalidInput`] if the sheet lists no samples or the
    /// proband references no parent.
    pub fn from_family_sheet(family_id: &str, sheet: &FamilySheet) -> RecordsResult<Self> {
        let proband = sheet.proband()?;
        let sex = match proband.sex.as_deref() {
            Some(value) => SexCode::from_sheet_value(value)?,
            None => {
                return Err(RecordsError::Unrecognized(format!(
                    "proband {} has no sex",
                    proband.sample_id
                )))
            }
        };

        if proband.father_id.is_none() && proband.mother_id.is_none() {
            return Err(RecordsError::InvalidInput(format!(
                "proband {} references no parent",
                proband.sample_id
            )));
        }

        let mut members = vec![PedMember {
            individual_id: proband.sample_id.clone(),
            father_id: proband.father_id.clone(),
            mother_id: proband.mother_id.clone(),
            sex,
            affected: true,
        }];
        if let Some(mother) = &proband.mother_id {
            members.push(founder(mother, SexCode::Female));
        }
        if let Some(father) = &proband.father_id {
            members.push(founder(father, SexCode::Male));
        }

        Ok(Self {
            family_id: family_id.to_string(),
            members,
        })
    }

    /// Render as PED text, one line per member, newline-terminated.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for member in &self.members {
            out.push_str(&format!(
                "{}\t{}\t{}\t{}\t{}\t{}\n",
                self.family_id,
                member.individual_id,
                member.father_id.as_deref().unwrap_or_default(),
                member.mother_id.as_deref().unwrap_or_default(),
                member.sex.code(),
                if member.affected { 2 } else { 1 },
            ));
        }
        out
    }

    /// Parse PED text describing one family.
    pub fn parse(text: &str) -> RecordsResult<Self> {
        let mut family_id: Option<String> = None;
        let mut members = Vec::new();

        for (index, line) in text.lines().enumerate() {
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() != 6 {
                return Err(RecordsError::InvalidInput(format!(
                    "PED line {} has {} columns, expected 6",
                    index + 1,
                    fields.len()
                )));
            }

            match &family_id {
                None => family_id = Some(fields[0].to_string()),
                Some(existing) if existing != fields[0] => {
                    return Err(RecordsError::InvalidInput(format!(
                        "PED line {} belongs to family {}, expected {existing}",
                        index + 1,
                        fields[0]
                    )))
                }
                Some(_) => {}
            }

            members.push(PedMember {
                individual_id: fields[1].to_string(),
                father_id: parent_column(fields[2]),
                mother_id: parent_column(fields[3]),
                sex: SexCode::from_code(fields[4])?,
                affected: match fields[5] {
                    "2" => true,
                    "1" => false,
                    other => {
                        return Err(RecordsError::Unrecognized(format!(
                            "PED affected code '{other}'"
                        )))
                    }
                },
            });
        }

        let family_id =
            family_id.ok_or_else(|| RecordsError::InvalidInput("PED text is empty".into()))?;
        Ok(Self { family_id, members })
    }

    pub fn proband(&self) -> Option<&PedMember> {
        self.members.first()
    }
}

fn founder(individual_id: &str, sex: SexCode) -> PedMember {
    PedMember {
        individual_id: individual_id.to_string(),
        father_id: None,
        mother_id: None,
        sex,
        affected: false,
    }
}

fn parent_column(value: &str) -> Option<String> {
    match value.trim() {
        "" | "0" => None,
        id => Some(id.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::samplesheet::{FamilyBlock, FamilySheetSample};

    fn sample(id: &str, sex: Option<&str>) -> FamilySheetSample {
        FamilySheetSample {
            sample_id: id.into(),
            sex: sex.map(str::to_string),
            hifi_reads: vec![],
            fail_reads: vec![],
            affected: false,
            father_id: None,
            mother_id: None,
        }
    }

    fn sheet(proband: FamilySheetSample, parents: Vec<FamilySheetSample>) -> FamilySheet {
        let mut samples = vec![proband];
        samples.extend(parents);
        FamilySheet {
            family: FamilyBlock {
                family_id: "p054".into(),
                samples,
            },
            phenotypes: String::new(),
            ref_map_file: String::new(),
            tertiary_map_file: String::new(),
            backend: "HPC".into(),
        }
    }

    #[test]
    fn trio_renders_three_lines() {
        let mut proband = sample("25-01142-T1", Some("MALE"));
        proband.father_id = Some("25-01144-T1".into());
        proband.mother_id = Some("25-01146-T1".into());
        let sheet = sheet(
            proband,
            vec![
                sample("25-01146-T1", Some("FEMALE")),
                sample("25-01144-T1", Some("MALE")),
            ],
        );

        let ped = Pedigree::from_family_sheet("p054", &sheet).unwrap().render();
        assert_eq!(
            ped,
            "p054\t25-01142-T1\t25-01144-T1\t25-01146-T1\t1\t2\n\
             p054\t25-01146-T1\t\t\t2\t1\n\
             p054\t25-01144-T1\t\t\t1\t1\n"
        );
    }

    #[test]
    fn duo_with_mother_omits_father_line() {
        let mut proband = sample("GM001", Some("F"));
        proband.mother_id = Some("GM002".into());
        let ped = Pedigree::from_family_sheet("FAM", &sheet(proband, vec![])).unwrap();
        assert_eq!(ped.members.len(), 2);
        assert_eq!(ped.render().lines().next(), Some("FAM\tGM001\t\tGM002\t2\t2"));
    }

    #[test]
    fn unrecognised_sex_is_rejected() {
        let mut proband = sample("GM001", Some("unknown"));
        proband.mother_id = Some("GM002".into());
        let err = Pedigree::from_family_sheet("FAM", &sheet(proband, vec![]))
            .expect_err("sex must be recognised");
        assert!(matches!(err, RecordsError::Unrecognized(_)));

        let mut proband = sample("GM001", None);
        proband.mother_id = Some("GM002".into());
        assert!(Pedigree::from_family_sheet("FAM", &sheet(proband, vec![])).is_err());
    }

    #[test]
    fn parse_recovers_rendered_pedigree() {
        let mut proband = sample("GM001", Some("Female"));
        proband.father_id = Some("GM003".into());
        proband.mother_id = Some("GM002".into());
        let ped = Pedigree::from_family_sheet("FAM", &sheet(proband, vec![])).unwrap();

        let reparsed = Pedigree::parse(&ped.render()).unwrap();
        assert_eq!(reparsed, ped);
        assert_eq!(reparsed.proband().unwrap().sex, SexCode::Female);
    }

    #[test]
    fn parse_rejects_mixed_families() {
        let text = "A\tGM001\t\tGM002\t1\t2\nB\tGM002\t\t\t2\t1\n";
        assert!(matches!(
            Pedigree::parse(text),
            Err(RecordsError::InvalidInput(_))
        ));
    }
}
