use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use labops_clients::{CaseServices, GeneyxClient};
use labops_core::constants::DEFAULT_SAMPLE_LIST;
use labops_core::{
    family_members, load_config, load_geneyx_credentials, persist_raw_record,
    phenotypes_for_sample, read_family_sheet, read_name_list, read_samples, resolve_config_path,
    serials_for_subjects, write_pedigree, CaseResolver, CaseStatus, CoreConfig, Diagnostic, Family,
    Gender, GeneyxGroup, Identifier, LabConfig,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "labops")]
#[command(about = "HiFi sequencing lab operations")]
struct Cli {
    /// Configuration file (defaults to .myconf.json in the current directory or a parent)
    #[arg(long, global = true, env = "LABOPS_CONFIG")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a sample's family status, role, gender and affected status
    Resolve {
        /// Sample name
        sample: String,
        /// Case document (JSON) the sample belongs to; not needed for Decodeur identifiers
        #[arg(long)]
        case: Option<PathBuf>,
    },
    /// Write the joint sample sheet and pedigree of a family from the sample list
    Family {
        /// Family identifier, used to name the output files
        family_id: String,
        /// Proband sample name
        proband: String,
        #[arg(short, long, default_value = DEFAULT_SAMPLE_LIST)]
        list: PathBuf,
    },
    /// Write a PED pedigree from a family sample sheet
    Ped {
        family_id: String,
        /// Family sample sheet (JSON)
        sheet: PathBuf,
        /// Directory for the .ped file (defaults to the sheet's directory)
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Fetch observed HPO terms for a list of sample names, one line per name
    Hpo {
        /// File with one sample name per line
        names: PathBuf,
        #[arg(short, long, default_value = "returnHPO.txt")]
        output: PathBuf,
    },
    /// Assign a list of samples to a GeneYX group
    AssignGroup {
        /// File with one sample name per line
        #[arg(short, long)]
        list: PathBuf,
        /// CSV export (ID,Subject) of every sample on GeneYX
        #[arg(short = 'f', long, default_value = "geneYXnamesList.csv")]
        export: PathBuf,
        /// Group code: prag, decode, controle or validation
        #[arg(short, long)]
        group: String,
    },
    /// Save the list of every sample visible on GeneYX
    GeneyxSamples {
        #[arg(short, long, default_value = "allGeneYXSampleList.json")]
        output: PathBuf,
        /// GeneYX client configuration (YAML with apiUserId and apiUserKey)
        #[arg(long)]
        credentials: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("labops=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve { sample, case } => {
            let config = load(cli.config)?;
            resolve(config.core(), &sample, case.as_deref())
        }
        Commands::Family {
            family_id,
            proband,
            list,
        } => {
            let config = load(cli.config)?;
            let cfg = config.core();
            let samples = read_samples(&list)?;
            let (proband, parents) = family_members(&samples, &proband)?;
            let family = Family::new(Identifier::new(&family_id)?, proband, &parents)?;

            let sheet = family.write_joint_sheet(cfg)?;
            let ped = write_pedigree(cfg.sample_sheet_dir(), family.family_id(), &family.sheet(cfg)?)?;
            println!("{}", sheet.display());
            println!("{}", ped.display());
            Ok(())
        }
        Commands::Ped {
            family_id,
            sheet,
            output_dir,
        } => {
            let family_sheet = read_family_sheet(&sheet)?;
            let dir = output_dir
                .or_else(|| sheet.parent().map(Path::to_path_buf))
                .unwrap_or_default();
            let ped = write_pedigree(&dir, &Identifier::new(&family_id)?, &family_sheet)?;
            println!("{}", ped.display());
            Ok(())
        }
        Commands::Hpo { names, output } => {
            let config = load(cli.config)?;
            let names = read_name_list(&names)?;
            let mut services = CaseServices::from_config(&config)?;

            let mut lines = String::new();
            for name in &names {
                let terms = phenotypes_for_sample(&mut services, name)?;
                tracing::info!(sample = %name, found = terms.is_some(), "HPO terms fetched");
                lines.push_str(&hpo_line(terms.as_deref()));
                lines.push('\n');
            }
            std::fs::write(&output, lines)
                .with_context(|| format!("failed to write {}", output.display()))?;
            println!("{}", output.display());
            Ok(())
        }
        Commands::AssignGroup {
            list,
            export,
            group,
        } => {
            let group: GeneyxGroup = group.parse()?;
            let config = load(cli.config)?;
            let subjects = read_name_list(&list)?;
            let serials = serials_for_subjects(&export, &subjects)?;
            if serials.is_empty() {
                bail!(
                    "none of the {} listed samples appear in {}",
                    subjects.len(),
                    export.display()
                );
            }

            let client = GeneyxClient::new(config.geneyx()?.clone(), &config.http())?;
            let report = client.assign_all(&serials, group)?;
            println!("{} sample(s) assigned to {group}", report.assigned.len());
            for (serial, reason) in &report.rejected {
                eprintln!("{serial}: {reason}");
            }
            if !report.is_complete() {
                bail!("{} assignment(s) rejected", report.rejected.len());
            }
            Ok(())
        }
        Commands::GeneyxSamples {
            output,
            credentials,
        } => {
            let config = load(cli.config)?;
            let mut settings = config.geneyx()?.clone();
            if let Some(path) = credentials {
                settings.credentials = load_geneyx_credentials(&path)?;
            }

            let samples = GeneyxClient::new(settings, &config.http())?.list_samples()?;
            std::fs::write(&output, serde_json::to_string_pretty(&samples)?)
                .with_context(|| format!("failed to write {}", output.display()))?;
            println!("{} sample(s) saved to {}", samples.len(), output.display());
            Ok(())
        }
    }
}

fn load(config: Option<PathBuf>) -> anyhow::Result<LabConfig> {
    let path = resolve_config_path(config)?;
    tracing::debug!(path = %path.display(), "loading configuration");
    Ok(load_config(&path)?)
}

fn resolve(cfg: &CoreConfig, sample: &str, case: Option<&Path>) -> anyhow::Result<()> {
    let resolver = CaseResolver::new(cfg);
    let resolution = match case {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let raw = serde_json::from_str(&text)
                .with_context(|| format!("{} is not JSON", path.display()))?;
            match resolver.resolve(raw, sample) {
                Ok(resolution) => resolution,
                Err(err) => {
                    if let Some(raw) = err.raw_record() {
                        let kept = persist_raw_record(cfg.diagnostics_dir(), sample, raw)?;
                        eprintln!("raw record kept in {}", kept.display());
                    }
                    return Err(err.into());
                }
            }
        }
        None => resolver.decodeur(sample)?.ok_or_else(|| {
            anyhow!("{sample} is not a Decodeur identifier; pass --case with its case document")
        })?,
    };

    report_diagnostics(cfg, sample, &resolution.diagnostics)?;
    println!("{}", status_line(sample, &resolution.status));
    Ok(())
}

fn report_diagnostics(
    cfg: &CoreConfig,
    sample: &str,
    diagnostics: &[Diagnostic],
) -> anyhow::Result<()> {
    for diagnostic in diagnostics {
        diagnostic.log();
    }
    if let Some(raw) = diagnostics.iter().find_map(|d| d.raw_record.as_ref()) {
        let kept = persist_raw_record(cfg.diagnostics_dir(), sample, raw)?;
        eprintln!("raw record kept in {}", kept.display());
    }
    Ok(())
}

fn status_line(sample: &str, status: &CaseStatus) -> String {
    let affected = match status.affected {
        Some(true) => "affected",
        Some(false) => "unaffected",
        None => "unknown",
    };
    format!(
        "{sample}\t{}\t{}\t{}\t{affected}",
        status.status,
        status.role,
        status.gender.map_or("unknown", Gender::as_str),
    )
}

/// Line of the HPO output file: `;`-separated terms, or `None` when nothing was found.
fn hpo_line(terms: Option<&str>) -> String {
    terms.map_or_else(|| "None".to_string(), |t| t.replace(',', ";"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use labops_core::{FamilyStatus, ParentRole, RoleBinding};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn assign_group_takes_its_short_flags() {
        let cli = Cli::try_parse_from([
            "labops", "assign-group", "-l", "names.txt", "-g", "prag",
        ])
        .unwrap();
        let Commands::AssignGroup { export, group, .. } = cli.command else {
            panic!("expected assign-group");
        };
        assert_eq!(export, PathBuf::from("geneYXnamesList.csv"));
        assert_eq!(group, "prag");
    }

    #[test]
    fn status_line_spells_out_the_role() {
        let status = CaseStatus {
            status: FamilyStatus::Decodeur,
            role: RoleBinding::Parent {
                parent: ParentRole::Mother,
                proband_id: Some("HSJ-010-03".into()),
            },
            gender: Some(Gender::Female),
            affected: Some(false),
        };
        assert_eq!(
            status_line("HSJ-0102", &status),
            "HSJ-0102\tDecodeur\tmother of HSJ-010-03\tFemale\tunaffected"
        );
    }

    #[test]
    fn hpo_lines_use_semicolons() {
        assert_eq!(hpo_line(Some("HP:0001250,HP:0001263")), "HP:0001250;HP:0001263");
        assert_eq!(hpo_line(None), "None");
    }
}
