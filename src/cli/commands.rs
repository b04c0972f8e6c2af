use crate::cli::args::{BuildArgs, Cli, Commands, IngestArgs};
use crate::cli::logging::init_logging;
use crate::db::{Database, TableDescription};
use crate::error::Result;
use crate::models::{BuildReport, IngestReport};
use crate::processors::{CsvIngestor, MasterTableBuilder};
use crate::settings::Settings;
use crate::utils::progress::ProgressReporter;
use serde::Serialize;
use tracing::info;

#[derive(Serialize)]
struct RunReport<'a> {
    ingest: &'a IngestReport,
    build: &'a BuildReport,
}

pub fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(path) = cli.database {
        settings.database.path = path;
    }

    match cli.command {
        Commands::Ingest { ingest, json } => {
            apply_ingest_args(&mut settings, ingest);
            settings.check()?;
            settings.ensure_base_path()?;

            let mut db = Database::open(&settings.database)?;
            let report = ingest_step(&mut db, &settings, cli.quiet || json)?;
            print_report(&report, json, IngestReport::summary)?;
        }

        Commands::Build { build, json } => {
            apply_build_args(&mut settings, build);
            settings.check()?;

            let mut db = Database::open(&settings.database)?;
            let report = build_step(&mut db, &settings, cli.quiet || json)?;
            print_report(&report, json, BuildReport::summary)?;
        }

        Commands::Run {
            ingest,
            build,
            json,
        } => {
            apply_ingest_args(&mut settings, ingest);
            apply_build_args(&mut settings, build);
            settings.check()?;
            settings.ensure_base_path()?;

            let mut db = Database::open(&settings.database)?;
            let ingest_report = ingest_step(&mut db, &settings, cli.quiet || json)?;
            let build_report = build_step(&mut db, &settings, cli.quiet || json)?;

            let combined = RunReport {
                ingest: &ingest_report,
                build: &build_report,
            };
            print_report(&combined, json, |r: &RunReport| {
                format!("{}\n{}", r.ingest.summary(), r.build.summary())
            })?;
        }

        Commands::Describe {
            table,
            sample,
            json,
        } => {
            let db = Database::open(&settings.database)?;
            let description = db.describe(&table, sample)?;
            print_report(&description, json, TableDescription::summary)?;
        }
    }

    Ok(())
}

fn apply_ingest_args(settings: &mut Settings, args: IngestArgs) {
    if let Some(base_path) = args.base_path {
        settings.ingest.base_path = base_path;
    }
    if !args.folders.is_empty() {
        settings.ingest.folders = args.folders;
    }
}

fn apply_build_args(settings: &mut Settings, args: BuildArgs) {
    if let Some(from_year) = args.from_year {
        settings.build.from_year = from_year;
    }
    if let Some(to_year) = args.to_year {
        settings.build.to_year = to_year;
    }
    if args.refresh_tables_per_year {
        settings.build.refresh_tables_per_year = true;
    }
}

fn ingest_step(db: &mut Database, settings: &Settings, silent: bool) -> Result<IngestReport> {
    info!(
        base_path = %settings.ingest.base_path.display(),
        folders = ?settings.ingest.folders,
        "starting ingestion"
    );

    let ingestor = CsvIngestor::new();
    let total = ingestor.count_files(&settings.ingest)?;
    let progress = ProgressReporter::new(total as u64, "Importing CSV files...", silent);

    let report = ingestor.ingest_all(db, &settings.ingest, Some(&progress))?;
    progress.finish_with_message(&format!(
        "Imported {} files ({} rows)",
        report.tables.len(),
        report.total_rows()
    ));

    Ok(report)
}

fn build_step(db: &mut Database, settings: &Settings, silent: bool) -> Result<BuildReport> {
    let years = settings.build.years().count() as u64;
    let progress = ProgressReporter::new(years, "Building master tables...", silent);

    let builder = MasterTableBuilder::new(settings.build.clone());
    let report = builder.build_all(db, Some(&progress))?;
    progress.finish_with_message(&format!("Built {} master tables", report.years.len()));

    Ok(report)
}

fn print_report<T, F>(report: &T, json: bool, summary: F) -> Result<()>
where
    T: Serialize,
    F: Fn(&T) -> String,
{
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("\n{}", summary(report));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_cli_overrides_replace_settings() {
        let mut settings = Settings::default();
        apply_ingest_args(
            &mut settings,
            IngestArgs {
                base_path: Some(PathBuf::from("data")),
                folders: vec!["TAVG".to_string()],
            },
        );
        apply_build_args(
            &mut settings,
            BuildArgs {
                from_year: Some(2010),
                to_year: None,
                refresh_tables_per_year: true,
            },
        );

        assert_eq!(settings.ingest.base_path, PathBuf::from("data"));
        assert_eq!(settings.ingest.folders, vec!["TAVG"]);
        assert_eq!(settings.build.years(), 2010..=2055);
        assert!(settings.build.refresh_tables_per_year);
    }

    #[test]
    fn test_empty_overrides_keep_defaults() {
        let mut settings = Settings::default();
        apply_ingest_args(&mut settings, IngestArgs::default());
        apply_build_args(&mut settings, BuildArgs::default());

        assert_eq!(settings.ingest.folders.len(), 4);
        assert_eq!(settings.build.from_year, 1995);
        assert!(!settings.build.refresh_tables_per_year);
    }
}
