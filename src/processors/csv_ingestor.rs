use crate::db::{quoted_column, quoted_table, Database};
use crate::error::Result;
use crate::models::{IngestReport, IngestedTable};
use crate::readers::{CsvFileReader, SourceFile, SourceFolder};
use crate::settings::IngestSettings;
use crate::utils::progress::ProgressReporter;
use rusqlite::params_from_iter;
use tracing::{debug, info};

/// Loads every CSV of the configured source folders into an all-TEXT table.
///
/// Each file is one transaction: drop, create, load, commit. An error stops
/// the batch; files committed before it stay in the database.
pub struct CsvIngestor {
    reader: CsvFileReader,
}

impl CsvIngestor {
    pub fn new() -> Self {
        Self {
            reader: CsvFileReader::new(),
        }
    }

    /// Ingest all folders listed in `settings`, in order
    pub fn ingest_all(
        &self,
        db: &mut Database,
        settings: &IngestSettings,
        progress: Option<&ProgressReporter>,
    ) -> Result<IngestReport> {
        let mut report = IngestReport::start();

        for label in &settings.folders {
            let folder = SourceFolder::new(&settings.base_path, label);
            let files = folder.csv_files()?;
            info!(folder = %label, files = files.len(), "scanning source folder");

            for file in &files {
                if let Some(progress) = progress {
                    progress.set_message(&format!("Importing {}", file.path.display()));
                }

                let table = self.ingest_file(db, label, file)?;

                if let Some(progress) = progress {
                    progress.println(&format!(
                        "-> {} into {} ({} rows)",
                        file.path.display(),
                        table.table,
                        table.rows
                    ));
                    progress.increment(1);
                }
                report.tables.push(table);
            }
        }

        report.finish();
        Ok(report)
    }

    /// Replace the file's table with a fresh copy of its contents
    pub fn ingest_file(
        &self,
        db: &mut Database,
        folder_label: &str,
        file: &SourceFile,
    ) -> Result<IngestedTable> {
        let contents = self.reader.read(&file.path)?;
        let table = quoted_table(&file.table_name)?;
        let columns = contents
            .header
            .iter()
            .map(|name| quoted_column(name))
            .collect::<Result<Vec<_>>>()?;

        let column_defs: Vec<String> = columns.iter().map(|c| format!("{} TEXT", c)).collect();
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
        let insert_sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            placeholders.join(", ")
        );

        let tx = db.transaction()?;
        tx.execute(&format!("DROP TABLE IF EXISTS {}", table), [])?;
        tx.execute(
            &format!("CREATE TABLE {} ({})", table, column_defs.join(", ")),
            [],
        )?;
        debug!(table = %file.table_name, columns = columns.len(), "table recreated");

        let mut rows = 0u64;
        {
            let mut insert = tx.prepare(&insert_sql)?;
            for record in contents.records() {
                let (_line, record) = record?;
                // empty fields load as NULL whether or not they were quoted
                let values = record
                    .iter()
                    .map(|field| if field.is_empty() { None } else { Some(field) });
                insert.execute(params_from_iter(values))?;
                rows += 1;
            }
        }
        tx.commit()?;

        info!(
            source = %file.path.display(),
            table = %file.table_name,
            rows,
            "imported CSV"
        );

        Ok(IngestedTable {
            folder: folder_label.to_string(),
            source: file.path.clone(),
            table: file.table_name.clone(),
            columns: columns.len(),
            rows,
        })
    }

    /// Number of CSV files the configured folders currently hold
    pub fn count_files(&self, settings: &IngestSettings) -> Result<usize> {
        let mut total = 0;
        for label in &settings.folders {
            total += SourceFolder::new(&settings.base_path, label).csv_files()?.len();
        }
        Ok(total)
    }
}

impl Default for CsvIngestor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProcessingError;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn source_file(dir: &Path, folder: &str, name: &str, body: &[u8]) -> SourceFile {
        let folder_path = dir.join(folder);
        fs::create_dir_all(&folder_path).unwrap();
        let path = folder_path.join(name);
        fs::write(&path, body).unwrap();
        SourceFile {
            table_name: crate::utils::ingested_table_name(folder, &path).unwrap(),
            path,
        }
    }

    #[test]
    fn test_ingest_file_loads_text_rows() -> Result<()> {
        let dir = TempDir::new()?;
        let file = source_file(dir.path(), "TAVG", "tavg_1995_m1.csv", b"AreaId,Avg\nA1,5.0\n");
        let mut db = Database::open_in_memory()?;

        let table = CsvIngestor::new().ingest_file(&mut db, "TAVG", &file)?;
        assert_eq!(table.table, "tavg_tavg_1995_m1");
        assert_eq!(table.rows, 1);
        assert_eq!(table.columns, 2);

        let (area, avg): (String, String) = db.connection().query_row(
            "SELECT \"AreaId\", \"Avg\" FROM tavg_tavg_1995_m1",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )?;
        assert_eq!(area, "A1");
        assert_eq!(avg, "5.0");

        Ok(())
    }

    #[test]
    fn test_reingest_replaces_table() -> Result<()> {
        let dir = TempDir::new()?;
        let mut db = Database::open_in_memory()?;
        let ingestor = CsvIngestor::new();

        let file = source_file(dir.path(), "SRA", "sra_2000_m1.csv", b"AreaId,Avg\n1,2\n3,4\n");
        ingestor.ingest_file(&mut db, "SRA", &file)?;
        let file = source_file(dir.path(), "SRA", "sra_2000_m1.csv", b"AreaId,Avg,Extra\n1,2,x\n");
        ingestor.ingest_file(&mut db, "SRA", &file)?;

        let description = db.describe("sra_sra_2000_m1", 0)?;
        assert_eq!(description.row_count, 1);
        assert_eq!(description.columns.len(), 3);

        Ok(())
    }

    #[test]
    fn test_non_ascii_header_survives() -> Result<()> {
        let dir = TempDir::new()?;
        let mut db = Database::open_in_memory()?;
        let file = source_file(
            dir.path(),
            "RH",
            "rh_2001_m4.csv",
            b"K\xf3d,Vlhkost \xb0\n600001,81\n",
        );

        CsvIngestor::new().ingest_file(&mut db, "RH", &file)?;
        let description = db.describe("rh_rh_2001_m4", 0)?;
        let names: Vec<&str> = description.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Kód", "Vlhkost °"]);

        Ok(())
    }

    #[test]
    fn test_failed_file_keeps_previous_table() -> Result<()> {
        let dir = TempDir::new()?;
        let mut db = Database::open_in_memory()?;
        let ingestor = CsvIngestor::new();

        let good = source_file(dir.path(), "WV", "wv_2010_m1.csv", b"AreaId,Avg\n1,3.2\n");
        ingestor.ingest_file(&mut db, "WV", &good)?;

        let bad = good.clone();
        fs::write(&bad.path, b"AreaId,Avg\n1,3.2,9\n")?;
        let err = ingestor.ingest_file(&mut db, "WV", &bad).unwrap_err();
        assert!(matches!(err, ProcessingError::ColumnMismatch { .. }));

        // the failed import rolled back, so the earlier load is intact
        assert_eq!(db.row_count("wv_wv_2010_m1")?, 1);

        Ok(())
    }

    #[test]
    fn test_empty_fields_load_as_null() -> Result<()> {
        let dir = TempDir::new()?;
        let mut db = Database::open_in_memory()?;
        let file = source_file(
            dir.path(),
            "SRA",
            "sra_1999_m3.csv",
            b"AreaId,Avg\nA1,\"\"\nA2,\n",
        );

        CsvIngestor::new().ingest_file(&mut db, "SRA", &file)?;
        let mut stmt = db
            .connection()
            .prepare("SELECT \"Avg\" FROM sra_sra_1999_m3 ORDER BY \"AreaId\"")?;
        let values = stmt
            .query_map([], |r| r.get::<_, Option<String>>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        assert_eq!(values, vec![None, None]);

        Ok(())
    }

    #[test]
    fn test_header_names_differing_only_in_case_collide() -> Result<()> {
        let dir = TempDir::new()?;
        let mut db = Database::open_in_memory()?;
        let file = source_file(
            dir.path(),
            "RH",
            "rh_2001_m1.csv",
            b"AreaId,Avg,avg\nA1,1,2\n",
        );

        let err = CsvIngestor::new()
            .ingest_file(&mut db, "RH", &file)
            .unwrap_err();
        assert!(matches!(err, ProcessingError::Database(_)));
        assert!(!db.table_snapshot()?.contains("rh_rh_2001_m1"));

        Ok(())
    }
}
