use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::PathBuf;

/// One CSV file loaded into its table
#[derive(Debug, Clone, Serialize)]
pub struct IngestedTable {
    pub folder: String,
    pub source: PathBuf,
    pub table: String,
    pub columns: usize,
    pub rows: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub started_at: DateTime<Local>,
    pub finished_at: Option<DateTime<Local>>,
    pub tables: Vec<IngestedTable>,
}

impl IngestReport {
    pub fn start() -> Self {
        Self {
            started_at: Local::now(),
            finished_at: None,
            tables: Vec::new(),
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Local::now());
    }

    pub fn total_rows(&self) -> u64 {
        self.tables.iter().map(|t| t.rows).sum()
    }

    pub fn summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("=== Ingestion Report ===\n");
        summary.push_str(&format!("Tables created: {}\n", self.tables.len()));
        summary.push_str(&format!("Rows loaded: {}\n", self.total_rows()));

        let mut folders: Vec<&str> = self.tables.iter().map(|t| t.folder.as_str()).collect();
        folders.dedup();
        for folder in folders {
            let (count, rows) = self
                .tables
                .iter()
                .filter(|t| t.folder == folder)
                .fold((0usize, 0u64), |(c, r), t| (c + 1, r + t.rows));
            summary.push_str(&format!("  {}: {} files, {} rows\n", folder, count, rows));
        }

        if let Some(finished_at) = self.finished_at {
            let elapsed = finished_at - self.started_at;
            summary.push_str(&format!(
                "Elapsed: {:.1}s\n",
                elapsed.num_milliseconds() as f64 / 1000.0
            ));
        }

        summary
    }
}

/// Outcome of building one year's master table
#[derive(Debug, Clone, Serialize)]
pub struct YearReport {
    pub year: i32,
    pub table: String,
    pub rows: u64,
    pub filled_columns: Vec<String>,
    pub missing_tables: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub started_at: DateTime<Local>,
    pub finished_at: Option<DateTime<Local>>,
    pub snapshot_per_year: bool,
    pub snapshot_taken_at: Option<DateTime<Local>>,
    pub years: Vec<YearReport>,
}

impl BuildReport {
    pub fn start(snapshot_per_year: bool) -> Self {
        Self {
            started_at: Local::now(),
            finished_at: None,
            snapshot_per_year,
            snapshot_taken_at: None,
            years: Vec::new(),
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Local::now());
    }

    pub fn missing_table_count(&self) -> usize {
        self.years.iter().map(|y| y.missing_tables.len()).sum()
    }

    pub fn summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("=== Master Table Report ===\n");
        summary.push_str(&format!("Years built: {}\n", self.years.len()));
        summary.push_str(&format!(
            "Table snapshot: {}\n",
            if self.snapshot_per_year {
                "per year".to_string()
            } else {
                match self.snapshot_taken_at {
                    Some(at) => format!("once per run, taken {}", at.format("%Y-%m-%d %H:%M:%S")),
                    None => "once per run".to_string(),
                }
            }
        ));
        summary.push_str(&format!(
            "Missing source tables: {}\n",
            self.missing_table_count()
        ));

        for year in &self.years {
            summary.push_str(&format!(
                "  {}: {} rows, {}/{} columns filled",
                year.table,
                year.rows,
                year.filled_columns.len(),
                year.filled_columns.len() + year.missing_tables.len()
            ));
            if !year.missing_tables.is_empty() {
                summary.push_str(&format!(" ({} missing)", year.missing_tables.len()));
            }
            summary.push('\n');
        }

        summary
    }
}
