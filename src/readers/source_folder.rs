use crate::error::Result;
use crate::utils::constants::CSV_EXTENSION;
use crate::utils::naming::ingested_table_name;
use std::path::{Path, PathBuf};

/// One labelled source directory (e.g. `TAVG`) under the ingest base path
#[derive(Debug, Clone)]
pub struct SourceFolder {
    pub label: String,
    pub path: PathBuf,
}

/// A CSV file found in a source folder, with the table it loads into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub table_name: String,
}

impl SourceFolder {
    pub fn new(base_path: &Path, label: &str) -> Self {
        Self {
            label: label.to_string(),
            path: base_path.join(label),
        }
    }

    /// Regular `*.csv` files directly inside the folder, sorted by file name.
    ///
    /// Subdirectories are not descended into. A missing folder is an error.
    pub fn csv_files(&self) -> Result<Vec<SourceFile>> {
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(&self.path)? {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type()?.is_file() && is_csv(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        paths
            .into_iter()
            .map(|path| {
                let table_name = ingested_table_name(&self.label, &path)?;
                Ok(SourceFile { path, table_name })
            })
            .collect()
    }
}

fn is_csv(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(CSV_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_csv_files_are_sorted_and_filtered() -> Result<()> {
        let base = TempDir::new()?;
        let folder_path = base.path().join("TAVG");
        fs::create_dir_all(folder_path.join("nested"))?;
        fs::write(folder_path.join("tavg_1995_m2.csv"), "AreaId,Avg\n")?;
        fs::write(folder_path.join("tavg_1995_m1.csv"), "AreaId,Avg\n")?;
        fs::write(folder_path.join("readme.txt"), "not data")?;
        fs::write(folder_path.join("nested").join("tavg_1995_m3.csv"), "AreaId,Avg\n")?;

        let folder = SourceFolder::new(base.path(), "TAVG");
        let files = folder.csv_files()?;

        let tables: Vec<&str> = files.iter().map(|f| f.table_name.as_str()).collect();
        assert_eq!(tables, vec!["tavg_tavg_1995_m1", "tavg_tavg_1995_m2"]);

        Ok(())
    }

    #[test]
    fn test_missing_folder_is_an_error() {
        let base = TempDir::new().unwrap();
        let folder = SourceFolder::new(base.path(), "WV");
        assert!(folder.csv_files().is_err());
    }
}
