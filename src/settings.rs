//! Layered run configuration.
//!
//! Sources, later ones winning: built-in defaults, an optional config file
//! (TOML, YAML or JSON), `KLIMA_*` environment variables (`__` separates
//! nested keys, e.g. `KLIMA_DATABASE__PATH`), then command-line overrides.

use crate::error::{ProcessingError, Result};
use crate::utils::constants::*;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Settings {
    #[validate(nested)]
    pub database: DatabaseSettings,

    #[validate(nested)]
    pub ingest: IngestSettings,

    #[validate(nested)]
    pub build: BuildSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct DatabaseSettings {
    pub path: PathBuf,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DATABASE_PATH),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct IngestSettings {
    /// Directory holding one subdirectory per folder label
    pub base_path: PathBuf,

    #[validate(length(min = 1), custom(function = "validate_folder_labels"))]
    pub folders: Vec<String>,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("."),
            folders: DEFAULT_FOLDERS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_year_range"))]
pub struct BuildSettings {
    #[validate(range(min = 1800, max = 2200))]
    pub from_year: i32,

    #[validate(range(min = 1800, max = 2200))]
    pub to_year: i32,

    /// Re-read the table list before every year instead of once per run
    pub refresh_tables_per_year: bool,

    #[validate(length(min = 1))]
    pub key_column: String,

    #[validate(length(min = 1))]
    pub value_column: String,

    #[validate(length(min = 1))]
    pub registry_table: String,

    #[validate(length(min = 1))]
    pub registry_column: String,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            from_year: DEFAULT_FROM_YEAR,
            to_year: DEFAULT_TO_YEAR,
            refresh_tables_per_year: false,
            key_column: DEFAULT_SOURCE_KEY_COLUMN.to_string(),
            value_column: DEFAULT_SOURCE_VALUE_COLUMN.to_string(),
            registry_table: DEFAULT_REGISTRY_TABLE.to_string(),
            registry_column: DEFAULT_REGISTRY_COLUMN.to_string(),
        }
    }
}

impl BuildSettings {
    pub fn years(&self) -> std::ops::RangeInclusive<i32> {
        self.from_year..=self.to_year
    }
}

fn validate_year_range(build: &BuildSettings) -> std::result::Result<(), ValidationError> {
    if build.from_year > build.to_year {
        let mut err = ValidationError::new("year_range");
        err.message = Some(
            format!(
                "from_year {} is after to_year {}",
                build.from_year, build.to_year
            )
            .into(),
        );
        return Err(err);
    }
    Ok(())
}

fn validate_folder_labels(folders: &[String]) -> std::result::Result<(), ValidationError> {
    if folders.iter().any(|f| f.trim().is_empty()) {
        return Err(ValidationError::new("empty_folder_label"));
    }
    Ok(())
}

impl Settings {
    /// Load defaults, then `config_file` (or `klima.toml` if it exists), then the environment.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let file_source = match config_file {
            Some(path) => File::from(path).required(true),
            None => File::from(Path::new(DEFAULT_CONFIG_FILE)).required(false),
        };

        let env_source = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("ingest.folders")
            .try_parsing(true);

        let settings: Settings = Config::builder()
            .add_source(file_source)
            .add_source(env_source)
            .build()?
            .try_deserialize()?;

        settings.check()?;
        Ok(settings)
    }

    /// Run validation, mapping failures into the crate error type
    pub fn check(&self) -> Result<()> {
        self.validate().map_err(ProcessingError::from)
    }

    pub fn ensure_base_path(&self) -> Result<()> {
        if !self.ingest.base_path.is_dir() {
            return Err(ProcessingError::Config(format!(
                "Ingest base path is not a directory: {}",
                self.ingest.base_path.display()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.check().is_ok());
        assert_eq!(settings.build.years(), 1995..=2055);
        assert_eq!(settings.ingest.folders, vec!["RH", "SRA", "TAVG", "WV"]);
        assert_eq!(settings.build.registry_table, "ku_cr");
    }

    #[test]
    fn test_inverted_year_range_is_rejected() {
        let mut settings = Settings::default();
        settings.build.from_year = 2020;
        settings.build.to_year = 2000;
        assert!(matches!(
            settings.check(),
            Err(ProcessingError::Validation(_))
        ));
    }

    #[test]
    fn test_out_of_range_year_is_rejected() {
        let mut settings = Settings::default();
        settings.build.to_year = 3000;
        assert!(settings.check().is_err());
    }

    #[test]
    fn test_empty_folder_list_is_rejected() {
        let mut settings = Settings::default();
        settings.ingest.folders.clear();
        assert!(settings.check().is_err());
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            r#"
[database]
path = "/tmp/klima-test.db"

[build]
from_year = 2000
to_year = 2002
refresh_tables_per_year = true
"#
        )
        .unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.database.path, PathBuf::from("/tmp/klima-test.db"));
        assert_eq!(settings.build.years(), 2000..=2002);
        assert!(settings.build.refresh_tables_per_year);
        assert_eq!(settings.build.key_column, "AreaId");
        assert_eq!(settings.ingest.folders.len(), 4);
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let result = Settings::load(Some(Path::new("/definitely/not/here.toml")));
        assert!(matches!(result, Err(ProcessingError::Settings(_))));
    }
}
