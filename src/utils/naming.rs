use crate::error::{ProcessingError, Result};
use crate::utils::constants::MASTER_TABLE_PREFIX;
use std::path::Path;

/// Normalize free text into a table-name fragment: lowercase ASCII letters,
/// digits and `_`; anything else (including `-` and `.`) becomes `_`.
pub fn normalize_table_name(text: &str) -> String {
    text.chars()
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// File name up to its first `.` (e.g. `TAVG_1995_A-S.v2.csv` -> `TAVG_1995_A-S`)
pub fn file_stem_before_first_dot(file_name: &str) -> &str {
    file_name.split('.').next().unwrap_or(file_name)
}

/// Table name for an ingested CSV: `{folder}_{stem}`, normalized.
///
/// Pure function of its inputs, so re-ingesting identical folders yields
/// identical table names. Collisions are not detected: two files mapping to
/// the same name overwrite each other in processing order.
pub fn ingested_table_name(folder_label: &str, csv_path: &Path) -> Result<String> {
    let file_name = csv_path
        .file_name()
        .map(|f| f.to_string_lossy())
        .ok_or_else(|| {
            ProcessingError::InvalidFormat(format!(
                "Path has no file name: {}",
                csv_path.display()
            ))
        })?;

    let stem = file_stem_before_first_dot(&file_name);
    if stem.is_empty() {
        return Err(ProcessingError::InvalidFormat(format!(
            "Cannot derive a table name from {}",
            csv_path.display()
        )));
    }

    Ok(normalize_table_name(&format!("{}_{}", folder_label, stem)))
}

/// Master table name for a year, e.g. `climate_1995`
pub fn master_table_name(year: i32) -> String {
    format!("{}{}", MASTER_TABLE_PREFIX, year)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_normalize_table_name() {
        assert_eq!(normalize_table_name("TAVG_1995_A-S"), "tavg_1995_a_s");
        assert_eq!(normalize_table_name("sra.2001-m3"), "sra_2001_m3");
        assert_eq!(normalize_table_name("Srážky 2020"), "sr__ky_2020");
    }

    #[test]
    fn test_ingested_table_name() {
        let path = PathBuf::from("/data/TAVG/tavg_1995_m1.csv");
        assert_eq!(
            ingested_table_name("TAVG", &path).unwrap(),
            "tavg_tavg_1995_m1"
        );

        let annual = PathBuf::from("/data/SRA/SRA_2010_A-S.csv");
        assert_eq!(
            ingested_table_name("SRA", &annual).unwrap(),
            "sra_sra_2010_a_s"
        );
    }

    #[test]
    fn test_ingested_table_name_stops_at_first_dot() {
        let path = PathBuf::from("RH_2000_M7.backup.csv");
        assert_eq!(ingested_table_name("RH", &path).unwrap(), "rh_rh_2000_m7");
    }

    #[test]
    fn test_ingested_table_name_is_deterministic() {
        let path = PathBuf::from("WV/wv_2030_m12.csv");
        let first = ingested_table_name("WV", &path).unwrap();
        let second = ingested_table_name("WV", &path).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_hidden_file_without_stem_is_rejected() {
        let path = PathBuf::from("TAVG/.csv");
        assert!(ingested_table_name("TAVG", &path).is_err());
    }

    #[test]
    fn test_master_table_name() {
        assert_eq!(master_table_name(1995), "climate_1995");
        assert_eq!(master_table_name(2055), "climate_2055");
    }
}
