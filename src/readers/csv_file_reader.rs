use crate::error::{ProcessingError, Result};
use csv::{ReaderBuilder, StringRecord};
use encoding_rs::mem::decode_latin1;
use std::path::{Path, PathBuf};

/// Reads climate CSV exports as Latin-1 text.
///
/// Latin-1 maps every byte to a character, so files with stray bytes from
/// other code pages still load; such bytes come through as their Latin-1
/// counterparts.
pub struct CsvFileReader {
    delimiter: u8,
}

/// A decoded CSV file together with its header fields
pub struct CsvContents {
    pub path: PathBuf,
    pub header: Vec<String>,
    text: String,
    delimiter: u8,
}

impl CsvFileReader {
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    /// Decode the whole file; column names come from its first line only.
    ///
    /// The header split is a plain delimiter split, not quote-aware, after
    /// trimming surrounding whitespace (including the line terminator).
    pub fn read(&self, path: &Path) -> Result<CsvContents> {
        let bytes = std::fs::read(path)?;
        let text = decode_latin1(&bytes).into_owned();

        let first_line = text.lines().next().unwrap_or("");
        let header = self.split_header(first_line, path)?;

        Ok(CsvContents {
            path: path.to_path_buf(),
            header,
            text,
            delimiter: self.delimiter,
        })
    }

    fn split_header(&self, line: &str, path: &Path) -> Result<Vec<String>> {
        let line = line.trim();
        if line.is_empty() {
            return Err(ProcessingError::InvalidFormat(format!(
                "Missing header line in {}",
                path.display()
            )));
        }

        let delimiter = char::from(self.delimiter);
        Ok(line.split(delimiter).map(str::to_string).collect())
    }
}

impl Default for CsvFileReader {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvContents {
    /// Data records after the header, each with its 1-based line number.
    ///
    /// Fields are returned exactly as parsed (quotes resolved, nothing trimmed).
    /// A record whose width differs from the header is an error.
    pub fn records(&self) -> impl Iterator<Item = Result<(u64, StringRecord)>> + '_ {
        let expected = self.header.len();
        ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(self.text.as_bytes())
            .into_records()
            .map(move |record| {
                let record = record?;
                let line = record.position().map(|p| p.line()).unwrap_or(0);
                if record.len() != expected {
                    return Err(ProcessingError::ColumnMismatch {
                        path: self.path.clone(),
                        line,
                        expected,
                        found: record.len(),
                    });
                }
                Ok((line, record))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_header_from_first_line() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        write!(temp_file, "AreaId,Avg\r\n600001,5.0\r\n")?;

        let reader = CsvFileReader::new();
        let contents = reader.read(temp_file.path())?;
        assert_eq!(contents.header, vec!["AreaId", "Avg"]);
        assert_eq!(contents.records().count(), 1);

        Ok(())
    }

    #[test]
    fn test_header_keeps_latin1_characters() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        // "Teplota °C" with the degree sign as a single Latin-1 byte
        temp_file.write_all(b"AreaId,Teplota \xb0C\n1,2\n")?;

        let reader = CsvFileReader::new();
        let contents = reader.read(temp_file.path())?;
        assert_eq!(contents.header, vec!["AreaId", "Teplota °C"]);

        Ok(())
    }

    #[test]
    fn test_records_skip_header_and_keep_raw_text() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(temp_file, "AreaId,Avg")?;
        writeln!(temp_file, "A1, 5.0")?;
        writeln!(temp_file, "\"A,2\",")?;

        let contents = CsvFileReader::new().read(temp_file.path())?;
        let records: Vec<_> = contents.records().collect::<Result<_>>()?;

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].0, 2);
        assert_eq!(&records[0].1[1], " 5.0");
        assert_eq!(&records[1].1[0], "A,2");
        assert_eq!(&records[1].1[1], "");

        Ok(())
    }

    #[test]
    fn test_ragged_record_is_an_error() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(temp_file, "AreaId,Avg")?;
        writeln!(temp_file, "A1,5.0,extra")?;

        let contents = CsvFileReader::new().read(temp_file.path())?;
        let err = contents.records().next().unwrap().unwrap_err();
        assert!(matches!(
            err,
            ProcessingError::ColumnMismatch {
                line: 2,
                expected: 2,
                found: 3,
                ..
            }
        ));

        Ok(())
    }

    #[test]
    fn test_empty_file_has_no_header() -> Result<()> {
        let temp_file = NamedTempFile::new()?;
        let reader = CsvFileReader::new();
        assert!(reader.read(temp_file.path()).is_err());
        Ok(())
    }
}
