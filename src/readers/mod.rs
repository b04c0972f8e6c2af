pub mod csv_file_reader;
pub mod source_folder;

pub use csv_file_reader::{CsvContents, CsvFileReader};
pub use source_folder::{SourceFile, SourceFolder};
