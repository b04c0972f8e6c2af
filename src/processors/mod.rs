pub mod csv_ingestor;
pub mod master_builder;

pub use csv_ingestor::CsvIngestor;
pub use master_builder::{load_master_records, MasterTableBuilder};
