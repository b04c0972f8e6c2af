pub mod constants;
pub mod naming;
pub mod progress;

pub use constants::*;
pub use naming::{ingested_table_name, master_table_name, normalize_table_name};
pub use progress::ProgressReporter;
