pub mod cli;
pub mod db;
pub mod error;
pub mod indices;
pub mod models;
pub mod processors;
pub mod readers;
pub mod settings;
pub mod utils;

pub use db::Database;
pub use error::{ProcessingError, Result};
pub use settings::Settings;
