pub mod catalog;
pub mod functions;
pub mod identifier;

pub use catalog::{describe_table, ColumnInfo, TableDescription, TableSnapshot};
pub use identifier::{quote_ident, quoted_column, quoted_table, validate_table_name};

use crate::error::Result;
use crate::indices::{PetFormula, Thornthwaite};
use crate::settings::DatabaseSettings;
use rusqlite::{Connection, Transaction};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Connection handle shared by the ingestor and the master table builder.
///
/// Opened once per run; the connection is closed when the handle is dropped.
pub struct Database {
    conn: Connection,
    pet: Arc<dyn PetFormula>,
}

impl Database {
    /// Open the database described by `settings` with the default PET formula
    pub fn open(settings: &DatabaseSettings) -> Result<Self> {
        Self::open_with_pet(&settings.path, Arc::new(Thornthwaite))
    }

    pub fn open_with_pet(path: &Path, pet: Arc<dyn PetFormula>) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        debug!(path = %path.display(), pet = pet.name(), "opening database");
        let conn = Connection::open(path)?;
        Self::from_connection(conn, pet)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?, Arc::new(Thornthwaite))
    }

    pub fn from_connection(conn: Connection, pet: Arc<dyn PetFormula>) -> Result<Self> {
        functions::register_all(&conn, Arc::clone(&pet))?;
        Ok(Self { conn, pet })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn pet_formula(&self) -> &dyn PetFormula {
        self.pet.as_ref()
    }

    /// Start a unit of work; it is rolled back unless committed.
    pub fn transaction(&mut self) -> Result<Transaction<'_>> {
        Ok(self.conn.transaction()?)
    }

    pub fn table_snapshot(&self) -> Result<TableSnapshot> {
        TableSnapshot::take(&self.conn)
    }

    pub fn describe(&self, table: &str, sample: usize) -> Result<TableDescription> {
        describe_table(&self.conn, table, sample)
    }

    pub fn row_count(&self, table: &str) -> Result<u64> {
        let sql = format!("SELECT COUNT(*) FROM {}", quoted_table(table)?);
        let count: i64 = self.conn.query_row(&sql, [], |r| r.get(0))?;
        Ok(count as u64)
    }
}
