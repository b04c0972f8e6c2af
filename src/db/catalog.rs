use crate::db::identifier::{quote_ident, validate_table_name};
use crate::error::{ProcessingError, Result};
use chrono::{DateTime, Local};
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use serde::Serialize;
use std::collections::BTreeSet;

/// Point-in-time set of table names present in the database.
///
/// Tables created after the snapshot was taken are not visible through it.
#[derive(Debug, Clone)]
pub struct TableSnapshot {
    tables: BTreeSet<String>,
    taken_at: DateTime<Local>,
}

impl TableSnapshot {
    pub fn take(conn: &Connection) -> Result<Self> {
        let mut stmt =
            conn.prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")?;
        let tables = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<BTreeSet<_>>>()?;

        Ok(Self {
            tables,
            taken_at: Local::now(),
        })
    }

    pub fn contains(&self, table: &str) -> bool {
        self.tables.contains(table)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn taken_at(&self) -> DateTime<Local> {
        self.taken_at
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub declared_type: String,
    pub non_null: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableDescription {
    pub table: String,
    pub row_count: u64,
    pub columns: Vec<ColumnInfo>,
    pub sample_rows: Vec<Vec<Option<String>>>,
}

impl TableDescription {
    pub fn summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str(&format!("=== Table {} ===\n", self.table));
        summary.push_str(&format!("Rows: {}\n", self.row_count));
        summary.push_str("Columns:\n");
        for column in &self.columns {
            summary.push_str(&format!(
                "  {:<24} {:<18} {} non-null\n",
                column.name, column.declared_type, column.non_null
            ));
        }

        if !self.sample_rows.is_empty() {
            summary.push_str(&format!("\nSample ({} rows):\n", self.sample_rows.len()));
            for (i, row) in self.sample_rows.iter().enumerate() {
                let cells: Vec<&str> = row
                    .iter()
                    .map(|cell| cell.as_deref().unwrap_or("NULL"))
                    .collect();
                summary.push_str(&format!("  {}. {}\n", i + 1, cells.join(" | ")));
            }
        }

        summary
    }
}

/// Column layout, row count, per-column non-null counts and a few sample rows.
pub fn describe_table(conn: &Connection, table: &str, sample: usize) -> Result<TableDescription> {
    let table = validate_table_name(table)?;
    let quoted = quote_ident(table);

    let mut columns = Vec::new();
    {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quoted))?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            columns.push(ColumnInfo {
                name: row.get(1)?,
                declared_type: row.get(2)?,
                non_null: 0,
            });
        }
    }

    if columns.is_empty() {
        return Err(ProcessingError::TableNotFound(table.to_string()));
    }

    let row_count: i64 =
        conn.query_row(&format!("SELECT COUNT(*) FROM {}", quoted), [], |r| r.get(0))?;

    for column in columns.iter_mut() {
        let sql = format!(
            "SELECT COUNT({}) FROM {}",
            quote_ident(&column.name),
            quoted
        );
        let count: i64 = conn.query_row(&sql, [], |r| r.get(0))?;
        column.non_null = count as u64;
    }

    let mut sample_rows = Vec::new();
    if sample > 0 {
        let mut stmt = conn.prepare(&format!("SELECT * FROM {} LIMIT ?1", quoted))?;
        let mut rows = stmt.query([sample as i64])?;
        while let Some(row) = rows.next()? {
            let mut cells = Vec::with_capacity(columns.len());
            for idx in 0..columns.len() {
                cells.push(render_value(row.get_ref(idx)?));
            }
            sample_rows.push(cells);
        }
    }

    Ok(TableDescription {
        table: table.to_string(),
        row_count: row_count as u64,
        columns,
        sample_rows,
    })
}

fn render_value(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(t) => Some(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Some(format!("<{} bytes>", b.len())),
    }
}
