use crate::db::{quote_ident, quoted_column, quoted_table, Database, TableSnapshot};
use crate::error::Result;
use crate::models::{
    create_master_table_sql, monthly_temperature_columns, ClimateVariable, MasterRecord, Period,
    BuildReport, SourceSlot, YearReport,
};
use crate::settings::BuildSettings;
use crate::utils::constants::{
    DE_MARTONNE_COLUMN, FN_CALC_PET, FN_MARTONNE_INDEX, FN_PARSE_DOUBLE, MASTER_KEY_COLUMN,
    PET_COLUMN,
};
use crate::utils::naming::master_table_name;
use crate::utils::progress::ProgressReporter;
use rusqlite::{Connection, Row};
use tracing::{debug, info, warn};

/// Rebuilds the per-year `climate_<year>` tables from the ingested sources.
///
/// Which source tables exist is decided by a [`TableSnapshot`] taken before
/// the first year (or before every year with `refresh_tables_per_year`).
/// A missing source table leaves its column NULL; every other failure aborts.
pub struct MasterTableBuilder {
    settings: BuildSettings,
}

impl MasterTableBuilder {
    pub fn new(settings: BuildSettings) -> Self {
        Self { settings }
    }

    /// Build every year of the configured range in ascending order
    pub fn build_all(
        &self,
        db: &mut Database,
        progress: Option<&ProgressReporter>,
    ) -> Result<BuildReport> {
        let mut report = BuildReport::start(self.settings.refresh_tables_per_year);
        let mut snapshot = db.table_snapshot()?;
        report.snapshot_taken_at = Some(snapshot.taken_at());
        info!(
            tables = snapshot.len(),
            from_year = self.settings.from_year,
            to_year = self.settings.to_year,
            "table snapshot taken"
        );

        for year in self.settings.years() {
            if self.settings.refresh_tables_per_year && year != self.settings.from_year {
                snapshot = db.table_snapshot()?;
                debug!(year, tables = snapshot.len(), "table snapshot refreshed");
            }

            if let Some(progress) = progress {
                progress.set_message(&format!("Building {}", master_table_name(year)));
            }

            let year_report = self.build_year(db, year, &snapshot)?;

            if let Some(progress) = progress {
                progress.println(&format!(
                    "-> {}: {} rows, {} missing source tables",
                    year_report.table,
                    year_report.rows,
                    year_report.missing_tables.len()
                ));
                progress.increment(1);
            }
            report.years.push(year_report);
        }

        report.finish();
        Ok(report)
    }

    /// Drop, recreate, seed and fill one year's master table in a single transaction
    pub fn build_year(
        &self,
        db: &mut Database,
        year: i32,
        snapshot: &TableSnapshot,
    ) -> Result<YearReport> {
        let table = master_table_name(year);
        let master = quoted_table(&table)?;
        info!(year, table = %table, "building master table");

        let tx = db.transaction()?;

        tx.execute(&format!("DROP TABLE IF EXISTS {}", master), [])?;
        tx.execute(&create_master_table_sql(&table), [])?;

        let seeded = tx.execute(&self.seed_sql(&master)?, [])?;
        debug!(year, rows = seeded, "area codes seeded");

        let mut filled_columns = Vec::new();
        let mut missing_tables = Vec::new();
        for slot in SourceSlot::all() {
            let source = slot.source_table(year);
            let column = slot.column_name();
            if snapshot.contains(&source) {
                let updated = self.fill_column(&tx, &master, &source, &column)?;
                debug!(year, source = %source, column = %column, updated, "column filled");
                filled_columns.push(column);
            } else {
                warn!(
                    year,
                    variable = %slot.variable,
                    source = %source,
                    column = %column,
                    "source table missing, column left NULL"
                );
                missing_tables.push(source);
            }
        }

        self.compute_indices(&tx, &master)?;

        let rows: i64 = tx.query_row(&format!("SELECT COUNT(*) FROM {}", master), [], |r| {
            r.get(0)
        })?;
        tx.commit()?;

        info!(year, table = %table, rows, missing = missing_tables.len(), "master table committed");

        Ok(YearReport {
            year,
            table,
            rows: rows as u64,
            filled_columns,
            missing_tables,
        })
    }

    /// One row per distinct registry code
    fn seed_sql(&self, master: &str) -> Result<String> {
        Ok(format!(
            "INSERT INTO {} ({}) SELECT DISTINCT {} FROM {}",
            master,
            quote_ident(MASTER_KEY_COLUMN),
            quoted_column(&self.settings.registry_column)?,
            quoted_table(&self.settings.registry_table)?
        ))
    }

    /// Copy the source's value column into `column` for every matching area code.
    ///
    /// Master rows without a matching source row keep NULL; source rows whose
    /// code is not in the master table are ignored.
    fn fill_column(
        &self,
        conn: &Connection,
        master: &str,
        source_table: &str,
        column: &str,
    ) -> Result<usize> {
        let sql = format!(
            "UPDATE {master} AS c SET {column} = {cast}(t.{value}) FROM {source} AS t WHERE c.{key} = t.{source_key}",
            master = master,
            column = quote_ident(column),
            cast = FN_PARSE_DOUBLE,
            value = quoted_column(&self.settings.value_column)?,
            source = quoted_table(source_table)?,
            key = quote_ident(MASTER_KEY_COLUMN),
            source_key = quoted_column(&self.settings.key_column)?,
        );
        Ok(conn.execute(&sql, [])?)
    }

    fn compute_indices(&self, conn: &Connection, master: &str) -> Result<()> {
        let precipitation = SourceSlot::new(ClimateVariable::Precipitation, Period::Annual);
        let temperature = SourceSlot::new(ClimateVariable::Temperature, Period::Annual);

        conn.execute(
            &format!(
                "UPDATE {} SET {} = {}({}, {})",
                master,
                quote_ident(DE_MARTONNE_COLUMN),
                FN_MARTONNE_INDEX,
                quote_ident(&precipitation.column_name()),
                quote_ident(&temperature.column_name())
            ),
            [],
        )?;

        let months: Vec<String> = monthly_temperature_columns()
            .iter()
            .map(|c| quote_ident(c))
            .collect();
        conn.execute(
            &format!(
                "UPDATE {} SET {} = {}({})",
                master,
                quote_ident(PET_COLUMN),
                FN_CALC_PET,
                months.join(", ")
            ),
            [],
        )?;

        Ok(())
    }
}

/// Read a master table back, ordered by area code
pub fn load_master_records(db: &Database, year: i32) -> Result<Vec<MasterRecord>> {
    let master = quoted_table(&master_table_name(year))?;
    let mut stmt = db
        .connection()
        .prepare(&format!("SELECT * FROM {} ORDER BY {}", master, quote_ident(MASTER_KEY_COLUMN)))?;
    let records = stmt
        .query_map([], master_record_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(records)
}

// Column order follows `create_master_table_sql`: key, 12 + 1 tavg, 12 + 1 sra, indices.
fn master_record_from_row(row: &Row<'_>) -> rusqlite::Result<MasterRecord> {
    let mut record = MasterRecord::empty(&row.get::<_, String>(0)?);
    for m in 0..12 {
        record.tavg_months[m] = row.get(1 + m)?;
        record.sra_months[m] = row.get(14 + m)?;
    }
    record.tavg_avg = row.get(13)?;
    record.sra_avg = row.get(26)?;
    record.de_martonne = row.get(27)?;
    record.pet = row.get(28)?;
    Ok(record)
}
