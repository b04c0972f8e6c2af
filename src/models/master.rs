use crate::db::identifier::quote_ident;
use crate::utils::constants::{
    ANNUAL_TABLE_SUFFIX, DE_MARTONNE_COLUMN, MASTER_KEY_COLUMN, PET_COLUMN,
};
use serde::{Deserialize, Serialize};

/// Climate variables aggregated into the master tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClimateVariable {
    Temperature,
    Precipitation,
}

impl ClimateVariable {
    pub const ALL: [ClimateVariable; 2] =
        [ClimateVariable::Temperature, ClimateVariable::Precipitation];

    /// Prefix shared by the master columns and the ingested source tables
    pub fn prefix(&self) -> &'static str {
        match self {
            ClimateVariable::Temperature => "tavg",
            ClimateVariable::Precipitation => "sra",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ClimateVariable::Temperature => "Temperature (Avg)",
            ClimateVariable::Precipitation => "Precipitation",
        }
    }
}

impl std::fmt::Display for ClimateVariable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    /// Calendar month, 1..=12
    Month(u8),
    Annual,
}

impl Period {
    /// Months 1..=12 followed by the annual value
    pub fn all() -> impl Iterator<Item = Period> {
        (1..=12).map(Period::Month).chain(std::iter::once(Period::Annual))
    }

    fn column_suffix(&self) -> String {
        match self {
            Period::Month(m) => format!("m{}", m),
            Period::Annual => "avg".to_string(),
        }
    }

    fn table_suffix(&self) -> String {
        match self {
            Period::Month(m) => format!("m{}", m),
            Period::Annual => ANNUAL_TABLE_SUFFIX.to_string(),
        }
    }
}

/// One fillable master column and the per-year source table that feeds it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceSlot {
    pub variable: ClimateVariable,
    pub period: Period,
}

impl SourceSlot {
    pub fn new(variable: ClimateVariable, period: Period) -> Self {
        Self { variable, period }
    }

    /// All 26 slots: temperature months, annual temperature, then the same for precipitation
    pub fn all() -> Vec<SourceSlot> {
        ClimateVariable::ALL
            .iter()
            .flat_map(|&variable| Period::all().map(move |period| SourceSlot::new(variable, period)))
            .collect()
    }

    /// Master column, e.g. `tavg_m1` or `sra_avg`
    pub fn column_name(&self) -> String {
        format!("{}_{}", self.variable.prefix(), self.period.column_suffix())
    }

    /// Ingested table for `year`, e.g. `tavg_tavg_1995_m1` or `sra_sra_1995_a_s`
    pub fn source_table(&self, year: i32) -> String {
        let prefix = self.variable.prefix();
        format!("{}_{}_{}_{}", prefix, prefix, year, self.period.table_suffix())
    }
}

/// Value columns of a master table in declaration order (key column excluded)
pub fn master_value_columns() -> Vec<String> {
    let mut columns: Vec<String> = SourceSlot::all().iter().map(SourceSlot::column_name).collect();
    columns.push(DE_MARTONNE_COLUMN.to_string());
    columns.push(PET_COLUMN.to_string());
    columns
}

/// Monthly temperature columns in calendar order, the PET inputs
pub fn monthly_temperature_columns() -> Vec<String> {
    (1..=12)
        .map(|m| SourceSlot::new(ClimateVariable::Temperature, Period::Month(m)).column_name())
        .collect()
}

/// `CREATE TABLE` statement for a master table named `table` (already validated)
pub fn create_master_table_sql(table: &str) -> String {
    let mut definitions = vec![format!(
        "{} TEXT NOT NULL PRIMARY KEY",
        quote_ident(MASTER_KEY_COLUMN)
    )];
    definitions.extend(
        master_value_columns()
            .iter()
            .map(|column| format!("{} DOUBLE PRECISION", quote_ident(column))),
    );

    format!(
        "CREATE TABLE {} (\n    {}\n)",
        quote_ident(table),
        definitions.join(",\n    ")
    )
}

/// One row of a master table as read back from the database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterRecord {
    pub kod_ku: String,
    pub tavg_months: [Option<f64>; 12],
    pub tavg_avg: Option<f64>,
    pub sra_months: [Option<f64>; 12],
    pub sra_avg: Option<f64>,
    pub de_martonne: Option<f64>,
    pub pet: Option<f64>,
}

impl MasterRecord {
    pub fn empty(kod_ku: &str) -> Self {
        Self {
            kod_ku: kod_ku.to_string(),
            tavg_months: [None; 12],
            tavg_avg: None,
            sra_months: [None; 12],
            sra_avg: None,
            de_martonne: None,
            pet: None,
        }
    }

    /// Number of climate slots holding a value (indices not counted)
    pub fn filled_slots(&self) -> usize {
        self.tavg_months
            .iter()
            .chain(self.sra_months.iter())
            .chain([&self.tavg_avg, &self.sra_avg])
            .filter(|v| v.is_some())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_naming() {
        let slot = SourceSlot::new(ClimateVariable::Temperature, Period::Month(1));
        assert_eq!(slot.column_name(), "tavg_m1");
        assert_eq!(slot.source_table(1995), "tavg_tavg_1995_m1");

        let annual = SourceSlot::new(ClimateVariable::Precipitation, Period::Annual);
        assert_eq!(annual.column_name(), "sra_avg");
        assert_eq!(annual.source_table(2055), "sra_sra_2055_a_s");
    }

    #[test]
    fn test_all_slots_order() {
        let slots = SourceSlot::all();
        assert_eq!(slots.len(), 26);
        assert_eq!(slots[0].column_name(), "tavg_m1");
        assert_eq!(slots[11].column_name(), "tavg_m12");
        assert_eq!(slots[12].column_name(), "tavg_avg");
        assert_eq!(slots[13].column_name(), "sra_m1");
        assert_eq!(slots[25].column_name(), "sra_avg");
    }

    #[test]
    fn test_master_value_columns() {
        let columns = master_value_columns();
        assert_eq!(columns.len(), 28);
        assert_eq!(columns[26], "de_martonne");
        assert_eq!(columns[27], "pet");
    }

    #[test]
    fn test_create_master_table_sql() {
        let sql = create_master_table_sql("climate_1995");
        assert!(sql.starts_with("CREATE TABLE \"climate_1995\""));
        assert!(sql.contains("\"kod_ku\" TEXT NOT NULL PRIMARY KEY"));
        assert!(sql.contains("\"tavg_m12\" DOUBLE PRECISION"));
        assert!(sql.contains("\"pet\" DOUBLE PRECISION"));
    }

    #[test]
    fn test_filled_slots() {
        let mut record = MasterRecord::empty("600001");
        assert_eq!(record.filled_slots(), 0);
        record.tavg_months[0] = Some(5.0);
        record.sra_avg = Some(650.0);
        record.pet = Some(1.0);
        assert_eq!(record.filled_slots(), 2);
    }
}
