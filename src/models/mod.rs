pub mod master;
pub mod report;

pub use master::{
    create_master_table_sql, master_value_columns, monthly_temperature_columns, ClimateVariable,
    MasterRecord, Period, SourceSlot,
};
pub use report::{BuildReport, IngestReport, IngestedTable, YearReport};
