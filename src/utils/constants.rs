/// Source folder labels scanned by the ingestor
pub const FOLDER_HUMIDITY: &str = "RH";
pub const FOLDER_PRECIPITATION: &str = "SRA";
pub const FOLDER_TEMPERATURE: &str = "TAVG";
pub const FOLDER_WIND: &str = "WV";

pub const DEFAULT_FOLDERS: [&str; 4] = [
    FOLDER_HUMIDITY,
    FOLDER_PRECIPITATION,
    FOLDER_TEMPERATURE,
    FOLDER_WIND,
];

pub const CSV_EXTENSION: &str = "csv";

/// Master table naming
pub const MASTER_TABLE_PREFIX: &str = "climate_";
pub const MASTER_KEY_COLUMN: &str = "kod_ku";
pub const DE_MARTONNE_COLUMN: &str = "de_martonne";
pub const PET_COLUMN: &str = "pet";

/// Suffix of the per-year source table holding annual values (from `A-S` file names)
pub const ANNUAL_TABLE_SUFFIX: &str = "a_s";

/// Area code registry
pub const DEFAULT_REGISTRY_TABLE: &str = "ku_cr";
pub const DEFAULT_REGISTRY_COLUMN: &str = "KOD_KU";

/// Columns read from every per-year source table
pub const DEFAULT_SOURCE_KEY_COLUMN: &str = "AreaId";
pub const DEFAULT_SOURCE_VALUE_COLUMN: &str = "Avg";

/// Year range defaults
pub const DEFAULT_FROM_YEAR: i32 = 1995;
pub const DEFAULT_TO_YEAR: i32 = 2055;

/// Scalar functions registered on every connection
pub const FN_PARSE_DOUBLE: &str = "parse_double";
pub const FN_MARTONNE_INDEX: &str = "martonne_index";
pub const FN_CALC_PET: &str = "calc_pet";

/// Offset added to the annual mean temperature in the De Martonne denominator
pub const DE_MARTONNE_OFFSET: f64 = 10.0;

/// Defaults for files and environment
pub const DEFAULT_DATABASE_PATH: &str = "klima.db";
pub const DEFAULT_CONFIG_FILE: &str = "klima.toml";
pub const ENV_PREFIX: &str = "KLIMA";
