use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "klima-loader")]
#[command(about = "Load climate CSV grids into SQLite and build per-year master tables")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Config file (TOML, YAML or JSON) [default: klima.toml if present]")]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "SQLite database file, overrides the config")]
    pub database: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Suppress progress output")]
    pub quiet: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import every CSV of the source folders into its own TEXT table
    Ingest {
        #[command(flatten)]
        ingest: IngestArgs,

        #[arg(long, help = "Print the report as JSON")]
        json: bool,
    },

    /// Rebuild the climate_<year> master tables
    Build {
        #[command(flatten)]
        build: BuildArgs,

        #[arg(long, help = "Print the report as JSON")]
        json: bool,
    },

    /// Ingest, then build
    Run {
        #[command(flatten)]
        ingest: IngestArgs,

        #[command(flatten)]
        build: BuildArgs,

        #[arg(long, help = "Print the reports as JSON")]
        json: bool,
    },

    /// Show columns, row counts and sample rows of a table
    Describe {
        #[arg(help = "Table name, e.g. climate_1995")]
        table: String,

        #[arg(short, long, default_value = "5")]
        sample: usize,

        #[arg(long, help = "Print the description as JSON")]
        json: bool,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct IngestArgs {
    #[arg(short, long, help = "Directory containing the source folders")]
    pub base_path: Option<PathBuf>,

    #[arg(
        short,
        long = "folder",
        help = "Source folder label, repeatable [default: RH, SRA, TAVG, WV]"
    )]
    pub folders: Vec<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct BuildArgs {
    #[arg(long, help = "First year to build [default: 1995]")]
    pub from_year: Option<i32>,

    #[arg(long, help = "Last year to build, inclusive [default: 2055]")]
    pub to_year: Option<i32>,

    #[arg(long, help = "Re-read the table list before each year")]
    pub refresh_tables_per_year: bool,
}
