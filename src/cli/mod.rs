pub mod args;
pub mod commands;
pub mod logging;

pub use args::{BuildArgs, Cli, Commands, IngestArgs};
pub use commands::run;
