use anyhow::Context;
use clap::Parser;
use klima_loader::cli::{run, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run(cli).context("klima-loader failed")
}
