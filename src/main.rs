#![allow(dead_code)]
#![recursion_limit = "256"]

mod cli;
mod application;
mod domain;
mod features;
mod data;
mod ml;
mod infra;
mod control;

use anyhow::Result;
use cli::Cli;
use clap::Parser;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("emg_wrist=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    cli.run()
}
