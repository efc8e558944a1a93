#![doc = include_str!("../README.md")]

mod commands;
mod config;
mod telemetry;

use std::io::{self, BufWriter, Write};

use clap::Parser;
use config::{CliArgs, Command, DecodeConfig, GenerateConfig};
use telemetry::init_logging;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    init_logging()?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match args.command {
        Command::Generate(args) => {
            let config = GenerateConfig::try_from(args)?;
            tracing::debug!(?config, "starting generate");
            commands::generate(&config, &mut out)?;
        }
        Command::Decode(args) => {
            let config = DecodeConfig::from(args);
            tracing::debug!(?config, "starting decode");
            commands::decode(&config, &mut out)?;
        }
    }

    out.flush()?;
    Ok(())
}
