use std::time::Duration;

use anyhow::bail;
use clap::{Args, Parser, Subcommand};
use seqflake::{MaxTimeExceed, SnowflakeUid, local_epoch};

/// Upper bound on `--count`, so a typo can't pin a core for minutes.
pub const MAX_COUNT: usize = 10_000_000;

/// Command-line arguments for the `seqflake` binary.
///
/// Every tunable can also be supplied through the environment (or a `.env`
/// file in the working directory).
#[derive(Parser, Debug, Clone)]
#[command(
    name = "seqflake",
    version,
    about = "Mint and decode time-ordered 64-bit seqflake IDs"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Generate IDs from a fresh generator.
    Generate(GenerateArgs),
    /// Break IDs down into timestamp, worker and sequence.
    Decode(DecodeArgs),
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Worker ID encoded into every ID (0-1023).
    ///
    /// Environment variable: `SEQFLAKE_WORKER_ID`
    #[arg(short, long, env = "SEQFLAKE_WORKER_ID", allow_negative_numbers = true)]
    pub worker_id: i64,

    /// Number of IDs to print.
    #[arg(short = 'n', long, default_value_t = 1)]
    pub count: usize,

    /// Fixed clock-regression tolerance in milliseconds. When unset, the
    /// tolerance follows the process thread count.
    ///
    /// Environment variable: `SEQFLAKE_MAX_TIME_EXCEED_MILLIS`
    #[arg(long, env = "SEQFLAKE_MAX_TIME_EXCEED_MILLIS")]
    pub max_time_exceed_millis: Option<u64>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug, Clone)]
pub struct DecodeArgs {
    /// IDs to decode, in decimal.
    #[arg(required = true)]
    pub ids: Vec<SnowflakeUid>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Epoch in milliseconds since 1970-01-01 UTC. Defaults to 2017-01-01
    /// 00:00:00 in the local calendar.
    ///
    /// Environment variable: `SEQFLAKE_EPOCH_MILLIS`
    #[arg(long, env = "SEQFLAKE_EPOCH_MILLIS")]
    pub epoch_millis: Option<u64>,

    /// Print one JSON object per line instead of plain text.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    pub epoch: Duration,
    pub json: bool,
}

impl From<OutputArgs> for OutputConfig {
    fn from(args: OutputArgs) -> Self {
        Self {
            epoch: args
                .epoch_millis
                .map_or_else(local_epoch, Duration::from_millis),
            json: args.json,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateConfig {
    pub worker_id: i64,
    pub count: usize,
    pub max_time_exceed: MaxTimeExceed,
    pub output: OutputConfig,
}

impl TryFrom<GenerateArgs> for GenerateConfig {
    type Error = anyhow::Error;

    fn try_from(args: GenerateArgs) -> Result<Self, Self::Error> {
        if args.count == 0 {
            bail!("--count must be greater than 0");
        }

        if args.count > MAX_COUNT {
            bail!("--count ({}) exceeds the maximum of {}", args.count, MAX_COUNT);
        }

        let max_time_exceed = args
            .max_time_exceed_millis
            .map_or(MaxTimeExceed::Auto, MaxTimeExceed::Fixed);

        Ok(Self {
            worker_id: args.worker_id,
            count: args.count,
            max_time_exceed,
            output: args.output.into(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeConfig {
    pub ids: Vec<SnowflakeUid>,
    pub output: OutputConfig,
}

impl From<DecodeArgs> for DecodeConfig {
    fn from(args: DecodeArgs) -> Self {
        Self {
            ids: args.ids,
            output: args.output.into(),
        }
    }
}
