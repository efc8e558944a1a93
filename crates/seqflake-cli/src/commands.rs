use std::io::Write;

use seqflake::{DecodedUid, SnowflakeUid, SnowflakeUidGenerator};
use serde::Serialize;

use crate::config::{DecodeConfig, GenerateConfig, OutputConfig};

/// One line of `--json` output.
#[derive(Debug, Serialize)]
struct IdRecord {
    id: SnowflakeUid,
    #[serde(flatten)]
    decoded: DecodedUid,
}

fn write_id(
    out: &mut impl Write,
    output: OutputConfig,
    id: SnowflakeUid,
    decoded: DecodedUid,
) -> anyhow::Result<()> {
    if output.json {
        serde_json::to_writer(&mut *out, &IdRecord { id, decoded })?;
        writeln!(out)?;
    } else {
        writeln!(out, "{id}")?;
    }
    Ok(())
}

/// Mints `config.count` IDs from a fresh generator and writes them to `out`.
pub fn generate(config: &GenerateConfig, out: &mut impl Write) -> anyhow::Result<()> {
    let generator = SnowflakeUidGenerator::with_parts(
        config.worker_id,
        config.output.epoch,
        seqflake::SystemClock,
        seqflake::ProcessThreads,
    )?;
    generator.set_max_time_exceed(config.max_time_exceed);

    tracing::debug!(?generator, count = config.count, "generating");

    for _ in 0..config.count {
        let id = generator.next_id()?;
        write_id(&mut *out, config.output, id, generator.decode(id))?;
    }
    Ok(())
}

/// Writes the breakdown of every ID in `config.ids` to `out`.
pub fn decode(config: &DecodeConfig, out: &mut impl Write) -> anyhow::Result<()> {
    for &id in &config.ids {
        let decoded = id.decode(config.output.epoch);
        if config.output.json {
            write_id(&mut *out, config.output, id, decoded)?;
        } else {
            writeln!(out, "{id}\t{decoded}")?;
        }
    }
    Ok(())
}
