use std::path::PathBuf;

use chrono::FixedOffset;
use clap::{Args, Parser, Subcommand};

use crate::{data::FieldKind, time_format::TimeFormat};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Copy record fields by name or alias, coercing types on the way",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the registered time formats, or check a single pattern
    Formats(FormatsArgs),
    /// Convert one value between field kinds
    Convert(ConvertArgs),
    /// Copy a JSON record into another record shape described by schemas
    Copy(CopyArgs),
}

#[derive(Debug, Args)]
pub struct FormatsArgs {
    /// Pattern to look up instead of listing every format
    #[arg(long)]
    pub check: Option<String>,
}

#[derive(Debug, Clone, Copy, Args)]
pub struct TimeArgs {
    /// Default time format, by name (e.g. rfc3339) or by pattern
    #[arg(long = "time-format", value_parser = parse_time_format)]
    pub time_format: Option<TimeFormat>,
    /// Reference zone for timestamps without an offset (Z, UTC, +09:00, -0530)
    #[arg(long, value_parser = parse_zone_arg)]
    pub zone: Option<FixedOffset>,
}

#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Input value (timestamps as RFC 3339, other as JSON)
    #[arg(long, allow_hyphen_values = true)]
    pub value: String,
    /// Kind of the input value
    #[arg(long, value_parser = parse_kind)]
    pub from: FieldKind,
    /// Kind to convert into
    #[arg(long, value_parser = parse_kind)]
    pub to: FieldKind,
    #[command(flatten)]
    pub time: TimeArgs,
}

#[derive(Debug, Args)]
pub struct CopyArgs {
    /// YAML schema describing the input record
    #[arg(long = "source-schema")]
    pub source_schema: PathBuf,
    /// YAML schema describing the output record
    #[arg(long = "dest-schema")]
    pub dest_schema: PathBuf,
    /// JSON file holding the input record object
    #[arg(short, long)]
    pub input: PathBuf,
    /// Output JSON file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    #[command(flatten)]
    pub time: TimeArgs,
}

fn parse_time_format(value: &str) -> Result<TimeFormat, String> {
    if let Some(format) = TimeFormat::from_name(value) {
        return Ok(format);
    }
    TimeFormat::from_pattern(value).map_err(|err| {
        let names = TimeFormat::all()
            .iter()
            .map(|format| format.name())
            .collect::<Vec<_>>()
            .join(", ");
        format!("{err}. Known names: {names}")
    })
}

fn parse_zone_arg(value: &str) -> Result<FixedOffset, String> {
    crate::time_format::parse_zone(value).map_err(|err| err.to_string())
}

fn parse_kind(value: &str) -> Result<FieldKind, String> {
    value.parse().map_err(|err: anyhow::Error| err.to_string())
}
