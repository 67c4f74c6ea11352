pub mod cli;
pub mod coerce;
pub mod copy;
pub mod copy_cmd;
pub mod data;
pub mod error;
pub mod formats;
pub mod record;
pub mod schema;
pub mod table;
pub mod time_format;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result, anyhow};
use chrono::DateTime;
use clap::Parser;
use log::{LevelFilter, debug};

pub use copy::{CopyOptions, CopyReport, copy_from, copy_from_with};
pub use data::{FieldKind, Value};
pub use error::CopyError;
pub use record::{FieldDescriptor, FieldValue, Record};
pub use time_format::TimeFormat;

use crate::cli::{Cli, Commands, ConvertArgs, TimeArgs};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("kopcup", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Formats(args) => formats::execute(&args),
        Commands::Convert(args) => handle_convert(&args),
        Commands::Copy(args) => copy_cmd::execute(&args),
    }
}

pub(crate) fn copy_options(args: &TimeArgs) -> CopyOptions {
    let mut options = CopyOptions::default();
    if let Some(format) = args.time_format {
        options = options.with_time_format(format);
    }
    if let Some(zone) = args.zone {
        options = options.with_zone(zone);
    }
    options
}

fn handle_convert(args: &ConvertArgs) -> Result<()> {
    let options = copy_options(&args.time);
    debug!(
        "Converting {} -> {} with format '{}' in zone {}",
        args.from, args.to, options.time_format, options.zone
    );
    let value = parse_input_value(&args.value, args.from)
        .with_context(|| format!("Reading '{}' as {}", args.value, args.from))?;
    let converted = coerce::coerce(value, args.to, Some(options.time_format), options.zone)
        .with_context(|| format!("Converting '{}' from {} to {}", args.value, args.from, args.to))?;
    let rendered = match &converted {
        Value::Timestamp(ts) => options.time_format.render(ts),
        other => other.as_display(),
    };
    println!("{rendered}");
    Ok(())
}

fn parse_input_value(raw: &str, kind: FieldKind) -> Result<Value> {
    let value = match kind {
        FieldKind::Text => Value::Text(raw.to_string()),
        FieldKind::Integer => Value::Integer(raw.trim().parse()?),
        FieldKind::Float => Value::Float(raw.trim().parse()?),
        FieldKind::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
            "true" => Value::Boolean(true),
            "false" => Value::Boolean(false),
            _ => return Err(anyhow!("Expected 'true' or 'false'")),
        },
        FieldKind::Timestamp => Value::Timestamp(DateTime::parse_from_rfc3339(raw.trim())?),
        FieldKind::Other => Value::Other(serde_json::from_str(raw)?),
    };
    Ok(value)
}
