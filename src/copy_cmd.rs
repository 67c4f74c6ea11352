//! `copy` command: schema-described JSON record to schema-described JSON record.

use std::{fs::File, io::BufReader};

use anyhow::{Context, Result};
use log::info;

use crate::{
    cli::CopyArgs,
    copy::copy_from_with,
    schema::{DynamicRecord, RecordSchema},
};

pub fn execute(args: &CopyArgs) -> Result<()> {
    let source_schema = RecordSchema::load(&args.source_schema).with_context(|| {
        format!("Loading source schema from {:?}", args.source_schema)
    })?;
    let dest_schema = RecordSchema::load(&args.dest_schema)
        .with_context(|| format!("Loading destination schema from {:?}", args.dest_schema))?;

    let file = File::open(&args.input)
        .with_context(|| format!("Opening input record {:?}", args.input))?;
    let input: serde_json::Value = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Parsing input record {:?}", args.input))?;
    let source = DynamicRecord::from_json(source_schema, &input)
        .with_context(|| format!("Reading input record {:?}", args.input))?;

    let options = crate::copy_options(&args.time);
    let mut destination = DynamicRecord::new(dest_schema);
    let report = copy_from_with(&mut destination, &source, &options)
        .context("Copying record fields")?;

    let rendered = serde_json::to_string_pretty(&destination.to_json()?)
        .context("Serializing destination record")?;
    match &args.output {
        Some(path) => std::fs::write(path, format!("{rendered}\n"))
            .with_context(|| format!("Writing output record {path:?}"))?,
        None => println!("{rendered}"),
    }
    info!(
        "Copied {} field(s), skipped {}",
        report.copied.len(),
        report.skipped.len()
    );
    Ok(())
}

