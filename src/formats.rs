//! Listing and checking registered time formats.

use anyhow::{Context, Result};
use log::info;

use crate::{cli::FormatsArgs, table, time_format::TimeFormat};

pub fn execute(args: &FormatsArgs) -> Result<()> {
    if let Some(pattern) = &args.check {
        let format = TimeFormat::from_pattern(pattern)
            .with_context(|| format!("Checking time format pattern '{pattern}'"))?;
        println!("{}", format.name());
        return Ok(());
    }

    let rows = format_rows();
    table::print_table(&["name", "pattern", "offset"], &rows);
    info!("Listed {} registered time format(s)", rows.len());
    Ok(())
}

pub fn format_rows() -> Vec<Vec<String>> {
    TimeFormat::all()
        .iter()
        .map(|format| {
            vec![
                format.name().to_string(),
                format.pattern().to_string(),
                if format.has_offset() { "yes" } else { "no" }.to_string(),
            ]
        })
        .collect()
}
