//! Field-by-field copy between records.
//!
//! [`copy_from_with()`] walks the source fields in declaration order, picks the
//! effective time format for each (its `date_format` annotation or the call
//! default), resolves the destination slot, and coerces the value when the
//! kinds differ. Every field is planned before anything is written: a failure
//! anywhere returns an error and leaves the destination untouched.
//!
//! A slot is written at most once per call. When two source fields land on
//! the same slot, a claim made through an alias beats a claim made by name;
//! between claims of the same strength the earlier field keeps the slot.

use std::collections::HashMap;

use chrono::FixedOffset;
use log::{debug, warn};

use crate::{
    coerce::coerce,
    data::Value,
    error::CopyError,
    record::{MatchedBy, Record, resolve},
    time_format::TimeFormat,
};

/// Reference zone for zone-less timestamp text (UTC+09:00).
pub const DEFAULT_ZONE_SECONDS: i32 = 9 * 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyOptions {
    /// Format used by fields without a `date_format` annotation.
    pub time_format: TimeFormat,
    /// Zone applied to timestamp text that carries no offset, and to epoch
    /// integers.
    pub zone: FixedOffset,
}

impl Default for CopyOptions {
    fn default() -> Self {
        CopyOptions {
            time_format: TimeFormat::default(),
            zone: default_zone(),
        }
    }
}

impl CopyOptions {
    pub fn with_time_format(mut self, time_format: TimeFormat) -> Self {
        self.time_format = time_format;
        self
    }

    /// Like [`with_time_format`](Self::with_time_format), validating a
    /// pattern against the registry first.
    pub fn with_time_format_pattern(self, pattern: &str) -> Result<Self, CopyError> {
        Ok(self.with_time_format(TimeFormat::from_pattern(pattern)?))
    }

    pub fn with_zone(mut self, zone: FixedOffset) -> Self {
        self.zone = zone;
        self
    }
}

pub fn default_zone() -> FixedOffset {
    FixedOffset::east_opt(DEFAULT_ZONE_SECONDS).expect("default zone offset is in range")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopiedField {
    pub field: String,
    pub slot: String,
    pub coerced: bool,
}

/// What a successful copy did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyReport {
    pub copied: Vec<CopiedField>,
    /// Source fields with no destination slot, or whose slot went to another
    /// field.
    pub skipped: Vec<String>,
}

struct Planned<'a> {
    field: &'a str,
    slot: &'a str,
    matched_by: MatchedBy,
    coerced: bool,
    value: Value,
}

/// Copies `source` into `destination` with default options and an optional
/// call-level time format.
pub fn copy_from<D, S>(
    destination: &mut D,
    source: &S,
    time_format: Option<TimeFormat>,
) -> Result<CopyReport, CopyError>
where
    D: Record + ?Sized,
    S: Record + ?Sized,
{
    let options = match time_format {
        Some(format) => CopyOptions::default().with_time_format(format),
        None => CopyOptions::default(),
    };
    copy_from_with(destination, source, &options)
}

pub fn copy_from_with<D, S>(
    destination: &mut D,
    source: &S,
    options: &CopyOptions,
) -> Result<CopyReport, CopyError>
where
    D: Record + ?Sized,
    S: Record + ?Sized,
{
    let descriptors = source.descriptors();
    let mut report = CopyReport::default();
    let mut plan: Vec<Planned<'_>> = Vec::with_capacity(descriptors.len());
    let mut claims: HashMap<&str, usize> = HashMap::new();

    for descriptor in descriptors {
        let field = descriptor.name;
        let format = match descriptor.date_format {
            Some(pattern) => TimeFormat::from_pattern(pattern).map_err(|err| err.in_field(field))?,
            None => options.time_format,
        };

        let Some(slot) = resolve(field, descriptor.alias, &*destination) else {
            debug!("Field '{field}' has no destination slot; skipping");
            report.skipped.push(field.to_string());
            continue;
        };

        let coerced = descriptor.kind != slot.kind;
        let value = if coerced {
            coerce(descriptor.value, slot.kind, Some(format), options.zone)
                .map_err(|err| err.in_field(field))?
        } else {
            descriptor.value
        };
        if value.kind() != slot.kind {
            return Err(CopyError::IncompatibleValue {
                slot: slot.name.to_string(),
                expected: slot.kind,
                found: value.kind(),
            }
            .in_field(field));
        }
        debug!(
            "Field '{field}' -> slot '{}' ({:?} match{})",
            slot.name,
            slot.matched_by,
            if coerced { ", coerced" } else { "" }
        );

        let planned = Planned {
            field,
            slot: slot.name,
            matched_by: slot.matched_by,
            coerced,
            value,
        };
        match claims.get(slot.name).copied() {
            Some(idx) if plan[idx].matched_by >= planned.matched_by => {
                warn!(
                    "Slot '{}' already claimed by field '{}'; field '{field}' is not copied",
                    planned.slot, plan[idx].field
                );
                report.skipped.push(field.to_string());
            }
            Some(idx) => {
                warn!(
                    "Field '{field}' claims slot '{}' by alias; field '{}' is not copied",
                    planned.slot, plan[idx].field
                );
                report.skipped.push(plan[idx].field.to_string());
                plan[idx] = planned;
            }
            None => {
                claims.insert(planned.slot, plan.len());
                plan.push(planned);
            }
        }
    }

    for planned in plan {
        destination
            .assign(planned.slot, planned.value)
            .map_err(|err| err.in_field(planned.field))?;
        report.copied.push(CopiedField {
            field: planned.field.to_string(),
            slot: planned.slot.to_string(),
            coerced: planned.coerced,
        });
    }
    Ok(report)
}
