//! Closed registry of timestamp text formats.
//!
//! Every [`TimeFormat`] carries a canonical chrono pattern. Annotations and
//! caller-supplied patterns are validated against this table with
//! [`TimeFormat::from_pattern`]; anything not listed here is rejected.
//!
//! Patterns ending in an offset (`%:z`) accept `Z` for UTC when parsing and
//! render UTC instants with `Z`, matching RFC 3339. Patterns without an
//! offset are interpreted in a caller-supplied reference zone.
//!
//! The `*-nano` formats use chrono's `%.f`, which writes the fraction in
//! groups of three digits: 250 ms renders as `.250`, not `.25`, and a whole
//! second has no fraction at all. Any number of fractional digits is
//! accepted when parsing.

use std::{fmt, str::FromStr};

use anyhow::{Result, anyhow, bail};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, Utc};

use crate::{data::FieldKind, error::CopyError};

const UTC_OFFSET_TEXT: &str = "+00:00";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TimeFormat {
    #[default]
    Rfc3339,
    Rfc3339Nano,
    Rfc3339Slash,
    Rfc3339SlashNano,
    Rfc3339Block,
    Rfc3339BlockNano,
    DateTime,
    DateTimeSlash,
    DateTimeBlock,
    DateOnly,
    DateOnlySlash,
    DateOnlyBlock,
    TimeOnly,
    TimeOnlyBlock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Offset,
    Local,
    Date,
    Time,
}

const ALL_FORMATS: &[TimeFormat] = &[
    TimeFormat::Rfc3339,
    TimeFormat::Rfc3339Nano,
    TimeFormat::Rfc3339Slash,
    TimeFormat::Rfc3339SlashNano,
    TimeFormat::Rfc3339Block,
    TimeFormat::Rfc3339BlockNano,
    TimeFormat::DateTime,
    TimeFormat::DateTimeSlash,
    TimeFormat::DateTimeBlock,
    TimeFormat::DateOnly,
    TimeFormat::DateOnlySlash,
    TimeFormat::DateOnlyBlock,
    TimeFormat::TimeOnly,
    TimeFormat::TimeOnlyBlock,
];

impl TimeFormat {
    pub fn all() -> &'static [TimeFormat] {
        ALL_FORMATS
    }

    pub fn pattern(&self) -> &'static str {
        match self {
            TimeFormat::Rfc3339 => "%Y-%m-%dT%H:%M:%S%:z",
            TimeFormat::Rfc3339Nano => "%Y-%m-%dT%H:%M:%S%.f%:z",
            TimeFormat::Rfc3339Slash => "%Y/%m/%dT%H:%M:%S%:z",
            TimeFormat::Rfc3339SlashNano => "%Y/%m/%dT%H:%M:%S%.f%:z",
            TimeFormat::Rfc3339Block => "%Y%m%d%H%M%S%:z",
            TimeFormat::Rfc3339BlockNano => "%Y%m%d%H%M%S%.f%:z",
            TimeFormat::DateTime => "%Y-%m-%d %H:%M:%S",
            TimeFormat::DateTimeSlash => "%Y/%m/%d %H:%M:%S",
            TimeFormat::DateTimeBlock => "%Y%m%d%H%M%S",
            TimeFormat::DateOnly => "%Y-%m-%d",
            TimeFormat::DateOnlySlash => "%Y/%m/%d",
            TimeFormat::DateOnlyBlock => "%Y%m%d",
            TimeFormat::TimeOnly => "%H:%M:%S",
            TimeFormat::TimeOnlyBlock => "%H%M%S",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TimeFormat::Rfc3339 => "rfc3339",
            TimeFormat::Rfc3339Nano => "rfc3339-nano",
            TimeFormat::Rfc3339Slash => "rfc3339-slash",
            TimeFormat::Rfc3339SlashNano => "rfc3339-slash-nano",
            TimeFormat::Rfc3339Block => "rfc3339-block",
            TimeFormat::Rfc3339BlockNano => "rfc3339-block-nano",
            TimeFormat::DateTime => "datetime",
            TimeFormat::DateTimeSlash => "datetime-slash",
            TimeFormat::DateTimeBlock => "datetime-block",
            TimeFormat::DateOnly => "date",
            TimeFormat::DateOnlySlash => "date-slash",
            TimeFormat::DateOnlyBlock => "date-block",
            TimeFormat::TimeOnly => "time",
            TimeFormat::TimeOnlyBlock => "time-block",
        }
    }

    /// Looks up the format whose canonical pattern is exactly `pattern`.
    pub fn from_pattern(pattern: &str) -> Result<TimeFormat, CopyError> {
        ALL_FORMATS
            .iter()
            .copied()
            .find(|format| format.pattern() == pattern)
            .ok_or_else(|| CopyError::NotRegisteredTimeFormat {
                pattern: pattern.to_string(),
            })
    }

    pub fn from_name(name: &str) -> Option<TimeFormat> {
        let normalized = name.trim().to_ascii_lowercase();
        ALL_FORMATS
            .iter()
            .copied()
            .find(|format| format.name() == normalized)
    }

    pub fn has_offset(&self) -> bool {
        self.layout() == Layout::Offset
    }

    fn layout(&self) -> Layout {
        match self {
            TimeFormat::Rfc3339
            | TimeFormat::Rfc3339Nano
            | TimeFormat::Rfc3339Slash
            | TimeFormat::Rfc3339SlashNano
            | TimeFormat::Rfc3339Block
            | TimeFormat::Rfc3339BlockNano => Layout::Offset,
            TimeFormat::DateTime | TimeFormat::DateTimeSlash | TimeFormat::DateTimeBlock => {
                Layout::Local
            }
            TimeFormat::DateOnly | TimeFormat::DateOnlySlash | TimeFormat::DateOnlyBlock => {
                Layout::Date
            }
            TimeFormat::TimeOnly | TimeFormat::TimeOnlyBlock => Layout::Time,
        }
    }

    /// Parses `text` with this format.
    ///
    /// Text with its own offset keeps it. Zone-less text is read as wall
    /// time in `zone`; date-only text lands on midnight and time-only text on
    /// 1970-01-01.
    pub fn parse(&self, text: &str, zone: FixedOffset) -> Result<DateTime<FixedOffset>, CopyError> {
        let pattern = self.pattern();
        let failure = |reason: String| CopyError::ParseFailure {
            value: text.to_string(),
            target: FieldKind::Timestamp,
            reason,
        };
        let naive = match self.layout() {
            Layout::Offset => {
                let normalized = normalize_zulu(text);
                return DateTime::parse_from_str(&normalized, pattern)
                    .map_err(|err| failure(format!("{err} (pattern '{pattern}')")));
            }
            Layout::Local => NaiveDateTime::parse_from_str(text, pattern)
                .map_err(|err| failure(format!("{err} (pattern '{pattern}')")))?,
            Layout::Date => NaiveDate::parse_from_str(text, pattern)
                .map_err(|err| failure(format!("{err} (pattern '{pattern}')")))?
                .and_time(NaiveTime::MIN),
            Layout::Time => {
                let time = NaiveTime::parse_from_str(text, pattern)
                    .map_err(|err| failure(format!("{err} (pattern '{pattern}')")))?;
                // 1970-01-01
                NaiveDate::default().and_time(time)
            }
        };
        naive
            .and_local_timezone(zone)
            .single()
            .ok_or_else(|| failure(format!("local time is not representable in {zone}")))
    }

    /// Renders `timestamp` in its own offset using this format.
    pub fn render(&self, timestamp: &DateTime<FixedOffset>) -> String {
        let rendered = timestamp.format(self.pattern()).to_string();
        if self.has_offset()
            && timestamp.offset().local_minus_utc() == 0
            && let Some(stem) = rendered.strip_suffix(UTC_OFFSET_TEXT)
        {
            return format!("{stem}Z");
        }
        rendered
    }
}

fn normalize_zulu(text: &str) -> String {
    match text.strip_suffix(['Z', 'z']) {
        Some(stem) => format!("{stem}{UTC_OFFSET_TEXT}"),
        None => text.to_string(),
    }
}

impl fmt::Display for TimeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.pattern())
    }
}

impl FromStr for TimeFormat {
    type Err = CopyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        TimeFormat::from_pattern(value)
    }
}

/// Parses a reference zone such as `Z`, `UTC`, `+09:00`, `-0530` or `+09`.
pub fn parse_zone(value: &str) -> Result<FixedOffset> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("z") || trimmed.eq_ignore_ascii_case("utc") {
        return Ok(Utc.fix());
    }
    let (sign, rest) = match trimmed.split_at_checked(1) {
        Some(("+", rest)) => (1, rest),
        Some(("-", rest)) => (-1, rest),
        _ => bail!("Zone '{value}' must start with '+' or '-', or be 'Z'/'UTC'"),
    };
    let digits = rest.replace(':', "");
    if !digits.chars().all(|c| c.is_ascii_digit()) || !matches!(digits.len(), 2 | 4) {
        bail!("Zone '{value}' must look like +HH, +HHMM or +HH:MM");
    }
    let hours: i32 = digits[..2].parse()?;
    let minutes: i32 = if digits.len() == 4 { digits[2..].parse()? } else { 0 };
    if hours > 23 || minutes > 59 {
        bail!("Zone '{value}' is out of range");
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
        .ok_or_else(|| anyhow!("Zone '{value}' is out of range"))
}
