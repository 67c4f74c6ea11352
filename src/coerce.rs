//! Scalar coercion between field kinds.
//!
//! [`coerce()`] converts a [`Value`] into a destination [`FieldKind`]. Values
//! already of the destination kind pass through untouched, and so do values
//! headed for kinds outside the coercion targets (boolean and other); the
//! destination slot decides whether it can hold those.

use chrono::{DateTime, FixedOffset};

use crate::{
    data::{FieldKind, Value},
    error::CopyError,
    time_format::TimeFormat,
};

pub fn coerce(
    value: Value,
    to: FieldKind,
    format: Option<TimeFormat>,
    zone: FixedOffset,
) -> Result<Value, CopyError> {
    let from = value.kind();
    if from == to || !to.is_coercion_target() {
        return Ok(value);
    }
    let needs_format = from == FieldKind::Timestamp || to == FieldKind::Timestamp;
    let format = match (format, needs_format) {
        (None, true) => return Err(CopyError::MissingTimeFormat { from, to }),
        (format, _) => format.unwrap_or_default(),
    };
    match to {
        FieldKind::Text => to_text(value, format).map(Value::Text),
        FieldKind::Integer => to_integer(value).map(Value::Integer),
        FieldKind::Float => to_float(value).map(Value::Float),
        FieldKind::Timestamp => to_timestamp(value, format, zone).map(Value::Timestamp),
        FieldKind::Boolean | FieldKind::Other => Ok(value),
    }
}

pub fn to_text(value: Value, format: TimeFormat) -> Result<String, CopyError> {
    match value {
        Value::Text(s) => Ok(s),
        Value::Integer(i) => Ok(i.to_string()),
        Value::Boolean(b) => Ok(b.to_string()),
        Value::Timestamp(ts) => Ok(format.render(&ts)),
        other => Err(unsupported(&other, FieldKind::Text)),
    }
}

pub fn to_integer(value: Value) -> Result<i64, CopyError> {
    match value {
        Value::Integer(i) => Ok(i),
        Value::Text(s) => s.parse().map_err(|err: std::num::ParseIntError| {
            CopyError::ParseFailure {
                value: s.clone(),
                target: FieldKind::Integer,
                reason: err.to_string(),
            }
        }),
        Value::Boolean(b) => Ok(i64::from(b)),
        other => Err(unsupported(&other, FieldKind::Integer)),
    }
}

pub fn to_float(value: Value) -> Result<f64, CopyError> {
    match value {
        Value::Float(f) => Ok(f),
        Value::Integer(i) => Ok(i as f64),
        Value::Text(s) => s.parse().map_err(|err: std::num::ParseFloatError| {
            CopyError::ParseFailure {
                value: s.clone(),
                target: FieldKind::Float,
                reason: err.to_string(),
            }
        }),
        Value::Boolean(b) => Ok(if b { 1.0 } else { 0.0 }),
        other => Err(unsupported(&other, FieldKind::Float)),
    }
}

/// Integers are Unix epoch seconds, shown in `zone`; text is parsed with
/// `format`.
pub fn to_timestamp(
    value: Value,
    format: TimeFormat,
    zone: FixedOffset,
) -> Result<DateTime<FixedOffset>, CopyError> {
    match value {
        Value::Timestamp(ts) => Ok(ts),
        Value::Integer(seconds) => DateTime::from_timestamp(seconds, 0)
            .map(|utc| utc.with_timezone(&zone))
            .ok_or_else(|| CopyError::ParseFailure {
                value: seconds.to_string(),
                target: FieldKind::Timestamp,
                reason: "epoch seconds out of range".to_string(),
            }),
        Value::Text(s) => format.parse(&s, zone),
        other => Err(unsupported(&other, FieldKind::Timestamp)),
    }
}

fn unsupported(value: &Value, to: FieldKind) -> CopyError {
    CopyError::UnsupportedConversion {
        from: value.kind(),
        to,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn jst() -> FixedOffset {
        FixedOffset::east_opt(9 * 3600).unwrap()
    }

    fn coerce_rfc(value: Value, to: FieldKind) -> Result<Value, CopyError> {
        coerce(value, to, Some(TimeFormat::Rfc3339), jst())
    }

    #[test]
    fn same_kind_passes_through() {
        let value = Value::Float(3.5);
        assert_eq!(coerce(value.clone(), FieldKind::Float, None, jst()).unwrap(), value);
    }

    #[test]
    fn text_targets() {
        assert_eq!(
            coerce_rfc(Value::Integer(-42), FieldKind::Text).unwrap(),
            Value::Text("-42".into())
        );
        assert_eq!(
            coerce_rfc(Value::Boolean(true), FieldKind::Text).unwrap(),
            Value::Text("true".into())
        );
        let ts = jst().with_ymd_and_hms(2021, 11, 19, 12, 30, 0).unwrap();
        assert_eq!(
            coerce_rfc(Value::Timestamp(ts), FieldKind::Text).unwrap(),
            Value::Text("2021-11-19T12:30:00+09:00".into())
        );
        assert_eq!(
            coerce_rfc(Value::Float(2.75), FieldKind::Text).unwrap_err(),
            CopyError::UnsupportedConversion {
                from: FieldKind::Float,
                to: FieldKind::Text
            }
        );
    }

    #[test]
    fn integer_targets() {
        assert_eq!(
            coerce_rfc(Value::Text("42".into()), FieldKind::Integer).unwrap(),
            Value::Integer(42)
        );
        assert_eq!(
            coerce_rfc(Value::Boolean(false), FieldKind::Integer).unwrap(),
            Value::Integer(0)
        );
        assert!(matches!(
            coerce_rfc(Value::Text("invalid".into()), FieldKind::Integer),
            Err(CopyError::ParseFailure {
                target: FieldKind::Integer,
                ..
            })
        ));
        assert!(matches!(
            coerce_rfc(Value::Float(2.75), FieldKind::Integer),
            Err(CopyError::UnsupportedConversion { .. })
        ));
    }

    #[test]
    fn float_targets() {
        assert_eq!(
            coerce_rfc(Value::Integer(42), FieldKind::Float).unwrap(),
            Value::Float(42.0)
        );
        assert_eq!(
            coerce_rfc(Value::Text("2.75".into()), FieldKind::Float).unwrap(),
            Value::Float(2.75)
        );
        assert_eq!(
            coerce_rfc(Value::Boolean(true), FieldKind::Float).unwrap(),
            Value::Float(1.0)
        );
        assert!(matches!(
            coerce_rfc(Value::Text("invalid type".into()), FieldKind::Float),
            Err(CopyError::ParseFailure { .. })
        ));
    }

    #[test]
    fn timestamp_targets() {
        let from_epoch = coerce_rfc(Value::Integer(1_637_292_600), FieldKind::Timestamp).unwrap();
        assert_eq!(
            from_epoch,
            Value::Timestamp(jst().with_ymd_and_hms(2021, 11, 19, 12, 30, 0).unwrap())
        );
        assert!(matches!(
            coerce_rfc(Value::Float(2.75), FieldKind::Timestamp),
            Err(CopyError::UnsupportedConversion { .. })
        ));
        assert!(matches!(
            coerce_rfc(Value::Text("2021-11-19T12:30:00".into()), FieldKind::Timestamp),
            Err(CopyError::ParseFailure { .. })
        ));
    }

    #[test]
    fn timestamp_conversions_require_a_format() {
        assert_eq!(
            coerce(Value::Integer(0), FieldKind::Timestamp, None, jst()).unwrap_err(),
            CopyError::MissingTimeFormat {
                from: FieldKind::Integer,
                to: FieldKind::Timestamp
            }
        );
        assert!(coerce(Value::Integer(1), FieldKind::Text, None, jst()).is_ok());
    }

    #[test]
    fn boolean_and_other_destinations_receive_raw_values() {
        let raw = Value::Text("yes".into());
        assert_eq!(
            coerce_rfc(raw.clone(), FieldKind::Boolean).unwrap(),
            raw
        );
        assert_eq!(coerce_rfc(Value::Integer(7), FieldKind::Other).unwrap(), Value::Integer(7));
    }
}
