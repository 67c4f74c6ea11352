//! Error taxonomy for copy and coercion failures.

use thiserror::Error;

use crate::data::FieldKind;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CopyError {
    #[error("Time format '{pattern}' is not registered")]
    NotRegisteredTimeFormat { pattern: String },

    #[error("Cannot convert {from} to {to}")]
    UnsupportedConversion { from: FieldKind, to: FieldKind },

    #[error("Failed to parse '{value}' as {target}: {reason}")]
    ParseFailure {
        value: String,
        target: FieldKind,
        reason: String,
    },

    #[error("Conversion from {from} to {to} requires a time format")]
    MissingTimeFormat { from: FieldKind, to: FieldKind },

    #[error("Slot '{slot}' holds {expected} values but received {found}")]
    IncompatibleValue {
        slot: String,
        expected: FieldKind,
        found: FieldKind,
    },

    #[error("Slot '{slot}' does not exist")]
    UnknownSlot { slot: String },

    #[error("Field '{field}'")]
    Field {
        field: String,
        #[source]
        source: Box<CopyError>,
    },
}

impl CopyError {
    pub(crate) fn in_field(self, field: &str) -> Self {
        CopyError::Field {
            field: field.to_string(),
            source: Box::new(self),
        }
    }

    /// Returns the underlying failure, looking through any field wrapper.
    pub fn root(&self) -> &CopyError {
        match self {
            CopyError::Field { source, .. } => source.root(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_wrapper_names_the_field_and_chains_the_cause() {
        let err = CopyError::UnsupportedConversion {
            from: FieldKind::Other,
            to: FieldKind::Integer,
        }
        .in_field("extra");
        assert_eq!(err.to_string(), "Field 'extra'");
        assert_eq!(
            format!("{:#}", anyhow::Error::new(err)),
            "Field 'extra': Cannot convert other to integer"
        );
    }
}
