//! Record tables and destination slot resolution.
//!
//! A [`Record`] exposes its fields as an explicit table: source records
//! describe each field with a [`FieldDescriptor`], destination records report
//! the kind of a named slot and accept assignments into it. Plain structs get
//! the table from [`impl_record!`](crate::impl_record); schema-driven records
//! implement it over their field list.

use chrono::{DateTime, FixedOffset};

use crate::{
    data::{FieldKind, Value},
    error::CopyError,
};

/// One source field, captured for the duration of a copy.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor<'a> {
    pub name: &'a str,
    pub alias: Option<&'a str>,
    pub date_format: Option<&'a str>,
    pub kind: FieldKind,
    pub value: Value,
}

impl<'a> FieldDescriptor<'a> {
    pub fn new(name: &'a str, value: Value) -> Self {
        FieldDescriptor {
            name,
            alias: None,
            date_format: None,
            kind: value.kind(),
            value,
        }
    }

    /// Names the destination slot this field writes into.
    pub fn alias(mut self, alias: &'a str) -> Self {
        self.alias = Some(alias);
        self
    }

    /// Selects a registered time format pattern for this field.
    pub fn date_format(mut self, pattern: &'a str) -> Self {
        self.date_format = Some(pattern);
        self
    }
}

pub trait Record {
    /// Source-side view: every field in declaration order.
    fn descriptors(&self) -> Vec<FieldDescriptor<'_>>;

    /// Kind of the destination slot called `name`, if there is one.
    fn slot_kind(&self, name: &str) -> Option<FieldKind>;

    /// Writes `value` into the slot called `name`.
    ///
    /// Copies check every value against [`Record::slot_kind`] before the
    /// first assignment, so an implementation must not fail once `name`
    /// exists and `value` has that slot's kind. Otherwise a failed copy can
    /// leave earlier slots written. Unknown names fail with
    /// [`CopyError::UnknownSlot`] and change nothing.
    fn assign(&mut self, name: &str, value: Value) -> Result<(), CopyError>;
}

/// How a source field found its destination slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchedBy {
    Name,
    Alias,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot<'a> {
    pub name: &'a str,
    pub kind: FieldKind,
    pub matched_by: MatchedBy,
}

/// Finds the destination slot for a source field.
///
/// A non-empty alias naming an existing slot always wins; otherwise the slot
/// with the field's own name is used. `None` means the field is not copied.
pub fn resolve<'a, R>(field: &'a str, alias: Option<&'a str>, destination: &R) -> Option<Slot<'a>>
where
    R: Record + ?Sized,
{
    if let Some(alias) = alias.filter(|alias| !alias.is_empty())
        && let Some(kind) = destination.slot_kind(alias)
    {
        return Some(Slot {
            name: alias,
            kind,
            matched_by: MatchedBy::Alias,
        });
    }
    destination.slot_kind(field).map(|kind| Slot {
        name: field,
        kind,
        matched_by: MatchedBy::Name,
    })
}

/// Rust types that can live in a record field.
pub trait FieldValue: Sized {
    const KIND: FieldKind;

    fn to_value(&self) -> Value;

    /// Converts back from a [`Value`], handing the value back when it is of
    /// another kind.
    fn from_value(value: Value) -> Result<Self, Value>;
}

/// Kind of a field, inferred from a reference to it.
pub fn kind_of<T: FieldValue>(_: &T) -> FieldKind {
    T::KIND
}

macro_rules! impl_field_value {
    ( $( $ty:ty => $variant:ident ),* $(,)? ) => {
        $(
            impl FieldValue for $ty {
                const KIND: FieldKind = FieldKind::$variant;

                fn to_value(&self) -> Value {
                    Value::$variant(self.clone())
                }

                fn from_value(value: Value) -> Result<Self, Value> {
                    match value {
                        Value::$variant(inner) => Ok(inner),
                        other => Err(other),
                    }
                }
            }
        )*
    };
}

impl_field_value! {
    String => Text,
    i64 => Integer,
    f64 => Float,
    bool => Boolean,
    DateTime<FixedOffset> => Timestamp,
    serde_json::Value => Other,
}

/// Implements [`Record`](crate::record::Record) for a struct from an explicit
/// field list.
///
/// Each field may carry `alias = "..."` and `date_format = "..."`
/// annotations in parentheses:
///
/// ```
/// use chrono::{DateTime, FixedOffset};
///
/// #[derive(Default)]
/// struct Order {
///     id: i64,
///     placed_at: DateTime<FixedOffset>,
/// }
///
/// kopcup::impl_record!(Order {
///     id(alias = "order_id"),
///     placed_at(date_format = "%Y-%m-%d"),
/// });
/// ```
#[macro_export]
macro_rules! impl_record {
    ( $ty:ty { $( $field:ident $( ( $( $key:ident = $val:literal ),* $(,)? ) )? ),* $(,)? } ) => {
        impl $crate::record::Record for $ty {
            fn descriptors(&self) -> ::std::vec::Vec<$crate::record::FieldDescriptor<'_>> {
                ::std::vec![
                    $(
                        $crate::record::FieldDescriptor::new(
                            stringify!($field),
                            $crate::record::FieldValue::to_value(&self.$field),
                        )
                        $( $( .$key($val) )* )?
                    ),*
                ]
            }

            fn slot_kind(&self, name: &str) -> ::std::option::Option<$crate::data::FieldKind> {
                $(
                    if name == stringify!($field) {
                        return ::std::option::Option::Some($crate::record::kind_of(&self.$field));
                    }
                )*
                ::std::option::Option::None
            }

            fn assign(
                &mut self,
                name: &str,
                value: $crate::data::Value,
            ) -> ::std::result::Result<(), $crate::error::CopyError> {
                $(
                    if name == stringify!($field) {
                        let expected = $crate::record::kind_of(&self.$field);
                        self.$field = $crate::record::FieldValue::from_value(value).map_err(
                            |rejected: $crate::data::Value| $crate::error::CopyError::IncompatibleValue {
                                slot: name.to_string(),
                                expected,
                                found: rejected.kind(),
                            },
                        )?;
                        return ::std::result::Result::Ok(());
                    }
                )*
                let _ = value;
                ::std::result::Result::Err($crate::error::CopyError::UnknownSlot {
                    slot: name.to_string(),
                })
            }
        }
    };
}
