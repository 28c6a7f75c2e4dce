//! Field eligibility and option strategy selection.

use crate::descriptor::{FieldDescriptor, RecordDescriptor, TypeDescriptor};

/// Which option functions a field gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// `with_f(value)` replacing the field.
    Standard,
    /// `with_f(element)` appending plus `set_f(vec)` replacing.
    Sequence,
    /// `with_f(key, value)` inserting plus `set_f(map)` replacing.
    Map,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Sequence => "sequence",
            Self::Map => "map",
        }
    }
}

/// Whether a field participates in option generation for `destination`.
///
/// Anonymous fields never do. Private fields only do when the generated code
/// lands in the module that declares them.
pub fn is_eligible(field: &FieldDescriptor, destination: &str) -> bool {
    !field.anonymous && (field.exported || field.module == destination)
}

/// Strategy for a field type, by its outermost shape.
pub fn classify(ty: &TypeDescriptor) -> Strategy {
    match ty {
        TypeDescriptor::Slice { .. } => Strategy::Sequence,
        TypeDescriptor::Map { .. } => Strategy::Map,
        _ => Strategy::Standard,
    }
}

/// Eligible fields of a record, in declaration order.
pub fn eligible_fields<'a>(
    record: &'a RecordDescriptor,
    destination: &'a str,
) -> impl Iterator<Item = &'a FieldDescriptor> + 'a {
    record
        .fields
        .iter()
        .filter(move |field| is_eligible(field, destination))
}
