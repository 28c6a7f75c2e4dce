//! Error types for option generation.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for generator operations.
pub type GenerateResult<T> = Result<T, GenerateError>;

/// Everything that can stop a generation run.
///
/// Schema and annotation problems are collected for the whole run and
/// reported together as [`GenerateError::Multiple`].
#[derive(Debug, Error)]
pub enum GenerateError {
    /// A source or descriptor file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A source file is not valid Rust.
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// A descriptor file is not valid JSON for a list of records.
    #[error("failed to load descriptors from {path}: {message}")]
    Descriptors { path: PathBuf, message: String },

    /// A requested name resolved to something other than a struct.
    #[error("type {name} is not a struct (found {kind})")]
    NotAStruct { name: String, kind: &'static str },

    /// A requested struct declares generic parameters.
    #[error("type {name} declares generic parameters, which optgen cannot generate options for")]
    GenericRecord { name: String },

    /// A field type could not be decomposed.
    #[error("field {field} in type {record}: {source}")]
    Resolve {
        record: String,
        field: String,
        #[source]
        source: ResolveError,
    },

    /// A record, field or module name is not usable as Rust syntax.
    #[error("'{name}' is not a valid {what}")]
    InvalidName { name: String, what: &'static str },

    /// Two fields of one record generate the same function.
    #[error("field {field} in type {record} generates `{function}`, which is already defined for {record}")]
    NameCollision {
        record: String,
        field: String,
        function: String,
    },

    /// Two records with one name would be generated into the same file.
    #[error("types {first}::{name} and {second}::{name} are both generated into {path}, defining {name}Option twice")]
    RecordNameCollision {
        name: String,
        path: PathBuf,
        first: String,
        second: String,
    },

    #[error("missing debugmap tag on field {field} in type {record}")]
    MissingDebugTag { record: String, field: String },

    #[error("unknown value '{value}' for debugmap tag on field {field} in type {record}")]
    UnknownDebugTag {
        record: String,
        field: String,
        value: String,
    },

    #[error("malformed optgen tag on field {field} in type {record}: {message}")]
    MalformedTag {
        record: String,
        field: String,
        message: String,
    },

    #[error("field {field} in type {record} must be marked as 'sensitive'")]
    SensitiveFieldNotMarked { record: String, field: String },

    /// Pre-resolved records without a source file need an explicit output.
    #[error("no output file configured for {record}, which has no source file to derive one from")]
    NoDestination { record: String },

    /// The synthesized tokens did not form a valid file.
    #[error("failed to render generated code: {message}")]
    Render { message: String },

    /// The output could not be written.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Several errors collected during one run.
    #[error("{} errors:\n{}", .0.len(), format_errors(.0))]
    Multiple(Vec<GenerateError>),
}

/// Failure to decompose a single type.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("optgen doesn't know how to generate for type {type_name}, it nests deeper than {limit} layers")]
    TooDeep { type_name: String, limit: usize },

    #[error("optgen doesn't know how to generate for type {type_name}: {reason}")]
    Unsupported { type_name: String, reason: String },

    #[error("'{path}' is not a valid type path")]
    InvalidPath { path: String },
}

fn format_errors(errors: &[GenerateError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, e)| format!("  {}. {}", i + 1, e))
        .collect::<Vec<_>>()
        .join("\n")
}

impl GenerateError {
    /// Collapse collected errors into one value; `None` when there are none.
    pub fn from_many(mut errors: Vec<GenerateError>) -> Option<Self> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(Self::Multiple(errors)),
        }
    }

    /// Flatten into individual errors.
    pub fn into_errors(self) -> Vec<GenerateError> {
        match self {
            Self::Multiple(errors) => errors.into_iter().flat_map(Self::into_errors).collect(),
            other => vec![other],
        }
    }

    pub fn resolve(record: &str, field: &str, source: ResolveError) -> Self {
        Self::Resolve {
            record: record.to_string(),
            field: field.to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_many() {
        assert!(GenerateError::from_many(Vec::new()).is_none());

        let single = GenerateError::from_many(vec![GenerateError::GenericRecord { name: "A".into() }]).unwrap();
        assert!(matches!(single, GenerateError::GenericRecord { .. }));

        let multiple = GenerateError::from_many(vec![
            GenerateError::GenericRecord { name: "A".into() },
            GenerateError::MissingDebugTag {
                record: "B".into(),
                field: "name".into(),
            },
        ])
        .unwrap();
        let message = multiple.to_string();
        assert!(message.starts_with("2 errors:"));
        assert!(message.contains("  2. missing debugmap tag on field name in type B"));
        assert_eq!(multiple.into_errors().len(), 2);
    }
}
