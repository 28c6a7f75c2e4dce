//! Settings that stay fixed for a whole generation run.

use crate::error::{GenerateError, GenerateResult};

/// Default substring marking a field name as sensitive.
pub const DEFAULT_SENSITIVE_NAMES: &str = "secure";

/// Path of the runtime support crate referenced by generated code.
pub const DEFAULT_RUNTIME_PATH: &str = "::optgen";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorSettings {
    /// Lowercase substrings; a field whose lowercase name contains one must
    /// be tagged `debugmap = "sensitive"`.
    pub sensitive_field_name_matches: Vec<String>,
    /// Path generated code uses to reach `Defaults`, `DebugMap` and the
    /// debug value helpers.
    pub runtime_path: String,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            sensitive_field_name_matches: parse_name_matches(DEFAULT_SENSITIVE_NAMES),
            runtime_path: DEFAULT_RUNTIME_PATH.to_string(),
        }
    }
}

/// Split a comma separated list, dropping blanks. An empty entry would match
/// every field name.
pub fn parse_name_matches(list: &str) -> Vec<String> {
    list.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl GeneratorSettings {
    pub fn with_sensitive_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.sensitive_field_name_matches = names
            .into_iter()
            .map(|s| s.as_ref().trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        self
    }

    pub fn with_runtime_path(mut self, path: impl Into<String>) -> Self {
        self.runtime_path = path.into();
        self
    }

    pub fn is_sensitive(&self, field_name: &str) -> bool {
        let lower = field_name.to_lowercase();
        self.sensitive_field_name_matches
            .iter()
            .any(|needle| lower.contains(needle.as_str()))
    }

    pub fn runtime_path(&self) -> GenerateResult<syn::Path> {
        syn::parse_str(&self.runtime_path).map_err(|_| GenerateError::InvalidName {
            name: self.runtime_path.clone(),
            what: "runtime crate path",
        })
    }
}
