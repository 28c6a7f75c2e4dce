//! Destinations for rendered output units.

use crate::error::{GenerateError, GenerateResult};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Suffix appended to a source file stem for derived output files.
pub const OUTPUT_SUFFIX: &str = "_opts";

/// Receives rendered units.
pub trait OutputSink {
    /// Store `contents` under `path`. Returns `false` when the stored
    /// contents were already identical.
    fn write_unit(&mut self, path: &Path, contents: &str) -> GenerateResult<bool>;
}

/// Writes units to disk, creating parent directories as needed.
///
/// Files whose contents have not changed are left untouched so build
/// scripts do not trigger needless recompilation.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileSink;

impl OutputSink for FileSink {
    fn write_unit(&mut self, path: &Path, contents: &str) -> GenerateResult<bool> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| GenerateError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let unchanged = match fs::read_to_string(path) {
            Ok(existing) => existing == contents,
            Err(_) => false,
        };
        if unchanged {
            return Ok(false);
        }

        fs::write(path, contents).map_err(|source| GenerateError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(true)
    }
}

/// Keeps units in memory, keyed by path.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub units: BTreeMap<PathBuf, String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<&str> {
        self.units.get(path.as_ref()).map(String::as_str)
    }
}

impl OutputSink for MemorySink {
    fn write_unit(&mut self, path: &Path, contents: &str) -> GenerateResult<bool> {
        let previous = self.units.insert(path.to_path_buf(), contents.to_string());
        Ok(previous.as_deref() != Some(contents))
    }
}

/// `dir/name.rs` becomes `dir/name_opts.rs`.
pub fn derive_output_path(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    source.with_file_name(format!("{stem}{OUTPUT_SUFFIX}.rs"))
}
