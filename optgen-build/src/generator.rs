//! Emission driver: gathers records, synthesizes them and writes units.

use crate::descriptor::RecordDescriptor;
use crate::error::{GenerateError, GenerateResult};
use crate::scanner::{SourceFile, collect_files, compute_module_path};
use crate::settings::{GeneratorSettings, parse_name_matches};
use crate::sink::{FileSink, OutputSink, derive_output_path};
use crate::synth::{GenerationConfig, synthesize};
use proc_macro2::TokenStream;
use quote::quote;
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// First line of every generated unit.
pub const GENERATED_HEADER: &str = "// Code generated by optgen. DO NOT EDIT.";

/// Builder for configuring and running option generation.
#[derive(Debug, Clone)]
pub struct OptionsGenerator {
    scan_paths: Vec<PathBuf>,
    src_root: PathBuf,
    crate_name: String,
    record_names: Vec<String>,
    descriptors: Vec<RecordDescriptor>,
    descriptor_files: Vec<PathBuf>,
    output_file: Option<PathBuf>,
    destination: Option<String>,
    settings: GeneratorSettings,
}

/// What a run produced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationReport {
    pub units: Vec<UnitReport>,
    /// Requested names that were found nowhere.
    pub missing: Vec<String>,
}

impl GenerationReport {
    /// Number of records options were generated for.
    pub fn record_count(&self) -> usize {
        self.units.iter().map(|unit| unit.records.len()).sum()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UnitReport {
    pub path: PathBuf,
    pub destination: String,
    pub records: Vec<String>,
    /// False when the existing output was already up to date.
    pub written: bool,
}

struct Unit {
    path: PathBuf,
    destination: String,
    records: Vec<RecordDescriptor>,
}

impl OptionsGenerator {
    /// Create a new generator with default settings.
    pub fn new() -> Self {
        Self {
            scan_paths: Vec::new(),
            src_root: PathBuf::from("src"),
            crate_name: "crate".to_string(),
            record_names: Vec::new(),
            descriptors: Vec::new(),
            descriptor_files: Vec::new(),
            output_file: None,
            destination: None,
            settings: GeneratorSettings::default(),
        }
    }

    /// Add a file or directory to scan for the requested records.
    ///
    /// Can be called multiple times.
    pub fn scan_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.scan_paths.push(path.into());
        self
    }

    /// Directory module paths are computed from.
    ///
    /// Default: `src`
    pub fn src_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.src_root = path.into();
        self
    }

    /// Set the crate name used as the root of module paths.
    ///
    /// Default: `crate`
    pub fn crate_name(mut self, name: impl Into<String>) -> Self {
        self.crate_name = name.into();
        self
    }

    /// Request options for the record named `name`.
    pub fn record(mut self, name: impl Into<String>) -> Self {
        self.record_names.push(name.into());
        self
    }

    pub fn records<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.record_names.extend(names.into_iter().map(Into::into));
        self
    }

    /// Add a pre-resolved record. Without requested names every added
    /// descriptor is generated.
    pub fn descriptor(mut self, record: RecordDescriptor) -> Self {
        self.descriptors.push(record);
        self
    }

    /// Load pre-resolved records from a JSON array.
    pub fn descriptors_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.descriptor_files.push(path.into());
        self
    }

    /// Write every record into this single file instead of `<stem>_opts.rs`
    /// siblings of each source file.
    pub fn output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_file = Some(path.into());
        self
    }

    /// Module the generated code lives in, overriding the inferred one.
    pub fn destination_module(mut self, module: impl Into<String>) -> Self {
        self.destination = Some(module.into());
        self
    }

    pub fn settings(mut self, settings: GeneratorSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Comma separated substrings marking field names as sensitive.
    ///
    /// Default: `secure`
    pub fn sensitive_field_name_matches(mut self, list: &str) -> Self {
        self.settings.sensitive_field_name_matches = parse_name_matches(list);
        self
    }

    /// Path generated code uses for the runtime crate.
    ///
    /// Default: `::optgen`
    pub fn runtime_path(mut self, path: impl Into<String>) -> Self {
        self.settings.runtime_path = path.into();
        self
    }

    /// Run the generator, writing units to disk.
    pub fn run(self) -> GenerateResult<GenerationReport> {
        self.run_with_sink(&mut FileSink)
    }

    /// Run the generator, handing units to `sink`.
    ///
    /// Nothing is written unless every requested record generated cleanly.
    pub fn run_with_sink(self, sink: &mut dyn OutputSink) -> GenerateResult<GenerationReport> {
        let mut errors = Vec::new();
        let records = self.gather(&mut errors);

        let found: HashSet<&str> = records.iter().map(|record| record.name.as_str()).collect();
        let mut missing: Vec<String> = Vec::new();
        for name in &self.record_names {
            if !found.contains(name.as_str()) && !missing.contains(name) {
                missing.push(name.clone());
            }
        }
        for name in &missing {
            log::warn!("optgen: type {name} was not found in any scanned source");
        }

        let units = self.plan_units(records, &mut errors);

        let mut rendered = Vec::new();
        for unit in units {
            let mut items = Vec::new();
            for record in &unit.records {
                let result = GenerationConfig::new(record, &unit.destination, &self.settings)
                    .and_then(|config| synthesize(&config));
                match result {
                    Ok(tokens) => items.push(tokens),
                    Err(err) => errors.extend(err.into_errors()),
                }
            }
            if items.len() == unit.records.len() {
                match render_unit(&unit.destination, &items) {
                    Ok(contents) => rendered.push((unit, contents)),
                    Err(err) => errors.push(err),
                }
            }
        }

        if let Some(err) = GenerateError::from_many(errors) {
            return Err(err);
        }

        let mut report = GenerationReport {
            units: Vec::new(),
            missing,
        };
        for (unit, contents) in rendered {
            let written = sink.write_unit(&unit.path, &contents)?;
            if written {
                log::info!(
                    "optgen: generated {} with {} record(s)",
                    unit.path.display(),
                    unit.records.len()
                );
            } else {
                log::debug!("optgen: {} is up to date", unit.path.display());
            }
            report.units.push(UnitReport {
                path: unit.path,
                destination: unit.destination,
                records: unit.records.into_iter().map(|record| record.name).collect(),
                written,
            });
        }

        Ok(report)
    }

    /// Collect requested records from descriptors and scanned sources,
    /// dropping duplicates of the same module and name.
    fn gather(&self, errors: &mut Vec<GenerateError>) -> Vec<RecordDescriptor> {
        let mut records = Vec::new();
        let wanted = |name: &str| self.record_names.is_empty() || self.record_names.iter().any(|n| n == name);

        for record in &self.descriptors {
            if wanted(&record.name) {
                records.push(record.clone());
            }
        }

        for path in &self.descriptor_files {
            match load_descriptors(path) {
                Ok(loaded) => records.extend(loaded.into_iter().filter(|record| wanted(&record.name))),
                Err(err) => errors.push(err),
            }
        }

        if !self.scan_paths.is_empty() && self.record_names.is_empty() {
            log::warn!("optgen: no type names requested, nothing to scan for");
        }

        for scan_path in &self.scan_paths {
            if !scan_path.exists() {
                errors.push(GenerateError::Io {
                    path: scan_path.clone(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file or directory"),
                });
                continue;
            }
            if self.record_names.is_empty() {
                continue;
            }

            for file in collect_files(scan_path) {
                let source = match SourceFile::read(&file, &self.src_root, &self.crate_name) {
                    Ok(source) => source,
                    Err(err) => {
                        errors.push(err);
                        continue;
                    }
                };

                for (name, result) in source.records(&self.record_names) {
                    match result {
                        Ok(record) => {
                            log::debug!("optgen: found {name} in {}", file.display());
                            records.push(record);
                        }
                        Err(err) => errors.extend(err.into_errors()),
                    }
                }
            }
        }

        let mut seen = HashSet::new();
        records.retain(|record| seen.insert((record.module.clone(), record.name.clone())));
        records
    }

    /// Assign records to output units.
    fn plan_units(&self, records: Vec<RecordDescriptor>, errors: &mut Vec<GenerateError>) -> Vec<Unit> {
        if let Some(output) = &self.output_file {
            let Some(first) = records.first() else {
                return Vec::new();
            };
            let destination = match &self.destination {
                Some(destination) => destination.clone(),
                None if output.starts_with(&self.src_root) => {
                    compute_module_path(output, &self.src_root, &self.crate_name)
                }
                None => first.module.clone(),
            };
            let unit = Unit {
                path: output.clone(),
                destination,
                records,
            };
            return reject_name_collisions(vec![unit], errors);
        }

        let mut units: Vec<Unit> = Vec::new();
        for record in records {
            let Some(source) = &record.source_file else {
                errors.push(GenerateError::NoDestination {
                    record: record.name.clone(),
                });
                continue;
            };
            let path = derive_output_path(source);
            match units.iter_mut().find(|unit| unit.path == path) {
                Some(unit) => unit.records.push(record),
                None => units.push(Unit {
                    path,
                    destination: self.destination.clone().unwrap_or_else(|| record.module.clone()),
                    records: vec![record],
                }),
            }
        }
        reject_name_collisions(units, errors)
    }
}

/// Drop units holding two records of the same name from different modules.
fn reject_name_collisions(units: Vec<Unit>, errors: &mut Vec<GenerateError>) -> Vec<Unit> {
    units
        .into_iter()
        .filter(|unit| {
            let mut clean = true;
            for (index, record) in unit.records.iter().enumerate() {
                if let Some(first) = unit.records[..index].iter().find(|other| other.name == record.name) {
                    errors.push(GenerateError::RecordNameCollision {
                        name: record.name.clone(),
                        path: unit.path.clone(),
                        first: first.module.clone(),
                        second: record.module.clone(),
                    });
                    clean = false;
                }
            }
            clean
        })
        .collect()
}

impl Default for OptionsGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn load_descriptors(path: &Path) -> GenerateResult<Vec<RecordDescriptor>> {
    let content = fs::read_to_string(path).map_err(|source| GenerateError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|err| GenerateError::Descriptors {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

/// Render one unit: header comments followed by the formatted items.
///
/// The header uses plain comments so the unit can be pulled in with
/// `include!`, which rejects inner attributes.
pub fn render_unit(destination: &str, items: &[TokenStream]) -> GenerateResult<String> {
    let tokens = quote!(#(#items)*);
    let syntax_tree: syn::File = syn::parse2(tokens).map_err(|err| GenerateError::Render {
        message: err.to_string(),
    })?;
    Ok(format!(
        "{GENERATED_HEADER}\n// Destination: {destination}\n\n{}",
        prettyplease::unparse(&syntax_tree)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{FieldDescriptor, TypeDescriptor};
    use crate::sink::MemorySink;

    fn descriptor(name: &str, source_file: Option<&str>) -> RecordDescriptor {
        RecordDescriptor {
            name: name.to_string(),
            module: "crate::models".to_string(),
            source_file: source_file.map(PathBuf::from),
            fields: vec![FieldDescriptor {
                name: "name".to_string(),
                ty: TypeDescriptor::scalar("String"),
                exported: true,
                anonymous: false,
                module: "crate::models".to_string(),
                tag: r#"debugmap = "visible""#.to_string(),
            }],
        }
    }

    #[test]
    fn test_render_unit_header() {
        let item = quote!(
            pub struct A;
        );
        let rendered = render_unit("crate::models", &[item]).unwrap();
        assert!(rendered.starts_with("// Code generated by optgen. DO NOT EDIT.\n// Destination: crate::models\n\n"));
        assert!(rendered.contains("pub struct A;"));
    }

    #[test]
    fn test_descriptors_group_by_source_file() {
        let mut sink = MemorySink::new();
        let report = OptionsGenerator::new()
            .descriptor(descriptor("Server", Some("src/models.rs")))
            .descriptor(descriptor("Client", Some("src/models.rs")))
            .descriptor(descriptor("Peer", Some("src/net.rs")))
            .run_with_sink(&mut sink)
            .unwrap();

        assert_eq!(report.record_count(), 3);
        assert_eq!(report.units.len(), 2);
        assert_eq!(report.units[0].records, ["Server", "Client"]);
        assert_eq!(report.units[0].destination, "crate::models");
        assert!(sink.get("src/models_opts.rs").is_some());
        assert!(sink.get("src/net_opts.rs").is_some());
    }

    #[test]
    fn test_explicit_output_infers_destination() {
        let mut sink = MemorySink::new();
        let report = OptionsGenerator::new()
            .descriptor(descriptor("Server", None))
            .output_file("src/options.rs")
            .run_with_sink(&mut sink)
            .unwrap();

        assert_eq!(report.units[0].destination, "crate::options");
        let unit = sink.get("src/options.rs").unwrap();
        assert!(unit.contains("impl crate::models::Server"));
        assert!(unit.contains("pub type ServerOption = Box<dyn Fn(&mut crate::models::Server)>;"));
    }

    #[test]
    fn test_same_name_from_two_modules_in_one_output() {
        let mut other = descriptor("Server", None);
        other.module = "crate::legacy".to_string();

        let mut sink = MemorySink::new();
        let err = OptionsGenerator::new()
            .descriptor(descriptor("Server", None))
            .descriptor(other)
            .output_file("src/options.rs")
            .run_with_sink(&mut sink)
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "types crate::models::Server and crate::legacy::Server are both generated into src/options.rs, \
             defining ServerOption twice"
        );
        assert!(sink.units.is_empty());
    }

    #[test]
    fn test_descriptor_without_source_needs_output() {
        let mut sink = MemorySink::new();
        let err = OptionsGenerator::new()
            .descriptor(descriptor("Server", None))
            .run_with_sink(&mut sink)
            .unwrap_err();
        assert!(matches!(err, GenerateError::NoDestination { .. }));
        assert!(sink.units.is_empty());
    }

    #[test]
    fn test_requested_names_filter_descriptors_and_report_missing() {
        let mut sink = MemorySink::new();
        let report = OptionsGenerator::new()
            .descriptor(descriptor("Server", Some("src/models.rs")))
            .descriptor(descriptor("Client", Some("src/models.rs")))
            .records(["Server", "Ghost"])
            .run_with_sink(&mut sink)
            .unwrap();

        assert_eq!(report.units[0].records, ["Server"]);
        assert_eq!(report.missing, ["Ghost"]);
    }

    #[test]
    fn test_duplicates_are_generated_once() {
        let mut sink = MemorySink::new();
        let report = OptionsGenerator::new()
            .descriptor(descriptor("Server", Some("src/models.rs")))
            .descriptor(descriptor("Server", Some("src/models.rs")))
            .run_with_sink(&mut sink)
            .unwrap();
        assert_eq!(report.record_count(), 1);
    }

    #[test]
    fn test_errors_prevent_any_output() {
        let mut broken = descriptor("Broken", Some("src/broken.rs"));
        broken.fields[0].tag.clear();

        let mut sink = MemorySink::new();
        let err = OptionsGenerator::new()
            .descriptor(descriptor("Server", Some("src/models.rs")))
            .descriptor(broken)
            .run_with_sink(&mut sink)
            .unwrap_err();

        assert!(matches!(err, GenerateError::MissingDebugTag { .. }));
        assert!(sink.units.is_empty());
    }
}
