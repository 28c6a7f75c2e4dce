use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use comfy_table::{Cell, Color as TableColor, Table};
use optgen_build::{GenerateError, GenerationReport, OptionsGenerator};

use crate::context::ProjectContext;
use crate::examples::ExampleGroup;
use crate::output::{OutputManager, TableDisplay};

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Sibling Output",
        commands: &[
            "optgen src/config.rs Server           # Writes src/config_opts.rs",
            "optgen src/ Server Endpoint           # One <file>_opts.rs per declaring file",
        ],
    },
    ExampleGroup {
        title: "Single Output File",
        commands: &[
            "optgen src/net --output src/options.rs Endpoint Peer",
            "optgen src/net --output gen/net.rs --package crate::net Endpoint",
        ],
    },
    ExampleGroup {
        title: "Sensitive Fields",
        commands: &[
            "optgen src/auth.rs Account --sensitive-field-name-matches secure,password",
        ],
    },
];

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Source file or directory to scan
    pub path: PathBuf,

    /// Names of the structs to generate options for
    #[arg(required = true, value_name = "TYPE")]
    pub types: Vec<String>,

    /// Write every struct into this file instead of <file>_opts.rs siblings
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Module path of the generated code, overriding the inferred one
    #[arg(long, value_name = "MODULE")]
    pub package: Option<String>,

    /// Comma separated substrings marking field names as sensitive [default: secure]
    #[arg(long, value_name = "LIST", env = "OPTGEN_SENSITIVE_FIELD_NAME_MATCHES")]
    pub sensitive_field_name_matches: Option<String>,

    /// Directory module paths are computed from [default: src]
    #[arg(long, value_name = "DIR")]
    pub src_root: Option<PathBuf>,

    /// JSON file with pre-resolved struct descriptors
    #[arg(long, value_name = "PATH")]
    pub descriptors: Option<PathBuf>,

    /// Path generated code uses for the optgen runtime crate [default: ::optgen]
    #[arg(long, value_name = "PATH")]
    pub runtime_path: Option<String>,
}

pub fn handle_generate(args: GenerateArgs, output: &OutputManager) -> Result<()> {
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    let ctx = ProjectContext::discover(&current_dir)?;

    let generator = build_generator(&args, &ctx, &current_dir);
    output.verbose(&format!(
        "Scanning {} for {}",
        args.path.display(),
        args.types.join(", ")
    ));

    let report = match generator.run() {
        Ok(report) => report,
        Err(err) => return Err(report_failure(err, output)),
    };

    for name in &report.missing {
        output.warning(&format!(
            "Type {name} was not found under {}",
            args.path.display()
        ));
    }

    for unit in &report.units {
        output.verbose(&format!("{} ({})", unit.path.display(), unit.destination));
        for record in &unit.records {
            output.bullet(record);
        }
    }

    output.display(&report)?;

    if !report.units.is_empty() && report.units.iter().all(|unit| !unit.written) {
        output.info("Generated files were already up to date");
    }
    if !output.is_json() {
        output.success(&format!(
            "Generated options for {} type(s)",
            report.record_count()
        ));
    }

    Ok(())
}

/// Apply CLI flags over `optgen.toml` settings. Relative paths are taken
/// from `current_dir`, so module paths compare against an absolute root.
fn build_generator(args: &GenerateArgs, ctx: &ProjectContext, current_dir: &Path) -> OptionsGenerator {
    let settings = ctx.settings();

    let src_root = match &args.src_root {
        Some(path) => current_dir.join(path),
        None => ctx.src_root(),
    };
    let sensitive = args
        .sensitive_field_name_matches
        .as_deref()
        .unwrap_or(&settings.sensitive_field_name_matches);
    let runtime_path = args
        .runtime_path
        .clone()
        .unwrap_or(settings.runtime_path.clone());

    let mut generator = optgen_build::generate_options()
        .scan_path(current_dir.join(&args.path))
        .src_root(src_root)
        .records(&args.types)
        .sensitive_field_name_matches(sensitive)
        .runtime_path(runtime_path);

    if let Some(path) = args.output.as_ref().filter(|path| !path.as_os_str().is_empty()) {
        generator = generator.output_file(current_dir.join(path));
    }
    if let Some(module) = args.package.as_ref().filter(|module| !module.is_empty()) {
        generator = generator.destination_module(module);
    }
    if let Some(path) = &args.descriptors {
        generator = generator.descriptors_file(current_dir.join(path));
    }

    generator
}

fn report_failure(err: GenerateError, output: &OutputManager) -> anyhow::Error {
    let errors = err.into_errors();
    for error in &errors {
        output.error(&error.to_string());
    }
    anyhow::anyhow!("generation failed with {} error(s)", errors.len())
}

impl TableDisplay for GenerationReport {
    fn to_table(&self, output: &OutputManager) -> Table {
        let mut table = output.create_table();
        output.add_table_header(&mut table, &["File", "Destination", "Types", "Status"]);

        for unit in &self.units {
            let status = if unit.written {
                Cell::new("written")
            } else {
                Cell::new("unchanged")
            };
            let status = if output.options.no_color {
                status
            } else if unit.written {
                status.fg(TableColor::Green)
            } else {
                status.fg(TableColor::DarkGrey)
            };

            table.add_row(vec![
                Cell::new(unit.path.display()),
                Cell::new(&unit.destination),
                Cell::new(unit.records.join(", ")),
                status,
            ]);
        }

        table
    }

    fn to_compact(&self) -> String {
        self.units
            .iter()
            .map(|unit| format!("{} {}", unit.path.display(), unit.records.join(",")))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
