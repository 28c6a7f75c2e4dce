//! Build-time generator for functional options.
//!
//! For each requested struct this crate generates a companion API: an
//! `<Type>Option` alias for boxed mutators, `with_<field>`/`set_<field>`
//! option functions, constructors that apply options (optionally after
//! populating declared defaults), a snapshot converter, apply helpers and a
//! `debug_map` introspection method.
//!
//! # Example
//!
//! In your `build.rs`:
//!
//! ```ignore
//! fn main() {
//!     let out_dir = std::env::var("OUT_DIR").unwrap();
//!     optgen_build::generate_options()
//!         .scan_path("src/models.rs")
//!         .record("Server")
//!         .output_file(format!("{out_dir}/models_opts.rs"))
//!         .destination_module("crate::models")
//!         .run()
//!         .expect("Failed to generate options");
//!
//!     println!("cargo:rerun-if-changed=src/models.rs");
//! }
//! ```
//!
//! Then pull the unit into the module that declares `Server`:
//!
//! ```ignore
//! include!(concat!(env!("OUT_DIR"), "/models_opts.rs"));
//! ```

pub mod classify;
pub mod descriptor;
pub mod error;
mod generator;
pub mod naming;
pub mod resolver;
pub mod scanner;
mod settings;
pub mod sink;
pub mod synth;
pub mod tags;

pub use descriptor::{FieldDescriptor, PointerKind, RecordDescriptor, TypeDescriptor};
pub use error::{GenerateError, GenerateResult, ResolveError};
pub use generator::{GENERATED_HEADER, GenerationReport, OptionsGenerator, UnitReport, render_unit};
pub use settings::{DEFAULT_RUNTIME_PATH, DEFAULT_SENSITIVE_NAMES, GeneratorSettings, parse_name_matches};
pub use sink::{FileSink, MemorySink, OutputSink};

/// Create a new options generator with default settings.
///
/// # Example
///
/// ```ignore
/// optgen_build::generate_options()
///     .scan_path("src/")
///     .records(["Server", "Endpoint"])
///     .run()
///     .expect("Failed to generate options");
/// ```
pub fn generate_options() -> OptionsGenerator {
    OptionsGenerator::new()
}
