//! Token synthesis for a single record.
//!
//! [`synthesize`] produces, for one record, the option type alias, an
//! inherent `impl` block holding the constructors, snapshot converter, apply
//! method, `debug_map` and per-field option functions, and the free apply
//! function. Every problem found along the way is collected, so one call
//! reports all of a record's errors at once.

pub mod debug_map;
pub mod options;
pub mod record;

use crate::classify::eligible_fields;
use crate::descriptor::{FieldDescriptor, RecordDescriptor};
use crate::error::{GenerateError, GenerateResult};
use crate::naming;
use crate::resolver::{self, TypeRef};
use crate::settings::GeneratorSettings;
use proc_macro2::{Ident, TokenStream};
use quote::quote;

/// Per-record context shared by the synthesizers.
#[derive(Debug)]
pub struct GenerationConfig<'a> {
    pub record: &'a RecordDescriptor,
    /// Module the generated code will live in.
    pub destination: &'a str,
    pub settings: &'a GeneratorSettings,
    /// Lowercase first letter of the type name.
    pub receiver: Ident,
    pub record_ident: Ident,
    /// `<Type>Option`.
    pub option_type: Ident,
    /// The record type as written at the destination.
    pub record_ref: TokenStream,
    /// Destination differs from the declaring module.
    pub qualified: bool,
    /// Runtime support crate path.
    pub runtime: syn::Path,
}

impl<'a> GenerationConfig<'a> {
    pub fn new(
        record: &'a RecordDescriptor,
        destination: &'a str,
        settings: &'a GeneratorSettings,
    ) -> GenerateResult<Self> {
        let record_ident = naming::ident(&record.name, "type name")?;
        let receiver = naming::ident(&naming::receiver_name(&record.name), "receiver name")?;
        let option_type = naming::ident(&format!("{}Option", record.name), "option type name")?;

        let qualified = !record.module.is_empty() && record.module != destination;
        let record_ref = if qualified {
            let module: syn::Path = syn::parse_str(&record.module).map_err(|_| GenerateError::InvalidName {
                name: record.module.clone(),
                what: "module path",
            })?;
            quote!(#module::#record_ident)
        } else {
            quote!(#record_ident)
        };

        Ok(Self {
            record,
            destination,
            settings,
            receiver,
            record_ident,
            option_type,
            record_ref,
            qualified,
            runtime: settings.runtime_path()?,
        })
    }

    /// Resolve a field's type as seen from the destination.
    pub fn resolve(&self, field: &FieldDescriptor) -> GenerateResult<TypeRef> {
        let origin = if field.module.is_empty() {
            &self.record.module
        } else {
            &field.module
        };
        if !origin.is_empty() && origin != self.destination {
            for name in resolver::unqualified_names(&field.ty) {
                log::warn!(
                    "optgen: {}.{}: module of type {name} is unknown, it is written unqualified in {}",
                    self.record.name,
                    field.name,
                    self.destination
                );
            }
        }
        resolver::resolve(&field.ty, self.destination)
            .map_err(|source| GenerateError::resolve(&self.record.name, &field.name, source))
    }
}

/// Generate every item for one record.
pub fn synthesize(config: &GenerationConfig<'_>) -> GenerateResult<TokenStream> {
    let fields: Vec<&FieldDescriptor> = eligible_fields(config.record, config.destination).collect();
    log::debug!(
        "synthesizing {} ({} of {} fields eligible) into {}",
        config.record.name,
        fields.len(),
        config.record.fields.len(),
        config.destination
    );

    let mut errors = Vec::new();
    let mut field_fns = Vec::new();

    // Field names are unique within a struct, so only the record-level
    // helpers can clash with a generated option function.
    for field in &fields {
        match options::field_options(config, field) {
            Ok(functions) => {
                for function in functions {
                    if record::RESERVED_NAMES.contains(&function.name.as_str()) {
                        errors.push(GenerateError::NameCollision {
                            record: config.record.name.clone(),
                            field: field.name.clone(),
                            function: function.name,
                        });
                        continue;
                    }
                    field_fns.push(function);
                }
            }
            Err(err) => errors.extend(err.into_errors()),
        }
    }

    let to_option = record::to_option(config, &fields);
    let debug_map = debug_map::debug_map(config);
    let apply = record::apply_fn(config);

    match (to_option, debug_map, apply) {
        (Ok(to_option), Ok(debug_map), Ok(apply)) if errors.is_empty() => {
            let option_type = record::option_type(config);
            let constructors = record::constructors(config);
            let with_options = record::with_options(config);
            let record_ref = &config.record_ref;
            let field_fns = field_fns.iter().map(|function| &function.tokens);

            Ok(quote! {
                #option_type

                impl #record_ref {
                    #constructors
                    #to_option
                    #with_options
                    #debug_map
                    #(#field_fns)*
                }

                #apply
            })
        }
        (to_option, debug_map, apply) => {
            for err in [to_option.err(), debug_map.err(), apply.err()].into_iter().flatten() {
                errors.extend(err.into_errors());
            }
            Err(GenerateError::Multiple(errors))
        }
    }
}
