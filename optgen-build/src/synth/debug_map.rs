//! `debug_map` synthesis and debug tag validation.

use super::GenerationConfig;
use crate::descriptor::FieldDescriptor;
use crate::error::{GenerateError, GenerateResult};
use crate::naming;
use crate::tags::{DEBUG_MAP_TAG, DebugTag, FieldTags, TagValue};
use proc_macro2::TokenStream;
use quote::quote;

/// Generate `debug_map(&self)`.
///
/// Every exported, non-anonymous field needs a valid `debugmap` tag, and a
/// field whose name matches a sensitive substring must be tagged
/// `sensitive`. All violations in the record are reported together.
pub fn debug_map(config: &GenerationConfig<'_>) -> GenerateResult<TokenStream> {
    let runtime = &config.runtime;
    let mut errors = Vec::new();
    let mut entries = Vec::new();

    for field in config.record.fields.iter().filter(|f| f.exported && !f.anonymous) {
        let tag = match debug_tag(config, field) {
            Ok(tag) => tag,
            Err(err) => {
                errors.push(err);
                continue;
            }
        };

        if config.settings.is_sensitive(field.plain_name()) && tag != DebugTag::Sensitive {
            errors.push(GenerateError::SensitiveFieldNotMarked {
                record: config.record.name.clone(),
                field: field.name.clone(),
            });
            continue;
        }

        let field_ident = match naming::ident(&field.name, "field name") {
            Ok(ident) => ident,
            Err(err) => {
                errors.push(err);
                continue;
            }
        };
        let key = field.plain_name();

        let value = match tag {
            DebugTag::Hidden => continue,
            DebugTag::Visible => quote!(#runtime::debug_value(&self.#field_ident, false)),
            DebugTag::VisibleFormatted => quote!(#runtime::debug_value(&self.#field_ident, true)),
            DebugTag::Sensitive => quote!(#runtime::sensitive_debug_value(&self.#field_ident)),
        };
        entries.push(quote! {
            debug_map.insert(#key.to_string(), #value);
        });
    }

    if let Some(err) = GenerateError::from_many(errors) {
        return Err(err);
    }

    let body = if entries.is_empty() {
        quote!(#runtime::DebugMap::new())
    } else {
        quote! {
            let mut debug_map = #runtime::DebugMap::new();
            #(#entries)*
            debug_map
        }
    };

    Ok(quote! {
        /// Field names mapped to printable values. Hidden fields are left
        /// out and sensitive ones are masked.
        pub fn debug_map(&self) -> #runtime::DebugMap {
            #body
        }
    })
}

fn debug_tag(config: &GenerationConfig<'_>, field: &FieldDescriptor) -> GenerateResult<DebugTag> {
    let record = &config.record.name;
    let tags = FieldTags::parse(&field.tag).map_err(|message| GenerateError::MalformedTag {
        record: record.clone(),
        field: field.name.clone(),
        message,
    })?;

    let value = match tags.get(DEBUG_MAP_TAG) {
        None => {
            return Err(GenerateError::MissingDebugTag {
                record: record.clone(),
                field: field.name.clone(),
            });
        }
        Some(TagValue::Str(value)) => value.clone(),
        Some(TagValue::Flag) => String::new(),
        Some(TagValue::Other(value)) => value.clone(),
    };

    DebugTag::parse(&value).ok_or_else(|| GenerateError::UnknownDebugTag {
        record: record.clone(),
        field: field.name.clone(),
        value,
    })
}
