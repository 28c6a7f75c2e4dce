//! Record-level items: option type, constructors, snapshot converter and the
//! apply helpers.

use super::GenerationConfig;
use crate::descriptor::FieldDescriptor;
use crate::error::GenerateResult;
use crate::naming;
use proc_macro2::TokenStream;
use quote::quote;

/// Associated functions generated for every record.
pub const RESERVED_NAMES: &[&str] = &[
    "new_with_options",
    "new_with_options_and_defaults",
    "to_option",
    "with_options",
    "debug_map",
];

/// `pub type <Type>Option = Box<dyn Fn(&mut <Type>)>;`
pub fn option_type(config: &GenerationConfig<'_>) -> TokenStream {
    let option_type = &config.option_type;
    let record_ref = &config.record_ref;
    let doc = format!(" Functional option mutating a [`{}`].", config.record_ident);

    quote! {
        #[doc = #doc]
        pub type #option_type = Box<dyn Fn(&mut #record_ref)>;
    }
}

/// `new_with_options` and `new_with_options_and_defaults`.
pub fn constructors(config: &GenerationConfig<'_>) -> TokenStream {
    let option_type = &config.option_type;
    let receiver = &config.receiver;
    let runtime = &config.runtime;

    quote! {
        /// Build a default value and apply `opts` in order.
        pub fn new_with_options(opts: impl IntoIterator<Item = #option_type>) -> Self {
            let mut #receiver = <Self as ::core::default::Default>::default();
            for option in opts {
                option(&mut #receiver);
            }
            #receiver
        }

        /// Build a default value, populate its declared defaults, then apply
        /// `opts` in order. Options override defaults.
        pub fn new_with_options_and_defaults(opts: impl IntoIterator<Item = #option_type>) -> Self {
            let mut #receiver = <Self as ::core::default::Default>::default();
            #runtime::Defaults::set_defaults(&mut #receiver);
            for option in opts {
                option(&mut #receiver);
            }
            #receiver
        }
    }
}

/// `to_option`, capturing the current value of every eligible field.
pub fn to_option(config: &GenerationConfig<'_>, fields: &[&FieldDescriptor]) -> GenerateResult<TokenStream> {
    let option_type = &config.option_type;
    let idents = fields
        .iter()
        .map(|field| naming::ident(&field.name, "field name"))
        .collect::<GenerateResult<Vec<_>>>()?;

    if idents.is_empty() {
        return Ok(quote! {
            /// Option reproducing this value. It has no settable fields.
            pub fn to_option(&self) -> #option_type {
                Box::new(|_: &mut Self| {})
            }
        });
    }

    let indices = (0..idents.len()).map(syn::Index::from);
    Ok(quote! {
        /// Option copying the current field values onto another value.
        pub fn to_option(&self) -> #option_type {
            let snapshot = (#(self.#idents.clone(),)*);
            Box::new(move |to: &mut Self| {
                #(to.#idents = snapshot.#indices.clone();)*
            })
        }
    })
}

/// `with_options(&mut self, opts)`.
pub fn with_options(config: &GenerationConfig<'_>) -> TokenStream {
    let option_type = &config.option_type;

    quote! {
        /// Apply `opts` in order and return `self`.
        pub fn with_options(&mut self, opts: impl IntoIterator<Item = #option_type>) -> &mut Self {
            for option in opts {
                option(&mut *self);
            }
            self
        }
    }
}

/// The free `<type>_with_options(record, opts)` function.
pub fn apply_fn(config: &GenerationConfig<'_>) -> GenerateResult<TokenStream> {
    let fn_ident = naming::ident(
        &format!("{}_with_options", naming::to_snake_case(&config.record.name)),
        "apply function name",
    )?;
    let option_type = &config.option_type;
    let record_ref = &config.record_ref;
    let receiver = &config.receiver;
    let doc = format!(" Apply `opts` to a [`{}`] in order and return it.", config.record_ident);

    Ok(quote! {
        #[doc = #doc]
        pub fn #fn_ident(
            #receiver: &mut #record_ref,
            opts: impl IntoIterator<Item = #option_type>,
        ) -> &mut #record_ref {
            for option in opts {
                option(&mut *#receiver);
            }
            #receiver
        }
    })
}
