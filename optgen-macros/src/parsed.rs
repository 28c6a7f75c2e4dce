use proc_macro2::TokenStream as TokenStream2;
use quote::{ToTokens, quote};
use syn::spanned::Spanned;
use syn::{Data, DeriveInput, Error, Expr, ExprLit, Ident, Index, Lit, LitStr, Member, Result};

const DEBUG_MAP_VALUES: &[&str] = &["visible", "visible-format", "hidden", "sensitive"];

pub(crate) struct ParsedRecord {
    ident: Ident,
    generics: syn::Generics,
    defaults: Vec<FieldDefault>,
}

struct FieldDefault {
    member: Member,
    value: Expr,
}

impl ParsedRecord {
    pub(crate) fn from_input(input: &DeriveInput) -> Result<Self> {
        let fields = match &input.data {
            Data::Struct(data) => &data.fields,
            Data::Enum(data) => {
                return Err(Error::new(
                    data.enum_token.span(),
                    "Optgen can only be derived for structs",
                ));
            }
            Data::Union(data) => {
                return Err(Error::new(
                    data.union_token.span(),
                    "Optgen can only be derived for structs",
                ));
            }
        };

        if let Some(attr) = input.attrs.iter().find(|attr| attr.path().is_ident("optgen")) {
            return Err(Error::new_spanned(attr, "#[optgen(...)] belongs on fields, not on the struct"));
        }

        let mut defaults = Vec::new();
        let mut errors: Option<Error> = None;

        for (index, field) in fields.iter().enumerate() {
            let member = match &field.ident {
                Some(ident) => Member::Named(ident.clone()),
                None => Member::Unnamed(Index::from(index)),
            };

            match parse_field_attrs(field) {
                Ok(Some(value)) => defaults.push(FieldDefault { member, value }),
                Ok(None) => {}
                Err(err) => match &mut errors {
                    Some(existing) => existing.combine(err),
                    None => errors = Some(err),
                },
            }
        }

        if let Some(err) = errors {
            return Err(err);
        }

        Ok(Self {
            ident: input.ident.clone(),
            generics: input.generics.clone(),
            defaults,
        })
    }

    pub(crate) fn emit(&self) -> TokenStream2 {
        let ident = &self.ident;
        let (impl_generics, ty_generics, where_clause) = self.generics.split_for_impl();

        let assignments = self.defaults.iter().map(|FieldDefault { member, value }| {
            let value = match value {
                Expr::Lit(ExprLit { lit: Lit::Str(lit), .. }) => {
                    quote!(::core::convert::Into::into(#lit))
                }
                other => other.to_token_stream(),
            };
            quote! {
                self.#member = #value;
            }
        });

        quote! {
            impl #impl_generics ::optgen::Defaults for #ident #ty_generics #where_clause {
                fn set_defaults(&mut self) {
                    #(#assignments)*
                }
            }
        }
    }
}

/// Validate a field's `#[optgen(...)]` attributes, returning its default.
fn parse_field_attrs(field: &syn::Field) -> Result<Option<Expr>> {
    let mut debug_map: Option<LitStr> = None;
    let mut default: Option<Expr> = None;

    for attr in field.attrs.iter().filter(|attr| attr.path().is_ident("optgen")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("debugmap") {
                let value: LitStr = meta.value()?.parse()?;
                if debug_map.is_some() {
                    return Err(meta.error("duplicate debugmap key"));
                }
                if !DEBUG_MAP_VALUES.contains(&value.value().as_str()) {
                    return Err(Error::new(
                        value.span(),
                        format!(
                            "unknown debugmap value '{}', expected one of: {}",
                            value.value(),
                            DEBUG_MAP_VALUES.join(", ")
                        ),
                    ));
                }
                debug_map = Some(value);
            } else if meta.path.is_ident("default") {
                let value: Expr = meta.value()?.parse()?;
                if default.is_some() {
                    return Err(meta.error("duplicate default key"));
                }
                default = Some(value);
            } else {
                return Err(meta.error("unknown optgen key, expected `debugmap` or `default`"));
            }
            Ok(())
        })?;
    }

    Ok(default)
}
