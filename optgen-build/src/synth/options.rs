//! Per-field option functions.

use super::GenerationConfig;
use crate::classify::{Strategy, classify};
use crate::descriptor::FieldDescriptor;
use crate::error::{GenerateError, GenerateResult, ResolveError};
use crate::naming;
use crate::resolver::TypeRef;
use proc_macro2::{Ident, TokenStream};
use quote::quote;

/// A generated associated function and its name.
#[derive(Debug, Clone)]
pub struct OptionFn {
    pub name: String,
    pub tokens: TokenStream,
}

/// Option functions for one eligible field: `with_<f>` and, for sequences
/// and maps, `set_<f>`.
pub fn field_options(config: &GenerationConfig<'_>, field: &FieldDescriptor) -> GenerateResult<Vec<OptionFn>> {
    let ty = config.resolve(field)?;
    let strategy = classify(&field.ty);
    log::debug!("{}.{}: {} options", config.record.name, field.name, strategy.as_str());

    let parts = FieldParts {
        config,
        field,
        field_ident: naming::ident(&field.name, "field name")?,
        param: naming::ident(
            &naming::param_name(&field.name, &config.receiver.to_string()),
            "parameter name",
        )?,
    };

    match strategy {
        Strategy::Standard => Ok(vec![parts.replace("with", &ty)?]),
        Strategy::Sequence => {
            let element = ty
                .element()
                .ok_or_else(|| parts.unsupported("sequence field has no element type"))?;
            Ok(vec![parts.append(&element)?, parts.replace("set", &ty)?])
        }
        Strategy::Map => {
            let (key, value) = ty
                .map_parts()
                .ok_or_else(|| parts.unsupported("map field has no key and value types"))?;
            Ok(vec![parts.insert(key, value)?, parts.replace("set", &ty)?])
        }
    }
}

struct FieldParts<'c, 'a> {
    config: &'c GenerationConfig<'a>,
    field: &'c FieldDescriptor,
    field_ident: Ident,
    param: Ident,
}

impl FieldParts<'_, '_> {
    fn function(&self, prefix: &str) -> GenerateResult<(String, Ident)> {
        let name = format!("{prefix}_{}", self.field.plain_name());
        let ident = naming::ident(&name, "option function name")?;
        Ok((name, ident))
    }

    /// `<prefix>_f(f: T)` assigning the whole field.
    fn replace(&self, prefix: &str, ty: &TypeRef) -> GenerateResult<OptionFn> {
        let (name, fn_ident) = self.function(prefix)?;
        let Self {
            config,
            field_ident,
            param,
            ..
        } = self;
        let option_type = &config.option_type;
        let receiver = &config.receiver;
        let doc = format!(" Option setting `{}`.", self.field.plain_name());

        Ok(OptionFn {
            name,
            tokens: quote! {
                #[doc = #doc]
                pub fn #fn_ident(#param: #ty) -> #option_type {
                    Box::new(move |#receiver: &mut Self| {
                        #receiver.#field_ident = #param.clone();
                    })
                }
            },
        })
    }

    /// `with_f(f: E)` pushing one element.
    fn append(&self, element: &TypeRef) -> GenerateResult<OptionFn> {
        let (name, fn_ident) = self.function("with")?;
        let Self {
            config,
            field_ident,
            param,
            ..
        } = self;
        let option_type = &config.option_type;
        let receiver = &config.receiver;
        let doc = format!(" Option appending one element to `{}`.", self.field.plain_name());

        Ok(OptionFn {
            name,
            tokens: quote! {
                #[doc = #doc]
                pub fn #fn_ident(#param: #element) -> #option_type {
                    Box::new(move |#receiver: &mut Self| {
                        #receiver.#field_ident.push(#param.clone());
                    })
                }
            },
        })
    }

    /// `with_f(key: K, value: V)` inserting one entry.
    fn insert(&self, key: &TypeRef, value: &TypeRef) -> GenerateResult<OptionFn> {
        let (name, fn_ident) = self.function("with")?;
        let Self { config, field_ident, .. } = self;
        let option_type = &config.option_type;
        let receiver = &config.receiver;
        let doc = format!(
            " Option inserting one entry into `{}`, replacing any value under the same key.",
            self.field.plain_name()
        );

        Ok(OptionFn {
            name,
            tokens: quote! {
                #[doc = #doc]
                pub fn #fn_ident(key: #key, value: #value) -> #option_type {
                    Box::new(move |#receiver: &mut Self| {
                        #receiver.#field_ident.insert(key.clone(), value.clone());
                    })
                }
            },
        })
    }

    fn unsupported(&self, reason: &str) -> GenerateError {
        GenerateError::resolve(
            &self.config.record.name,
            &self.field.name,
            ResolveError::Unsupported {
                type_name: self.field.ty.canonical_name(),
                reason: reason.to_string(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{PointerKind, TypeDescriptor};
    use crate::settings::GeneratorSettings;
    use crate::synth::test_support::{compact, field, record};

    fn generate(field: FieldDescriptor, destination: &str) -> Vec<(String, String)> {
        let settings = GeneratorSettings::default();
        let record = record("Server", vec![field.clone()]);
        let config = GenerationConfig::new(&record, destination, &settings).unwrap();
        field_options(&config, &field)
            .unwrap()
            .into_iter()
            .map(|f| (f.name, compact(&f.tokens)))
            .collect()
    }

    #[test]
    fn test_standard_field() {
        let fns = generate(field("host", TypeDescriptor::scalar("String"), ""), "crate::models");
        assert_eq!(fns.len(), 1);
        assert_eq!(fns[0].0, "with_host");
        assert!(
            fns[0]
                .1
                .contains("pubfnwith_host(host:String)->ServerOption{Box::new(move|s:&mutSelf|{s.host=host.clone();})}")
        );
    }

    #[test]
    fn test_sequence_field() {
        let ty = TypeDescriptor::slice(TypeDescriptor::named("crate::models", "Upstream"));
        let fns = generate(field("peers", ty, ""), "crate::options");
        let names: Vec<_> = fns.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["with_peers", "set_peers"]);
        assert!(fns[0].1.contains("pubfnwith_peers(peers:crate::models::Upstream)"));
        assert!(fns[0].1.contains("s.peers.push(peers.clone());"));
        assert!(fns[1].1.contains("pubfnset_peers(peers:Vec<crate::models::Upstream>)"));
        assert!(fns[1].1.contains("s.peers=peers.clone();"));
    }

    #[test]
    fn test_sequence_element_keeps_type_argument() {
        let ty = TypeDescriptor::slice(TypeDescriptor::generic(
            "crate::net",
            "Tagged",
            TypeDescriptor::named("crate::net", "Peer"),
        ));
        let fns = generate(field("history", ty, ""), "crate::options");
        assert!(fns[0].1.contains("pubfnwith_history(history:crate::net::Tagged<crate::net::Peer>)"));
    }

    #[test]
    fn test_map_field() {
        let ty = TypeDescriptor::map(
            "std::collections",
            "HashMap",
            TypeDescriptor::scalar("String"),
            TypeDescriptor::scalar("u32"),
        );
        let fns = generate(field("labels", ty, ""), "crate::models");
        let names: Vec<_> = fns.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["with_labels", "set_labels"]);
        assert!(fns[0].1.contains("pubfnwith_labels(key:String,value:u32)"));
        assert!(fns[0].1.contains("s.labels.insert(key.clone(),value.clone());"));
        assert!(
            fns[1]
                .1
                .contains("pubfnset_labels(labels:std::collections::HashMap<String,u32>)")
        );
    }

    #[test]
    fn test_pointer_and_array_are_standard() {
        let ty = TypeDescriptor::generic(
            "",
            "Option",
            TypeDescriptor::pointer(PointerKind::Box, TypeDescriptor::named("crate::models", "Upstream")),
        );
        let fns = generate(field("upstream", ty, ""), "crate::models");
        assert_eq!(fns.len(), 1);
        assert!(fns[0].1.contains("pubfnwith_upstream(upstream:Option<Box<Upstream>>)"));

        let ty = TypeDescriptor::array(TypeDescriptor::scalar("u8"), "4");
        let fns = generate(field("weights", ty, ""), "crate::models");
        assert_eq!(fns.len(), 1);
        assert!(fns[0].1.contains("pubfnwith_weights(weights:[u8;4])"));
    }

    #[test]
    fn test_parameter_names_avoid_keywords_and_receiver() {
        let fns = generate(field("r#type", TypeDescriptor::scalar("String"), ""), "crate::models");
        assert_eq!(fns[0].0, "with_type");
        assert!(fns[0].1.contains("pubfnwith_type(type_:String)"));
        assert!(fns[0].1.contains("s.r#type=type_.clone();"));

        let fns = generate(field("s", TypeDescriptor::scalar("u8"), ""), "crate::models");
        assert!(fns[0].1.contains("pubfnwith_s(s_:u8)"));
        assert!(fns[0].1.contains("s.s=s_.clone();"));
    }

    #[test]
    fn test_depth_error_names_field() {
        let ty = (0..12).fold(TypeDescriptor::scalar("u8"), |inner, _| {
            TypeDescriptor::pointer(PointerKind::Box, inner)
        });
        let settings = GeneratorSettings::default();
        let field = field("deep", ty, "");
        let record = record("Server", vec![field.clone()]);
        let config = GenerationConfig::new(&record, "crate::models", &settings).unwrap();

        let err = field_options(&config, &field).unwrap_err();
        assert!(matches!(
            err,
            GenerateError::Resolve {
                source: ResolveError::TooDeep { .. },
                ..
            }
        ));
        assert!(err.to_string().starts_with("field deep in type Server:"));
    }
}
