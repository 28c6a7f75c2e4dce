//! Decomposition of field types into wrapper layers and a base reference.
//!
//! A type such as `Option<Box<Vec<crate::net::Peer>>>` resolves to a
//! [`TypeRef`] whose wrappers are the pointer, array and slice layers from the
//! outside in, ending in a base reference that knows whether it must be
//! module-qualified at the destination.

use crate::descriptor::{PointerKind, TypeDescriptor};
use crate::error::ResolveError;
use once_cell::sync::Lazy;
use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use regex::Regex;

/// Layers of nesting the resolver follows before giving up.
pub const MAX_TYPE_DEPTH: usize = 10;

/// Standard prelude types that are in scope in every module.
pub const PRELUDE_TYPES: &[&str] = &["Option", "Result", "Vec", "Box", "String"];

/// Matches `<module>::<name><<argument>>` in a canonical type name.
static GENERIC_TYPE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9_]+::[A-Za-z0-9_]+<(.*)>").expect("generic type pattern is valid"));

#[derive(Debug, Clone)]
pub enum Wrapper {
    Pointer(PointerKind),
    Slice,
    Array(TokenStream),
}

#[derive(Debug, Clone)]
pub enum BaseRef {
    Scalar(TokenStream),
    Named {
        path: TokenStream,
        qualified: bool,
        type_arg: Option<Box<TypeRef>>,
    },
    Map {
        path: TokenStream,
        key: Box<TypeRef>,
        value: Box<TypeRef>,
    },
    Anonymous(Vec<TypeRef>),
}

/// A resolved type reference, ready to be spliced into generated code.
#[derive(Debug, Clone)]
pub struct TypeRef {
    /// Outermost first.
    pub wrappers: Vec<Wrapper>,
    pub base: BaseRef,
}

impl TypeRef {
    /// The reference with its outermost wrapper removed, e.g. the element
    /// type of a `Vec`.
    pub fn element(&self) -> Option<TypeRef> {
        if self.wrappers.is_empty() {
            return None;
        }
        Some(TypeRef {
            wrappers: self.wrappers[1..].to_vec(),
            base: self.base.clone(),
        })
    }

    /// Key and value references of an unwrapped map.
    pub fn map_parts(&self) -> Option<(&TypeRef, &TypeRef)> {
        match &self.base {
            BaseRef::Map { key, value, .. } if self.wrappers.is_empty() => Some((key, value)),
            _ => None,
        }
    }

    fn render(&self) -> TokenStream {
        let mut tokens = self.base.render();
        for wrapper in self.wrappers.iter().rev() {
            tokens = match wrapper {
                Wrapper::Pointer(PointerKind::Box) => quote!(Box<#tokens>),
                Wrapper::Pointer(PointerKind::Rc) => quote!(::std::rc::Rc<#tokens>),
                Wrapper::Pointer(PointerKind::Arc) => quote!(::std::sync::Arc<#tokens>),
                Wrapper::Slice => quote!(Vec<#tokens>),
                Wrapper::Array(len) => quote!([#tokens; #len]),
            };
        }
        tokens
    }
}

impl BaseRef {
    fn render(&self) -> TokenStream {
        match self {
            Self::Scalar(tokens) => tokens.clone(),
            Self::Named {
                path,
                type_arg: Some(arg),
                ..
            } => quote!(#path<#arg>),
            Self::Named { path, .. } => path.clone(),
            Self::Map { path, key, value } => quote!(#path<#key, #value>),
            Self::Anonymous(elements) if elements.len() == 1 => {
                let element = &elements[0];
                quote!((#element,))
            }
            Self::Anonymous(elements) => quote!((#(#elements),*)),
        }
    }
}

impl ToTokens for TypeRef {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        tokens.extend(self.render());
    }
}

/// Resolve a type as seen from the `destination` module.
pub fn resolve(ty: &TypeDescriptor, destination: &str) -> Result<TypeRef, ResolveError> {
    resolve_at(ty, destination, 0)
}

fn resolve_at(ty: &TypeDescriptor, destination: &str, depth: usize) -> Result<TypeRef, ResolveError> {
    let mut wrappers = Vec::new();
    let mut current = ty;
    let mut depth = depth;

    // Every composite layer (wrapper, type argument, map entry, tuple
    // element) counts once; the terminal type does not.
    let descend = |depth: usize| {
        if depth >= MAX_TYPE_DEPTH {
            Err(ResolveError::TooDeep {
                type_name: ty.canonical_name(),
                limit: MAX_TYPE_DEPTH,
            })
        } else {
            Ok(depth + 1)
        }
    };

    loop {
        match current {
            TypeDescriptor::Pointer { pointer, inner } => {
                depth = descend(depth)?;
                wrappers.push(Wrapper::Pointer(*pointer));
                current = inner.as_ref();
            }
            TypeDescriptor::Slice { inner } => {
                depth = descend(depth)?;
                wrappers.push(Wrapper::Slice);
                current = inner.as_ref();
            }
            TypeDescriptor::Array { inner, len } => {
                let len: syn::Expr = syn::parse_str(len).map_err(|_| ResolveError::Unsupported {
                    type_name: ty.canonical_name(),
                    reason: format!("array length `{len}` is not an expression"),
                })?;
                depth = descend(depth)?;
                wrappers.push(Wrapper::Array(len.to_token_stream()));
                current = inner.as_ref();
            }
            TypeDescriptor::Scalar { name } => {
                let scalar: syn::Type =
                    syn::parse_str(name).map_err(|_| ResolveError::InvalidPath { path: name.clone() })?;
                return Ok(TypeRef {
                    wrappers,
                    base: BaseRef::Scalar(scalar.to_token_stream()),
                });
            }
            TypeDescriptor::Named { module, name, type_arg } => {
                let base = match type_arg {
                    Some(arg) => {
                        let (path, qualified) = named_path(module, name, destination)?;
                        BaseRef::Named {
                            path,
                            qualified,
                            type_arg: Some(Box::new(resolve_at(arg, destination, descend(depth)?)?)),
                        }
                    }
                    None => named_from_text(current, module, name, destination)?,
                };
                return Ok(TypeRef { wrappers, base });
            }
            TypeDescriptor::Map {
                module,
                name,
                key,
                value,
            } => {
                let (path, _) = named_path(module, name, destination)?;
                let depth = descend(depth)?;
                return Ok(TypeRef {
                    wrappers,
                    base: BaseRef::Map {
                        path,
                        key: Box::new(resolve_at(key, destination, depth)?),
                        value: Box::new(resolve_at(value, destination, depth)?),
                    },
                });
            }
            TypeDescriptor::Struct { elements } => {
                let depth = descend(depth)?;
                let elements = elements
                    .iter()
                    .map(|element| resolve_at(element, destination, depth))
                    .collect::<Result<Vec<_>, _>>()?;
                return Ok(TypeRef {
                    wrappers,
                    base: BaseRef::Anonymous(elements),
                });
            }
        }
    }
}

/// Path to a named type, qualified when it lives outside the destination.
fn named_path(module: &str, name: &str, destination: &str) -> Result<(TokenStream, bool), ResolveError> {
    let qualified = !module.is_empty() && module != destination;
    let text = if qualified {
        format!("{module}::{name}")
    } else {
        name.to_string()
    };
    let path: syn::Path = syn::parse_str(&text).map_err(|_| ResolveError::InvalidPath { path: text.clone() })?;
    Ok((path.to_token_stream(), qualified))
}

/// Named type without a structural argument. Descriptors resolved elsewhere
/// may spell the instantiation into the name itself (`Tagged<crate::net::Peer>`);
/// a single argument is recovered from the text in that case.
fn named_from_text(
    ty: &TypeDescriptor,
    module: &str,
    name: &str,
    destination: &str,
) -> Result<BaseRef, ResolveError> {
    let Some(open) = name.find('<') else {
        let (path, qualified) = named_path(module, name, destination)?;
        return Ok(BaseRef::Named {
            path,
            qualified,
            type_arg: None,
        });
    };

    let (path, qualified) = named_path(module, &name[..open], destination)?;
    let type_arg = match generic_from_type(&ty.canonical_name()) {
        Some((arg_module, arg_name)) => {
            let (arg_path, arg_qualified) = named_path(&arg_module, &arg_name, destination)?;
            Some(Box::new(TypeRef {
                wrappers: Vec::new(),
                base: BaseRef::Named {
                    path: arg_path,
                    qualified: arg_qualified,
                    type_arg: None,
                },
            }))
        }
        None => None,
    };

    Ok(BaseRef::Named {
        path,
        qualified,
        type_arg,
    })
}

/// Named types in `ty` that carry no module and are not prelude types.
///
/// These are written bare at any destination, so they only compile where the
/// name is already in scope.
pub fn unqualified_names(ty: &TypeDescriptor) -> Vec<String> {
    let mut names = Vec::new();
    collect_unqualified(ty, &mut names);
    names
}

fn collect_unqualified(ty: &TypeDescriptor, names: &mut Vec<String>) {
    match ty {
        TypeDescriptor::Pointer { inner, .. } | TypeDescriptor::Slice { inner } | TypeDescriptor::Array { inner, .. } => {
            collect_unqualified(inner, names)
        }
        TypeDescriptor::Scalar { .. } => {}
        TypeDescriptor::Named { module, name, type_arg } => {
            let base = name.split('<').next().unwrap_or(name.as_str());
            if module.is_empty() && !PRELUDE_TYPES.contains(&base) && !names.iter().any(|n| n == base) {
                names.push(base.to_string());
            }
            if let Some(arg) = type_arg {
                collect_unqualified(arg, names);
            }
        }
        TypeDescriptor::Map { key, value, .. } => {
            collect_unqualified(key, names);
            collect_unqualified(value, names);
        }
        TypeDescriptor::Struct { elements } => {
            for element in elements {
                collect_unqualified(element, names);
            }
        }
    }
}

/// Recover the single type argument of a generic instantiation from its
/// canonical name, as `(argument module, argument name)`.
///
/// Only one plain argument is recognized; anything else yields `None`.
pub fn generic_from_type(canonical: &str) -> Option<(String, String)> {
    let captures = GENERIC_TYPE_PATTERN.captures(canonical)?;
    let argument = captures.get(1)?.as_str().trim();
    if argument.is_empty() || argument.contains(['<', '>', ',']) {
        return None;
    }

    match argument.rfind("::") {
        Some(idx) => Some((argument[..idx].to_string(), argument[idx + 2..].to_string())),
        None => Some((String::new(), argument.to_string())),
    }
}
