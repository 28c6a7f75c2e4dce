//! Source file scanner producing record descriptors.
//!
//! Files are parsed with `syn`. Named field types are resolved to the module
//! that declares them using the `use` items, child modules and type
//! declarations visible in the enclosing module, so generated code can refer
//! to them from another module.

use crate::descriptor::{FieldDescriptor, PointerKind, RecordDescriptor, TypeDescriptor};
use crate::error::{GenerateError, GenerateResult, ResolveError};
use crate::resolver::PRELUDE_TYPES;
use crate::sink::OUTPUT_SUFFIX;
use quote::ToTokens;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use syn::punctuated::Punctuated;
use syn::{Attribute, Fields, GenericArgument, Item, Meta, PathArguments, Type, UseTree};
use walkdir::WalkDir;

const SCALARS: &[&str] = &[
    "bool", "char", "str", "String", "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32", "u64", "u128",
    "usize", "f32", "f64",
];

/// Module used for maps whose path could not be resolved.
const DEFAULT_MAP_MODULE: &str = "std::collections";

/// Rust files under `path`, sorted by name. A file path is returned as is.
///
/// Build output and previously generated `*_opts.rs` files are skipped.
pub fn collect_files(path: &Path) -> Vec<PathBuf> {
    if path.is_file() {
        return vec![path.to_path_buf()];
    }

    WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_type().is_file()
                && e.path().extension().is_some_and(|ext| ext == "rs")
                && !e.path().to_string_lossy().contains("/target/")
                && !e
                    .path()
                    .file_stem()
                    .is_some_and(|stem| stem.to_string_lossy().ends_with(OUTPUT_SUFFIX))
        })
        .map(|e| e.into_path())
        .collect()
}

/// Compute the module path from a file path.
/// e.g., "src/config/server.rs" -> "crate::config::server"
///
/// Files outside `base_path` are treated as direct children of the crate root.
pub fn compute_module_path(file_path: &Path, base_path: &Path, crate_name: &str) -> String {
    let relative = match file_path.strip_prefix(base_path) {
        Ok(relative) => relative.to_path_buf(),
        Err(_) => file_path.file_name().map(PathBuf::from).unwrap_or_default(),
    };

    let without_extension = relative.with_extension("");
    let mut parts: Vec<&str> = without_extension
        .components()
        .filter_map(|c| c.as_os_str().to_str())
        .collect();

    if let Some(last) = parts.last()
        && matches!(*last, "mod" | "lib" | "main")
    {
        parts.pop();
    }

    if parts.is_empty() {
        crate_name.to_string()
    } else {
        format!("{}::{}", crate_name, parts.join("::"))
    }
}

/// A parsed source file.
pub struct SourceFile {
    pub path: PathBuf,
    pub module: String,
    syntax: syn::File,
}

impl SourceFile {
    /// Read and parse `path`, deriving its module from its place under
    /// `src_root`.
    pub fn read(path: &Path, src_root: &Path, crate_name: &str) -> GenerateResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| GenerateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, compute_module_path(path, src_root, crate_name), &content)
    }

    pub fn parse(path: &Path, module: String, content: &str) -> GenerateResult<Self> {
        let syntax = syn::parse_file(content).map_err(|err| GenerateError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            module,
            syntax,
        })
    }

    /// Requested records declared in this file, including inline modules, in
    /// declaration order. Each entry pairs the requested name with its
    /// descriptor or the reason it cannot be generated for.
    pub fn records(&self, names: &[String]) -> Vec<(String, GenerateResult<RecordDescriptor>)> {
        let names: HashSet<&str> = names.iter().map(String::as_str).collect();
        let mut found = Vec::new();
        self.collect(&self.syntax.items, &self.module, &names, &mut found);
        found
    }

    fn collect(
        &self,
        items: &[Item],
        module: &str,
        names: &HashSet<&str>,
        found: &mut Vec<(String, GenerateResult<RecordDescriptor>)>,
    ) {
        let scope = Scope::new(module, items);

        for item in items {
            let ident = match item {
                Item::Mod(inner) => {
                    if let Some((_, content)) = &inner.content {
                        let child = format!("{module}::{}", inner.ident);
                        self.collect(content, &child, names, found);
                    }
                    continue;
                }
                Item::Struct(item) => &item.ident,
                Item::Enum(item) => &item.ident,
                Item::Union(item) => &item.ident,
                Item::Type(item) => &item.ident,
                Item::Trait(item) => &item.ident,
                _ => continue,
            };

            let name = ident.to_string();
            if !names.contains(name.as_str()) {
                continue;
            }

            let result = match item {
                Item::Struct(item) => self.describe_struct(item, &scope),
                Item::Enum(_) => Err(not_a_struct(&name, "enum")),
                Item::Union(_) => Err(not_a_struct(&name, "union")),
                Item::Type(_) => Err(not_a_struct(&name, "type alias")),
                _ => Err(not_a_struct(&name, "trait")),
            };
            found.push((name, result));
        }
    }

    fn describe_struct(&self, item: &syn::ItemStruct, scope: &Scope) -> GenerateResult<RecordDescriptor> {
        let name = item.ident.to_string();
        if !item.generics.params.is_empty() {
            return Err(GenerateError::GenericRecord { name });
        }

        let mut fields = Vec::new();
        let mut errors = Vec::new();

        let positional = matches!(item.fields, Fields::Unnamed(_));
        for (index, field) in item.fields.iter().enumerate() {
            let field_name = match &field.ident {
                Some(ident) => ident.to_string(),
                None => index.to_string(),
            };
            let anonymous = positional || is_flattened(&field.attrs);

            let ty = match describe_type(&field.ty, scope) {
                Ok(ty) => ty,
                // Anonymous fields take no part in generation.
                Err(_) if anonymous => TypeDescriptor::named("", compact_tokens(&field.ty)),
                Err(source) => {
                    errors.push(GenerateError::resolve(&name, &field_name, source));
                    continue;
                }
            };

            fields.push(FieldDescriptor {
                name: field_name,
                ty,
                exported: !matches!(field.vis, syn::Visibility::Inherited),
                anonymous,
                module: scope.module.clone(),
                tag: optgen_tag(&field.attrs),
            });
        }

        if let Some(err) = GenerateError::from_many(errors) {
            return Err(err);
        }

        Ok(RecordDescriptor {
            name,
            module: scope.module.clone(),
            source_file: Some(self.path.clone()),
            fields,
        })
    }
}

fn not_a_struct(name: &str, kind: &'static str) -> GenerateError {
    GenerateError::NotAStruct {
        name: name.to_string(),
        kind,
    }
}

/// Names visible in one module body.
struct Scope {
    module: String,
    /// Alias to absolute path segments.
    imports: HashMap<String, Vec<String>>,
    types: HashSet<String>,
    modules: HashSet<String>,
    /// Absolute paths of glob imports. Their contents are not followed.
    globs: Vec<String>,
}

impl Scope {
    fn new(module: &str, items: &[Item]) -> Self {
        let mut scope = Self {
            module: module.to_string(),
            imports: HashMap::new(),
            types: HashSet::new(),
            modules: HashSet::new(),
            globs: Vec::new(),
        };

        for item in items {
            match item {
                Item::Struct(item) => {
                    scope.types.insert(item.ident.to_string());
                }
                Item::Enum(item) => {
                    scope.types.insert(item.ident.to_string());
                }
                Item::Union(item) => {
                    scope.types.insert(item.ident.to_string());
                }
                Item::Type(item) => {
                    scope.types.insert(item.ident.to_string());
                }
                Item::Trait(item) => {
                    scope.types.insert(item.ident.to_string());
                }
                Item::Mod(item) => {
                    scope.modules.insert(item.ident.to_string());
                }
                _ => {}
            }
        }

        let mut imports = Vec::new();
        let mut globs = Vec::new();
        for item in items {
            if let Item::Use(item) = item {
                let mut prefix = Vec::new();
                if item.leading_colon.is_some() {
                    prefix.push(String::new());
                }
                flatten_use(&item.tree, &mut prefix, &mut imports, &mut globs);
            }
        }
        for (alias, path) in imports {
            let path = scope.absolute(&path);
            scope.imports.insert(alias, path);
        }
        scope.globs = globs.iter().map(|path| scope.absolute(path).join("::")).collect();

        scope
    }

    fn module_segments(&self) -> Vec<String> {
        self.module.split("::").map(str::to_string).collect()
    }

    /// Rewrite `self`, `super`, `crate` and child-module prefixes to an
    /// absolute path.
    fn absolute(&self, segments: &[String]) -> Vec<String> {
        let Some(first) = segments.first() else {
            return Vec::new();
        };

        match first.as_str() {
            "crate" => {
                let mut path = self.module_segments();
                path.truncate(1);
                path.extend(segments[1..].iter().cloned());
                path
            }
            "self" => {
                let mut path = self.module_segments();
                path.extend(segments[1..].iter().cloned());
                path
            }
            "super" => {
                let mut path = self.module_segments();
                let mut rest = segments;
                while rest.first().is_some_and(|s| s == "super") {
                    if path.len() > 1 {
                        path.pop();
                    }
                    rest = &rest[1..];
                }
                path.extend(rest.iter().cloned());
                path
            }
            name if self.modules.contains(name) => {
                let mut path = self.module_segments();
                path.extend(segments.iter().cloned());
                path
            }
            _ => segments.to_vec(),
        }
    }

    /// Declaring module and name of a type path.
    fn resolve_path(&self, path: &syn::Path) -> (String, String) {
        let mut segments: Vec<String> = path.segments.iter().map(|s| s.ident.to_string()).collect();
        if path.leading_colon.is_some() {
            segments.insert(0, String::new());
        }
        let name = segments.pop().unwrap_or_default();

        if segments.is_empty() {
            if let Some(full) = self.imports.get(&name) {
                return split_last(full);
            }
            if self.types.contains(&name) {
                return (self.module.clone(), name);
            }
            if !self.globs.is_empty() && !PRELUDE_TYPES.contains(&name.as_str()) {
                log::debug!(
                    "optgen: {name} in {} is not declared or imported by name; glob imports of {} are not followed",
                    self.module,
                    self.globs.join(", ")
                );
            }
            return (String::new(), name);
        }

        let base = match self.imports.get(&segments[0]) {
            Some(full) => full.iter().chain(&segments[1..]).cloned().collect(),
            None => self.absolute(&segments),
        };
        (base.join("::"), name)
    }

    fn is_shadowed(&self, name: &str) -> bool {
        self.types.contains(name) || self.imports.contains_key(name)
    }
}

fn split_last(segments: &[String]) -> (String, String) {
    match segments.split_last() {
        Some((name, module)) => (module.join("::"), name.clone()),
        None => (String::new(), String::new()),
    }
}

/// Flatten a `use` tree into `(alias, path)` pairs. Glob imports only record
/// their prefix in `globs`.
fn flatten_use(
    tree: &UseTree,
    prefix: &mut Vec<String>,
    out: &mut Vec<(String, Vec<String>)>,
    globs: &mut Vec<Vec<String>>,
) {
    match tree {
        UseTree::Path(path) => {
            prefix.push(path.ident.to_string());
            flatten_use(&path.tree, prefix, out, globs);
            prefix.pop();
        }
        UseTree::Name(name) => {
            if name.ident == "self" {
                if let Some(last) = prefix.last() {
                    out.push((last.clone(), prefix.clone()));
                }
            } else {
                let mut path = prefix.clone();
                path.push(name.ident.to_string());
                out.push((name.ident.to_string(), path));
            }
        }
        UseTree::Rename(rename) => {
            if rename.rename == "_" {
                return;
            }
            let mut path = prefix.clone();
            if rename.ident != "self" {
                path.push(rename.ident.to_string());
            }
            out.push((rename.rename.to_string(), path));
        }
        UseTree::Glob(_) => globs.push(prefix.clone()),
        UseTree::Group(group) => {
            for tree in &group.items {
                flatten_use(tree, prefix, out, globs);
            }
        }
    }
}

fn compact_tokens(tokens: &impl ToTokens) -> String {
    tokens.to_token_stream().to_string().split_whitespace().collect()
}

fn unsupported(ty: &Type, reason: &str) -> ResolveError {
    ResolveError::Unsupported {
        type_name: compact_tokens(ty),
        reason: reason.to_string(),
    }
}

/// Describe a field type. Depth is not limited here; the resolver enforces
/// it when generating.
fn describe_type(ty: &Type, scope: &Scope) -> Result<TypeDescriptor, ResolveError> {
    match ty {
        Type::Paren(inner) => describe_type(&inner.elem, scope),
        Type::Group(inner) => describe_type(&inner.elem, scope),
        Type::Tuple(tuple) => Ok(TypeDescriptor::Struct {
            elements: tuple
                .elems
                .iter()
                .map(|elem| describe_type(elem, scope))
                .collect::<Result<_, _>>()?,
        }),
        Type::Array(array) => Ok(TypeDescriptor::array(
            describe_type(&array.elem, scope)?,
            compact_tokens(&array.len),
        )),
        Type::Path(type_path) if type_path.qself.is_none() => describe_path(ty, &type_path.path, scope),
        Type::Path(_) => Err(unsupported(ty, "qualified associated types are not supported")),
        Type::Reference(_) | Type::Ptr(_) => Err(unsupported(ty, "borrowed and raw pointer fields cannot be cloned into options")),
        Type::Slice(_) => Err(unsupported(ty, "unsized slices are not supported")),
        Type::TraitObject(_) | Type::ImplTrait(_) => Err(unsupported(ty, "trait object types are not supported")),
        Type::BareFn(_) => Err(unsupported(ty, "function pointer types are not supported")),
        _ => Err(unsupported(ty, "this kind of type is not supported")),
    }
}

fn describe_path(ty: &Type, path: &syn::Path, scope: &Scope) -> Result<TypeDescriptor, ResolveError> {
    let Some(last) = path.segments.last() else {
        return Err(unsupported(ty, "empty type path"));
    };
    let ident = last.ident.to_string();
    let args = type_args(ty, &last.arguments)?;
    let single = path.segments.len() == 1 && path.leading_colon.is_none();

    match (ident.as_str(), args.as_slice()) {
        (name, []) if single && SCALARS.contains(&name) && !scope.is_shadowed(name) => Ok(TypeDescriptor::scalar(name)),
        ("String", []) if !single && path.segments.first().is_some_and(|s| s.ident == "std" || s.ident == "alloc") => {
            Ok(TypeDescriptor::scalar("String"))
        }
        ("Box" | "Rc" | "Arc", [inner]) if !scope.types.contains(&ident) => {
            let pointer = PointerKind::from_ident(&ident).ok_or_else(|| unsupported(ty, "unknown pointer"))?;
            Ok(TypeDescriptor::pointer(pointer, describe_type(inner, scope)?))
        }
        ("Vec", [inner]) if !scope.types.contains(&ident) => Ok(TypeDescriptor::slice(describe_type(inner, scope)?)),
        ("HashMap" | "BTreeMap", [key, value]) if !scope.types.contains(&ident) => {
            let (module, name) = scope.resolve_path(path);
            let module = if module.is_empty() {
                DEFAULT_MAP_MODULE.to_string()
            } else {
                module
            };
            Ok(TypeDescriptor::map(
                module,
                name,
                describe_type(key, scope)?,
                describe_type(value, scope)?,
            ))
        }
        (_, []) => {
            let (module, name) = scope.resolve_path(path);
            Ok(TypeDescriptor::named(module, name))
        }
        (_, [arg]) => {
            let (module, name) = scope.resolve_path(path);
            Ok(TypeDescriptor::generic(module, name, describe_type(arg, scope)?))
        }
        _ => Err(unsupported(ty, "more than one generic type parameter")),
    }
}

/// Type arguments of the last path segment. Lifetimes are ignored.
fn type_args<'t>(ty: &Type, arguments: &'t PathArguments) -> Result<Vec<&'t Type>, ResolveError> {
    match arguments {
        PathArguments::None => Ok(Vec::new()),
        PathArguments::Parenthesized(_) => Err(unsupported(ty, "function trait types are not supported")),
        PathArguments::AngleBracketed(args) => {
            let mut types = Vec::new();
            for arg in &args.args {
                match arg {
                    GenericArgument::Type(ty) => types.push(ty),
                    GenericArgument::Lifetime(_) => {}
                    _ => return Err(unsupported(ty, "only type arguments are supported")),
                }
            }
            Ok(types)
        }
    }
}

/// `#[serde(flatten)]`.
fn is_flattened(attrs: &[Attribute]) -> bool {
    attrs.iter().any(|attr| {
        attr.path().is_ident("serde")
            && attr
                .parse_args_with(Punctuated::<Meta, syn::Token![,]>::parse_terminated)
                .is_ok_and(|nested| nested.iter().any(|meta| meta.path().is_ident("flatten")))
    })
}

/// Contents of all `#[optgen(...)]` attributes, joined with commas.
fn optgen_tag(attrs: &[Attribute]) -> String {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("optgen"))
        .filter_map(|attr| match &attr.meta {
            Meta::List(list) => Some(list.tokens.to_string()),
            _ => None,
        })
        .filter(|tokens| !tokens.trim().is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn scan(source: &str, names: &[&str]) -> Vec<(String, GenerateResult<RecordDescriptor>)> {
        let file = SourceFile::parse(Path::new("src/models.rs"), "crate::models".to_string(), source).unwrap();
        let names: Vec<String> = names.iter().map(|s| s.to_string()).collect();
        file.records(&names)
    }

    fn single(source: &str, name: &str) -> RecordDescriptor {
        let mut found = scan(source, &[name]);
        assert_eq!(found.len(), 1);
        found.remove(0).1.unwrap()
    }

    fn field<'r>(record: &'r RecordDescriptor, name: &str) -> &'r FieldDescriptor {
        record.fields.iter().find(|f| f.name == name).unwrap()
    }

    #[test]
    fn test_compute_module_path() {
        let base = Path::new("src");
        assert_eq!(
            compute_module_path(Path::new("src/config/server.rs"), base, "crate"),
            "crate::config::server"
        );
        assert_eq!(compute_module_path(Path::new("src/config/mod.rs"), base, "crate"), "crate::config");
        assert_eq!(compute_module_path(Path::new("src/lib.rs"), base, "crate"), "crate");
        assert_eq!(compute_module_path(Path::new("other/models.rs"), base, "crate"), "crate::models");
    }

    #[test]
    fn test_describes_field_shapes() {
        let record = single(
            r#"
            use std::collections::{BTreeMap, HashMap};
            use std::sync::Arc;
            use std::time::Duration;

            #[derive(Default)]
            pub struct Server {
                #[optgen(debugmap = "visible")]
                pub host: String,
                pub(crate) port: u16,
                pub tags: Vec<String>,
                pub labels: HashMap<String, String>,
                pub limits: BTreeMap<String, u32>,
                pub timeout: Option<Duration>,
                pub upstream: Option<Box<Upstream>>,
                pub weights: [u8; 4],
                pub shared: Arc<String>,
                pub pair: (u8, String),
                attempts: u32,
            }

            pub struct Upstream;
            "#,
            "Server",
        );

        assert_eq!(record.module, "crate::models");
        assert_eq!(record.source_file.as_deref(), Some(Path::new("src/models.rs")));
        assert_eq!(record.fields.len(), 11);

        assert_eq!(field(&record, "host").ty, TypeDescriptor::scalar("String"));
        assert_eq!(field(&record, "host").tag, r#"debugmap = "visible""#);
        assert!(field(&record, "port").exported);
        assert!(!field(&record, "attempts").exported);
        assert_eq!(field(&record, "tags").ty.canonical_name(), "Vec<String>");
        assert_eq!(
            field(&record, "labels").ty.canonical_name(),
            "std::collections::HashMap<String, String>"
        );
        assert_eq!(
            field(&record, "limits").ty.canonical_name(),
            "std::collections::BTreeMap<String, u32>"
        );
        assert_eq!(field(&record, "timeout").ty.canonical_name(), "Option<std::time::Duration>");
        assert_eq!(
            field(&record, "upstream").ty.canonical_name(),
            "Option<Box<crate::models::Upstream>>"
        );
        assert_eq!(field(&record, "weights").ty.canonical_name(), "[u8; 4]");
        assert_eq!(field(&record, "shared").ty.canonical_name(), "Arc<String>");
        assert_eq!(field(&record, "pair").ty.canonical_name(), "(u8, String)");
    }

    #[test]
    fn test_resolves_relative_imports() {
        let file = SourceFile::parse(
            Path::new("src/net/endpoint.rs"),
            "crate::net::endpoint".to_string(),
            r#"
            use super::peer::{self, Peer as RemotePeer};
            use crate::models::Upstream;
            use self::inner::Tagged;

            mod inner {
                pub struct Tagged<T>(pub T);
            }

            pub struct Endpoint {
                pub peers: Vec<RemotePeer>,
                pub upstream: Upstream,
                pub history: Vec<Tagged<peer::Peer>>,
                pub fallback: crate::models::Upstream,
                pub extra: serde_json::Value,
            }
            "#,
        )
        .unwrap();

        let mut found = file.records(&["Endpoint".to_string()]);
        let record = found.remove(0).1.unwrap();
        assert_eq!(field(&record, "peers").ty.canonical_name(), "Vec<crate::net::peer::Peer>");
        assert_eq!(field(&record, "upstream").ty.canonical_name(), "crate::models::Upstream");
        assert_eq!(
            field(&record, "history").ty.canonical_name(),
            "Vec<crate::net::endpoint::inner::Tagged<crate::net::peer::Peer>>"
        );
        assert_eq!(field(&record, "fallback").ty.canonical_name(), "crate::models::Upstream");
        assert_eq!(field(&record, "extra").ty.canonical_name(), "serde_json::Value");
    }

    #[test]
    fn test_glob_imports_leave_names_unqualified() {
        let file = SourceFile::parse(
            Path::new("src/net/endpoint.rs"),
            "crate::net::endpoint".to_string(),
            r#"
            use super::peer::*;

            pub struct Endpoint {
                pub peer: Peer,
                pub backup: Option<Peer>,
            }
            "#,
        )
        .unwrap();

        let scope = Scope::new("crate::net::endpoint", &file.syntax.items);
        assert_eq!(scope.globs, ["crate::net::peer"]);

        let mut found = file.records(&["Endpoint".to_string()]);
        let record = found.remove(0).1.unwrap();
        assert_eq!(field(&record, "peer").ty, TypeDescriptor::named("", "Peer"));
        assert_eq!(crate::resolver::unqualified_names(&field(&record, "backup").ty), ["Peer"]);
    }

    #[test]
    fn test_anonymous_fields() {
        let record = single(
            r#"
            pub struct Wrapper(pub String, fn() -> u8);
            "#,
            "Wrapper",
        );
        assert_eq!(record.fields.len(), 2);
        assert!(record.fields.iter().all(|f| f.anonymous));
        assert_eq!(record.fields[0].name, "0");

        let record = single(
            r#"
            pub struct Config {
                #[serde(flatten)]
                pub base: Base,
                #[serde(rename = "n")]
                pub name: String,
            }
            "#,
            "Config",
        );
        assert!(field(&record, "base").anonymous);
        assert!(!field(&record, "name").anonymous);
    }

    #[test]
    fn test_rejects_non_structs_and_generics() {
        let found = scan(
            r#"
            pub enum Mode { A, B }
            pub type Alias = String;
            pub struct Generic<T> { pub value: T }
            pub struct Unrequested { pub value: u8 }
            "#,
            &["Mode", "Alias", "Generic"],
        );

        assert_eq!(found.len(), 3);
        assert!(matches!(found[0].1, Err(GenerateError::NotAStruct { kind: "enum", .. })));
        assert!(matches!(found[1].1, Err(GenerateError::NotAStruct { kind: "type alias", .. })));
        assert!(matches!(found[2].1, Err(GenerateError::GenericRecord { .. })));
    }

    #[test]
    fn test_unsupported_field_types_are_collected() {
        let found = scan(
            r#"
            pub struct Server {
                pub name: &'static str,
                pub pair: Result<u8, String>,
                pub ok: u8,
            }
            "#,
            &["Server"],
        );
        let errors = found.into_iter().next().unwrap().1.unwrap_err().into_errors();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| matches!(e, GenerateError::Resolve { .. })));
    }

    #[test]
    fn test_inline_modules_have_their_own_path() {
        let record = single(
            r#"
            pub mod nested {
                pub struct Inner { pub peer: Peer }
                pub struct Peer;
            }
            "#,
            "Inner",
        );
        assert_eq!(record.module, "crate::models::nested");
        assert_eq!(field(&record, "peer").ty.canonical_name(), "crate::models::nested::Peer");
    }

    #[test]
    fn test_multiple_optgen_attributes_are_joined() {
        let record = single(
            r#"
            pub struct Server {
                #[optgen(debugmap = "visible")]
                #[optgen(default = 8080)]
                pub port: u16,
            }
            "#,
            "Server",
        );
        assert_eq!(field(&record, "port").tag, r#"debugmap = "visible", default = 8080"#);
    }

    #[test]
    fn test_collect_files_skips_generated() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("config")).unwrap();
        fs::write(dir.path().join("models.rs"), "").unwrap();
        fs::write(dir.path().join("models_opts.rs"), "").unwrap();
        fs::write(dir.path().join("config/server.rs"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let files = collect_files(dir.path());
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, ["config/server.rs", "models.rs"]);

        let single = collect_files(&dir.path().join("models.rs"));
        assert_eq!(single.len(), 1);
    }

    #[test]
    fn test_read_reports_parse_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.rs");
        fs::write(&path, "pub struct {").unwrap();
        assert!(matches!(
            SourceFile::read(&path, dir.path(), "crate"),
            Err(GenerateError::Parse { .. })
        ));
        assert!(matches!(
            SourceFile::read(&dir.path().join("missing.rs"), dir.path(), "crate"),
            Err(GenerateError::Io { .. })
        ));
    }
}
