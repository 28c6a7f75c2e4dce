//! Resolved descriptions of the records options are generated for.
//!
//! Descriptors are produced by the [`scanner`](crate::scanner) from Rust
//! source, or deserialized from JSON by callers that resolve types some other
//! way. They are immutable once built.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Smart pointer flavours that are decomposed as pointer layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerKind {
    Box,
    Rc,
    Arc,
}

impl PointerKind {
    pub fn from_ident(ident: &str) -> Option<Self> {
        match ident {
            "Box" => Some(Self::Box),
            "Rc" => Some(Self::Rc),
            "Arc" => Some(Self::Arc),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Box => "Box",
            Self::Rc => "Rc",
            Self::Arc => "Arc",
        }
    }
}

/// Structural shape of a field type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeDescriptor {
    /// Primitive or `String`.
    Scalar { name: String },
    /// `Box<T>`, `Rc<T>` or `Arc<T>`.
    Pointer { pointer: PointerKind, inner: Box<TypeDescriptor> },
    /// Fixed-length array `[T; len]`.
    Array { inner: Box<TypeDescriptor>, len: String },
    /// Growable sequence, `Vec<T>`.
    Slice { inner: Box<TypeDescriptor> },
    /// `HashMap<K, V>` / `BTreeMap<K, V>`.
    Map {
        #[serde(default)]
        module: String,
        name: String,
        key: Box<TypeDescriptor>,
        value: Box<TypeDescriptor>,
    },
    /// Any other path type. An empty `module` means the name is written
    /// unqualified, which suits prelude types such as `Option`.
    Named {
        #[serde(default)]
        module: String,
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        type_arg: Option<Box<TypeDescriptor>>,
    },
    /// Anonymous product type, i.e. a tuple.
    Struct {
        #[serde(default)]
        elements: Vec<TypeDescriptor>,
    },
}

impl TypeDescriptor {
    pub fn scalar(name: impl Into<String>) -> Self {
        Self::Scalar { name: name.into() }
    }

    pub fn pointer(pointer: PointerKind, inner: TypeDescriptor) -> Self {
        Self::Pointer {
            pointer,
            inner: Box::new(inner),
        }
    }

    pub fn slice(inner: TypeDescriptor) -> Self {
        Self::Slice { inner: Box::new(inner) }
    }

    pub fn array(inner: TypeDescriptor, len: impl Into<String>) -> Self {
        Self::Array {
            inner: Box::new(inner),
            len: len.into(),
        }
    }

    pub fn map(module: impl Into<String>, name: impl Into<String>, key: TypeDescriptor, value: TypeDescriptor) -> Self {
        Self::Map {
            module: module.into(),
            name: name.into(),
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn named(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Named {
            module: module.into(),
            name: name.into(),
            type_arg: None,
        }
    }

    pub fn generic(module: impl Into<String>, name: impl Into<String>, type_arg: TypeDescriptor) -> Self {
        Self::Named {
            module: module.into(),
            name: name.into(),
            type_arg: Some(Box::new(type_arg)),
        }
    }

    /// Fully qualified textual form, e.g. `Vec<crate::net::Tagged<crate::net::Peer>>`.
    pub fn canonical_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar { name } => f.write_str(name),
            Self::Pointer { pointer, inner } => write!(f, "{}<{inner}>", pointer.name()),
            Self::Array { inner, len } => write!(f, "[{inner}; {len}]"),
            Self::Slice { inner } => write!(f, "Vec<{inner}>"),
            Self::Map {
                module,
                name,
                key,
                value,
            } => {
                write_qualified(f, module, name)?;
                write!(f, "<{key}, {value}>")
            }
            Self::Named { module, name, type_arg } => {
                write_qualified(f, module, name)?;
                match type_arg {
                    Some(arg) => write!(f, "<{arg}>"),
                    None => Ok(()),
                }
            }
            Self::Struct { elements } => {
                f.write_str("(")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{element}")?;
                }
                if elements.len() == 1 {
                    f.write_str(",")?;
                }
                f.write_str(")")
            }
        }
    }
}

fn write_qualified(f: &mut fmt::Formatter<'_>, module: &str, name: &str) -> fmt::Result {
    if module.is_empty() {
        f.write_str(name)
    } else {
        write!(f, "{module}::{name}")
    }
}

/// A single struct field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field identifier as written, including any `r#` prefix. Positional
    /// fields use their index.
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
    /// Declared with any explicit visibility.
    #[serde(default)]
    pub exported: bool,
    /// Positional or flattened field; never gets generated helpers.
    #[serde(default)]
    pub anonymous: bool,
    /// Module path of the declaring module.
    pub module: String,
    /// Contents of the field's `#[optgen(...)]` attributes.
    #[serde(default)]
    pub tag: String,
}

impl FieldDescriptor {
    /// The field name without a raw identifier prefix.
    pub fn plain_name(&self) -> &str {
        self.name.strip_prefix("r#").unwrap_or(&self.name)
    }
}

/// A struct definition with its fields in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDescriptor {
    pub name: String,
    pub module: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<PathBuf>,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_name_nests_wrappers() {
        let ty = TypeDescriptor::slice(TypeDescriptor::generic(
            "crate::net",
            "Tagged",
            TypeDescriptor::named("crate::net", "Peer"),
        ));
        assert_eq!(ty.canonical_name(), "Vec<crate::net::Tagged<crate::net::Peer>>");

        let ty = TypeDescriptor::pointer(PointerKind::Arc, TypeDescriptor::array(TypeDescriptor::scalar("u8"), "4"));
        assert_eq!(ty.canonical_name(), "Arc<[u8; 4]>");

        let ty = TypeDescriptor::Struct {
            elements: vec![TypeDescriptor::scalar("u8")],
        };
        assert_eq!(ty.canonical_name(), "(u8,)");
    }

    #[test]
    fn test_descriptor_json_shape() {
        let json = r#"{
            "name": "Server",
            "module": "crate::config",
            "fields": [
                {
                    "name": "labels",
                    "type": {
                        "kind": "map",
                        "module": "std::collections",
                        "name": "HashMap",
                        "key": { "kind": "scalar", "name": "String" },
                        "value": { "kind": "scalar", "name": "String" }
                    },
                    "exported": true,
                    "module": "crate::config",
                    "tag": "debugmap = \"visible\""
                }
            ]
        }"#;

        let record: RecordDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(record.name, "Server");
        assert!(record.source_file.is_none());
        assert_eq!(record.fields.len(), 1);
        assert_eq!(
            record.fields[0].ty.canonical_name(),
            "std::collections::HashMap<String, String>"
        );
    }

    #[test]
    fn test_plain_name_strips_raw_prefix() {
        let field = FieldDescriptor {
            name: "r#type".to_string(),
            ty: TypeDescriptor::scalar("String"),
            exported: true,
            anonymous: false,
            module: "crate".to_string(),
            tag: String::new(),
        };
        assert_eq!(field.plain_name(), "type");
    }
}
