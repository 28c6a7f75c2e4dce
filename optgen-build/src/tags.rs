//! Parsing of raw `#[optgen(...)]` tag strings.

use quote::ToTokens;
use syn::parse::Parser;
use syn::punctuated::Punctuated;
use syn::{Expr, ExprLit, Lit, Meta, Token};

/// Tag key controlling how a field appears in `debug_map`.
pub const DEBUG_MAP_TAG: &str = "debugmap";

/// How a field is rendered by the generated `debug_map`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugTag {
    /// `visible`: the value's debug representation.
    Visible,
    /// `visible-format`: the debug representation prefixed with its type.
    VisibleFormatted,
    /// `hidden`: left out of the map.
    Hidden,
    /// `sensitive`: replaced by a placeholder.
    Sensitive,
}

impl DebugTag {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "visible" => Some(Self::Visible),
            "visible-format" => Some(Self::VisibleFormatted),
            "hidden" => Some(Self::Hidden),
            "sensitive" => Some(Self::Sensitive),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Visible => "visible",
            Self::VisibleFormatted => "visible-format",
            Self::Hidden => "hidden",
            Self::Sensitive => "sensitive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValue {
    /// Bare key, e.g. `skip`.
    Flag,
    /// `key = "text"`.
    Str(String),
    /// Any other value, kept as token text.
    Other(String),
}

/// Parsed key/value pairs of a field tag, in written order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldTags {
    entries: Vec<(String, TagValue)>,
}

impl FieldTags {
    /// Parse `key = "value", flag, ...`. An empty string has no entries and a
    /// key may appear only once.
    pub fn parse(raw: &str) -> Result<Self, String> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }

        let metas = Punctuated::<Meta, Token![,]>::parse_terminated
            .parse_str(raw)
            .map_err(|err| err.to_string())?;

        let mut entries = Vec::new();
        for meta in metas {
            let key = meta.path().to_token_stream().to_string().replace(' ', "");
            if entries.iter().any(|(k, _)| *k == key) {
                return Err(format!("duplicate key `{key}`"));
            }
            let value = match meta {
                Meta::Path(_) => TagValue::Flag,
                Meta::NameValue(nv) => match nv.value {
                    Expr::Lit(ExprLit { lit: Lit::Str(s), .. }) => TagValue::Str(s.value()),
                    other => TagValue::Other(other.to_token_stream().to_string()),
                },
                Meta::List(list) => TagValue::Other(list.tokens.to_string()),
            };
            entries.push((key, value));
        }

        Ok(Self { entries })
    }

    /// Value written for `key`.
    pub fn get(&self, key: &str) -> Option<&TagValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
