//! Identifier derivation for generated items.

use crate::error::{GenerateError, GenerateResult};
use proc_macro2::{Ident, Span};

/// Strict and reserved keywords, 2024 edition.
const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum", "extern", "false", "fn",
    "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return", "self", "Self",
    "static", "struct", "super", "trait", "true", "type", "unsafe", "use", "where", "while", "abstract", "become",
    "box", "do", "final", "gen", "macro", "override", "priv", "try", "typeof", "unsized", "virtual", "yield",
];

pub fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

/// Build an identifier from a name, honoring an `r#` prefix.
pub fn ident(name: &str, what: &'static str) -> GenerateResult<Ident> {
    let invalid = || GenerateError::InvalidName {
        name: name.to_string(),
        what,
    };

    if let Some(raw) = name.strip_prefix("r#") {
        if !is_identifier(raw) || matches!(raw, "self" | "Self" | "super" | "crate") {
            return Err(invalid());
        }
        return Ok(Ident::new_raw(raw, Span::call_site()));
    }

    if !is_identifier(name) || is_keyword(name) {
        return Err(invalid());
    }
    Ok(Ident::new(name, Span::call_site()))
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first == '_' || first.is_alphabetic() => {}
        _ => return false,
    }
    name != "_" && chars.all(|c| c == '_' || c.is_alphanumeric())
}

/// Lowercase first letter of the type name, or `r` when the name does not
/// start with a letter.
pub fn receiver_name(type_name: &str) -> String {
    type_name
        .chars()
        .next()
        .filter(|c| c.is_alphabetic())
        .map(|c| c.to_lowercase().collect())
        .unwrap_or_else(|| "r".to_string())
}

/// Lower-case the first character.
pub fn unexport(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Parameter name for a field's option function.
///
/// Keywords and the receiver name get a trailing underscore so the generated
/// closure never shadows its own receiver.
pub fn param_name(field_name: &str, receiver: &str) -> String {
    let plain = field_name.strip_prefix("r#").unwrap_or(field_name);
    let name = unexport(plain);
    if is_keyword(&name) || name == receiver {
        format!("{name}_")
    } else {
        name
    }
}

/// Convert PascalCase to snake_case, keeping acronyms together.
pub fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut result = String::new();
    for (i, &ch) in chars.iter().enumerate() {
        if ch.is_uppercase() {
            let prev_lower = i > 0 && (chars[i - 1].is_lowercase() || chars[i - 1].is_ascii_digit());
            let next_lower = chars.get(i + 1).is_some_and(|c| c.is_lowercase());
            let prev_upper = i > 0 && chars[i - 1].is_uppercase();
            if prev_lower || (prev_upper && next_lower) {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
        } else {
            result.push(ch);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("Server"), "server");
        assert_eq!(to_snake_case("GuildMember"), "guild_member");
        assert_eq!(to_snake_case("HTTPServer"), "http_server");
        assert_eq!(to_snake_case("Ipv4Config"), "ipv4_config");
    }

    #[test]
    fn test_receiver_name() {
        assert_eq!(receiver_name("Server"), "s");
        assert_eq!(receiver_name("Ümlaut"), "ü");
        assert_eq!(receiver_name("_Internal"), "r");
        assert_eq!(receiver_name(""), "r");
    }

    #[test]
    fn test_param_name_avoids_keywords_and_receiver() {
        assert_eq!(param_name("host", "s"), "host");
        assert_eq!(param_name("Host", "s"), "host");
        assert_eq!(param_name("r#type", "s"), "type_");
        assert_eq!(param_name("s", "s"), "s_");
        assert_eq!(param_name("gen", "s"), "gen_");
    }

    #[test]
    fn test_ident_validation() {
        assert_eq!(ident("Server", "type name").unwrap().to_string(), "Server");
        assert_eq!(ident("r#type", "field name").unwrap().to_string(), "r#type");
        assert!(ident("type", "field name").is_err());
        assert!(ident("Wrapper<Item>", "type name").is_err());
        assert!(ident("9lives", "type name").is_err());
        assert!(ident("r#self", "field name").is_err());
    }
}
