use std::collections::BTreeMap;
use std::fmt::Debug;

/// Field name to rendered value, as returned by generated `debug_map` methods.
pub type DebugMap = BTreeMap<String, String>;

/// Stand-in recorded for fields tagged `debugmap = "sensitive"`.
pub const SENSITIVE_PLACEHOLDER: &str = "(sensitive)";

/// Render a field value for a debug map.
///
/// With `with_type_info` the value is wrapped in its type name, e.g.
/// `u16(8080)` or `Option<Duration>(None)`.
pub fn debug_value<T: Debug + ?Sized>(value: &T, with_type_info: bool) -> String {
    if with_type_info {
        format!("{}({value:?})", short_type_name(std::any::type_name::<T>()))
    } else {
        format!("{value:?}")
    }
}

/// Render a sensitive field. The value itself is never inspected.
pub fn sensitive_debug_value<T: ?Sized>(_value: &T) -> String {
    SENSITIVE_PLACEHOLDER.to_string()
}

/// Drop module prefixes from every path segment of a type name:
/// `alloc::vec::Vec<core::time::Duration>` becomes `Vec<Duration>`.
fn short_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment_start = 0;
    let mut chars = full.chars().peekable();

    while let Some(c) = chars.next() {
        if c == ':' && chars.peek() == Some(&':') {
            chars.next();
            out.truncate(segment_start);
        } else {
            out.push(c);
            if !(c.is_alphanumeric() || c == '_') {
                segment_start = out.len();
            }
        }
    }

    out
}
