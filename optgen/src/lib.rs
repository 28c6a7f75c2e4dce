//! Runtime support for code generated by `optgen-build`.
//!
//! Generated units reference this crate for the `Defaults` hook behind
//! `new_with_options_and_defaults` and for the helpers `debug_map` uses to
//! render field values. `#[derive(Optgen)]` registers the `#[optgen(...)]`
//! field attribute and implements `Defaults` from its `default = ...` entries.

extern crate self as optgen;

mod debug;

pub use debug::{DebugMap, SENSITIVE_PLACEHOLDER, debug_value, sensitive_debug_value};
pub use optgen_macros::Optgen;

/// Populates declared field defaults on an already constructed value.
///
/// Implemented by `#[derive(Optgen)]`; fields without a `default` keep the
/// value they had.
pub trait Defaults {
    fn set_defaults(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Optgen)]
    struct Listener {
        #[optgen(debugmap = "visible", default = "0.0.0.0")]
        address: String,
        #[optgen(debugmap = "visible", default = 443)]
        port: u16,
        #[optgen(debugmap = "visible", default = vec!["h2".to_string()])]
        protocols: Vec<String>,
        #[optgen(debugmap = "hidden")]
        backlog: u32,
    }

    #[test]
    fn test_derived_defaults() {
        let mut listener = Listener {
            backlog: 7,
            ..Default::default()
        };
        listener.set_defaults();

        assert_eq!(listener.address, "0.0.0.0");
        assert_eq!(listener.port, 443);
        assert_eq!(listener.protocols, vec!["h2".to_string()]);
        assert_eq!(listener.backlog, 7);
    }

    #[derive(Default, Optgen)]
    struct Pair(#[optgen(default = 'x')] char, #[optgen(debugmap = "visible")] u8);

    #[test]
    fn test_tuple_struct_defaults() {
        let mut pair = Pair::default();
        pair.set_defaults();
        assert_eq!(pair.0, 'x');
        assert_eq!(pair.1, 0);
    }
}
