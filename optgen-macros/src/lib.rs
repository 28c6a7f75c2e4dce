use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod parsed;

use parsed::ParsedRecord;

/// Registers the `#[optgen(...)]` field attribute and implements
/// `optgen::Defaults` from its `default = <expr>` entries.
///
/// Recognized keys:
/// - `debugmap = "visible" | "visible-format" | "hidden" | "sensitive"`: how
///   the generated `debug_map` shows the field.
/// - `default = <expr>`: value assigned by `set_defaults`. String literals are
///   converted with `Into`, so `default = "localhost"` works for `String`.
///
/// ```text
/// #[derive(Default, Optgen)]
/// pub struct Server {
///     #[optgen(debugmap = "visible", default = "localhost")]
///     pub host: String,
///     #[optgen(debugmap = "visible", default = 8080)]
///     pub port: u16,
/// }
/// ```
#[proc_macro_derive(Optgen, attributes(optgen))]
pub fn derive_optgen(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match ParsedRecord::from_input(&input) {
        Ok(parsed) => parsed.emit().into(),
        Err(err) => err.to_compile_error().into(),
    }
}
