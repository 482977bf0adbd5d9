mod record;

use proc_macro::TokenStream;

/// Derive macro for the `Record` trait.
///
/// # Usage
///
/// ```ignore
/// #[derive(Clone, Record)]
/// struct Pokemon {
///     #[record(id)]
///     pub name: String,
///     pub attack: u32,
///     pub defense: u32,
/// }
/// ```
///
/// - `#[record(id)]` marks the field used as the stable identifier.
///   If omitted, defaults to a field named `id`.
/// - The identifier field must deref to `str` (`String`, `Box<str>`, ...).
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    record::derive_record(input)
}
