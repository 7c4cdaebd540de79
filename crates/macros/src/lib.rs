//! Macros for [bindserve](https://docs.rs/bindserve).
#![forbid(unsafe_code)]

mod attr;
mod describe;

/// Derives `bindserve::Describe` for a struct with named fields, turning it into a record which
/// is declared as an `interface` in the generated TypeScript.
///
/// `#[serde(rename = "...")]` and `#[serde(rename_all = "...")]` change the emitted names,
/// `#[serde(skip)]` and `#[serde(skip_serializing)]` leave a field out. Only `pub` fields are
/// declared.
#[proc_macro_derive(Describe, attributes(serde))]
pub fn derive_describe(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    describe::derive(syn::parse_macro_input!(input))
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
