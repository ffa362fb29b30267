//! Procedural macros for kiln field injection
//!
//! This crate provides the `#[derive(Inject)]` macro which marks the fields of
//! a struct that the kiln `Injector` is allowed to populate.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod inject;

/// Derive the `Inject` trait for a struct with named fields
///
/// # Example
///
/// ```ignore
/// use kiln_di::{Inject, ReadOnlyContext, ResourceProcessor};
///
/// #[derive(Inject)]
/// struct LintProcessor {
///     #[inject]
///     context: Option<ReadOnlyContext>,
///     rules: Vec<String>,
/// }
///
/// #[derive(Inject)]
/// struct Timed<P: ResourceProcessor> {
///     #[inject(delegate)]
///     inner: P,
/// }
/// ```
///
/// # Field attributes
///
/// - `#[inject]` - Populate this field from the injectable registry
/// - `#[inject(flatten)]` - Discover the injectable fields of an embedded base value
/// - `#[inject(delegate)]` - The wrapped delegate of a decorator (at most one)
#[proc_macro_derive(Inject, attributes(inject))]
pub fn derive_inject(input: TokenStream) -> TokenStream {
	let input = parse_macro_input!(input as DeriveInput);

	inject::derive_inject_impl(input)
		.unwrap_or_else(|e| e.to_compile_error())
		.into()
}
