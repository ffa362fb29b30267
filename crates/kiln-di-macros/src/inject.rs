//! Implementation of `#[derive(Inject)]`

use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Field, Fields, Ident, Result};

/// How a field takes part in injection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldRole {
	/// Resolved against the registry
	Slot,
	/// Embedded base whose own fields are discovered in place
	Flatten,
	/// Wrapped delegate of a decorator
	Delegate,
}

/// Parse the `#[inject(...)]` attributes of a field.
///
/// Returns `None` for fields without the marker.
fn field_role(field: &Field) -> Result<Option<FieldRole>> {
	let mut role = None;

	for attr in field.attrs.iter().filter(|a| a.path().is_ident("inject")) {
		if role.is_some() {
			return Err(syn::Error::new_spanned(
				attr,
				"duplicate #[inject] attribute on the same field",
			));
		}

		if let syn::Meta::Path(_) = attr.meta {
			role = Some(FieldRole::Slot);
			continue;
		}

		let mut parsed = None;
		attr.parse_nested_meta(|meta| {
			if parsed.is_some() {
				return Err(meta.error("expected a single argument"));
			}
			if meta.path.is_ident("flatten") {
				parsed = Some(FieldRole::Flatten);
				Ok(())
			} else if meta.path.is_ident("delegate") {
				parsed = Some(FieldRole::Delegate);
				Ok(())
			} else {
				Err(meta.error("unknown argument. Valid arguments are: flatten, delegate"))
			}
		})?;

		role = Some(parsed.unwrap_or(FieldRole::Slot));
	}

	Ok(role)
}

pub fn derive_inject_impl(input: DeriveInput) -> Result<TokenStream> {
	let struct_name = &input.ident;
	let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

	let fields = match &input.data {
		syn::Data::Struct(data_struct) => match &data_struct.fields {
			Fields::Named(fields) => Some(&fields.named),
			Fields::Unit => None,
			Fields::Unnamed(_) => {
				return Err(syn::Error::new_spanned(
					struct_name,
					"#[derive(Inject)] cannot be applied to tuple structs",
				));
			}
		},
		_ => {
			return Err(syn::Error::new_spanned(
				struct_name,
				"#[derive(Inject)] can only be applied to structs",
			));
		}
	};

	let mut discover_stmts = Vec::new();
	let mut delegate: Option<&Ident> = None;

	for field in fields.into_iter().flatten() {
		let Some(role) = field_role(field)? else {
			continue;
		};
		// Named fields always carry an ident
		let Some(name) = field.ident.as_ref() else {
			continue;
		};

		match role {
			FieldRole::Slot => discover_stmts.push(quote! {
				__fields.field(stringify!(#name), &mut self.#name)?;
			}),
			FieldRole::Flatten => discover_stmts.push(quote! {
				::kiln_di::Inject::inject_fields(&mut self.#name, __fields)?;
			}),
			FieldRole::Delegate => {
				if delegate.is_some() {
					return Err(syn::Error::new_spanned(
						field,
						"only one field can be marked #[inject(delegate)]",
					));
				}
				delegate = Some(name);
			}
		}
	}

	let delegate_fn = delegate.map(|name| {
		quote! {
			fn delegate(&mut self) -> ::std::option::Option<&mut dyn ::kiln_di::Inject> {
				::std::option::Option::Some(&mut self.#name as &mut dyn ::kiln_di::Inject)
			}
		}
	});

	let fields_param = if discover_stmts.is_empty() {
		quote! { _fields }
	} else {
		quote! { __fields }
	};

	Ok(quote! {
		impl #impl_generics ::kiln_di::Inject for #struct_name #ty_generics #where_clause {
			fn inject_fields(
				&mut self,
				#fields_param: &mut ::kiln_di::FieldInjector<'_>,
			) -> ::kiln_di::InjectResult<()> {
				#(#discover_stmts)*
				::std::result::Result::Ok(())
			}

			#delegate_fn
		}
	})
}
