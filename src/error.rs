//! Injection error types

use thiserror::Error;

/// Errors raised while building an injector or injecting an object graph.
#[derive(Debug, Error)]
pub enum InjectError {
	/// A required input was missing at construction time.
	#[error("Precondition violated: {0}")]
	Precondition(String),

	/// An annotated field asks for a capability the registry does not know,
	/// and the field was not initialized by its owner.
	#[error("Unsupported injectable type `{type_name}` for field `{owner}.{field}`")]
	UnsupportedType {
		/// Concrete type that owns the field.
		owner: &'static str,
		/// Field name.
		field: &'static str,
		/// Declared capability type of the field.
		type_name: &'static str,
	},

	/// A context-dependent capability was resolved with no ambient context installed.
	#[error("No context associated with the current scope")]
	NoAmbientContext,

	/// A provider produced a value that does not match its registered capability.
	#[error("Provider for `{type_name}` produced a value of another type")]
	ProviderMismatch {
		/// Capability the provider is registered under.
		type_name: &'static str,
	},
}

/// Result type alias for injection operations.
pub type InjectResult<T> = Result<T, InjectError>;

impl InjectError {
	/// Whether this error is a scope violation rather than a registry problem.
	pub fn is_scope_violation(&self) -> bool {
		matches!(self, Self::NoAmbientContext)
	}
}
