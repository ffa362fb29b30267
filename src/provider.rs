//! Injectable providers

use crate::InjectResult;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Type-erased injectable value.
pub type SharedAny = Arc<dyn Any + Send + Sync>;

/// Wrapper type for supplier functions
///
/// This newtype wraps an Arc-wrapped function that produces an injectable
/// value each time it is called.
#[derive(Clone)]
pub struct ProviderFn(Arc<dyn Fn() -> InjectResult<SharedAny> + Send + Sync>);

impl ProviderFn {
	/// Wrap a typed supplier, erasing its output type
	pub fn from_typed<T, F>(func: F) -> Self
	where
		T: Any + Send + Sync,
		F: Fn() -> InjectResult<T> + Send + Sync + 'static,
	{
		Self(Arc::new(move || func().map(|value| Arc::new(value) as SharedAny)))
	}

	/// Run the supplier once
	pub fn call(&self) -> InjectResult<SharedAny> {
		(self.0)()
	}
}

/// How a registered capability obtains its value.
#[derive(Clone)]
pub enum Provider {
	/// A singleton reference shared by every injection.
	Value(SharedAny),
	/// Evaluated on every resolution, e.g. to read the ambient context.
	Supplier(ProviderFn),
}

impl Provider {
	/// Provider for a fixed value
	pub fn value<T: Any + Send + Sync>(value: T) -> Self {
		Self::Value(Arc::new(value))
	}

	/// Provider backed by a supplier function
	pub fn supplier<T, F>(func: F) -> Self
	where
		T: Any + Send + Sync,
		F: Fn() -> InjectResult<T> + Send + Sync + 'static,
	{
		Self::Supplier(ProviderFn::from_typed(func))
	}

	/// Obtain the current value of this provider
	pub fn provide(&self) -> InjectResult<SharedAny> {
		match self {
			Self::Value(value) => Ok(Arc::clone(value)),
			Self::Supplier(func) => func.call(),
		}
	}

	pub fn is_supplier(&self) -> bool {
		matches!(self, Self::Supplier(_))
	}
}

impl fmt::Debug for Provider {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Value(_) => f.write_str("Provider::Value"),
			Self::Supplier(_) => f.write_str("Provider::Supplier"),
		}
	}
}
