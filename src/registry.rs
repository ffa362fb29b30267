//! Injectable registry
//!
//! Immutable mapping from capability type to [`Provider`], built once through
//! [`RegistryBuilder`] and then shared read-only by every injection call.

use crate::{InjectResult, Provider};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
struct Entry {
	type_name: &'static str,
	provider: Provider,
}

/// Frozen capability map consulted by the [`Injector`](crate::Injector).
#[derive(Debug, Clone, Default)]
pub struct InjectableRegistry {
	entries: Arc<HashMap<TypeId, Entry>>,
}

impl InjectableRegistry {
	/// Start a new registry.
	///
	/// # Examples
	///
	/// ```
	/// use kiln_di::InjectableRegistry;
	///
	/// let registry = InjectableRegistry::builder().value(42u32).build();
	/// assert!(registry.contains::<u32>());
	/// ```
	pub fn builder() -> RegistryBuilder {
		RegistryBuilder::default()
	}

	/// Provider registered for a capability, if any.
	pub fn provider(&self, capability: TypeId) -> Option<&Provider> {
		self.entries.get(&capability).map(|entry| &entry.provider)
	}

	pub fn contains<T: Any>(&self) -> bool {
		self.entries.contains_key(&TypeId::of::<T>())
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Names of every registered capability, sorted.
	pub fn capabilities(&self) -> Vec<&'static str> {
		let mut names: Vec<_> = self.entries.values().map(|entry| entry.type_name).collect();
		names.sort_unstable();
		names
	}
}

/// Builder for [`InjectableRegistry`].
///
/// Registering a capability twice replaces the earlier provider.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
	entries: HashMap<TypeId, Entry>,
}

impl RegistryBuilder {
	/// Register a singleton value.
	pub fn value<T: Any + Send + Sync>(self, value: T) -> Self {
		self.provider::<T>(Provider::value(value))
	}

	/// Register a supplier evaluated on every resolution.
	pub fn supplier<T, F>(self, func: F) -> Self
	where
		T: Any + Send + Sync,
		F: Fn() -> InjectResult<T> + Send + Sync + 'static,
	{
		self.provider::<T>(Provider::supplier(func))
	}

	/// Register a prepared provider for capability `T`.
	///
	/// The provider must produce values of type `T`.
	pub fn provider<T: Any>(mut self, provider: Provider) -> Self {
		let type_name = std::any::type_name::<T>();
		let previous = self
			.entries
			.insert(TypeId::of::<T>(), Entry { type_name, provider });
		if previous.is_some() {
			tracing::debug!(capability = type_name, "replacing registered injectable");
		}
		self
	}

	/// Merge another builder into this one; its entries win on conflict.
	pub fn extend(mut self, other: RegistryBuilder) -> Self {
		for (capability, entry) in other.entries {
			let type_name = entry.type_name;
			if self.entries.insert(capability, entry).is_some() {
				tracing::debug!(capability = type_name, "replacing registered injectable");
			}
		}
		self
	}

	pub fn build(self) -> InjectableRegistry {
		InjectableRegistry {
			entries: Arc::new(self.entries),
		}
	}
}
