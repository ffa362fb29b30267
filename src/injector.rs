//! Field injector
//!
//! ## Algorithm
//!
//! For each node of the object graph, starting at the target:
//!
//! 1. Skip the node if its [`ObjectId`] was already visited during this call
//! 2. Discover its marked fields ([`Inject::inject_fields`]) and resolve each
//!    one against the [`InjectableRegistry`]
//! 3. Continue with the node's decorator delegate, if any
//!
//! The first failing field aborts the call. Fields injected before the
//! failure keep their new values; callers must not reuse a partially
//! injected object.

use crate::{FieldInjector, Inject, InjectError, InjectResult, InjectableRegistry, ObjectId};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

pub(crate) struct InjectorInner {
	registry: InjectableRegistry,
}

/// Populates marked fields from an immutable registry.
///
/// Cheap to clone; clones share the registry and are safe to use from
/// concurrent operations.
#[derive(Clone)]
pub struct Injector {
	inner: Arc<InjectorInner>,
}

impl Injector {
	pub fn new(registry: InjectableRegistry) -> Self {
		Self {
			inner: Arc::new(InjectorInner::new(registry)),
		}
	}

	pub(crate) fn from_inner(inner: Arc<InjectorInner>) -> Self {
		Self { inner }
	}

	pub fn registry(&self) -> &InjectableRegistry {
		&self.inner.registry
	}

	/// Inject `target` and every decorator delegate reachable from it.
	///
	/// # Errors
	///
	/// - [`InjectError::UnsupportedType`] for a marked field whose capability
	///   is not registered and which holds its default value
	/// - [`InjectError::NoAmbientContext`] when a context capability is
	///   resolved with no context installed
	///
	/// # Examples
	///
	/// ```
	/// use kiln_di::{Configuration, Inject, InjectorBuilder, BaseManagerFactory};
	///
	/// #[derive(Inject, Default)]
	/// struct Banner {
	///     #[inject]
	///     config: Option<Configuration>,
	/// }
	///
	/// let injector = InjectorBuilder::create(BaseManagerFactory::new()).build().unwrap();
	/// let mut banner = Banner::default();
	/// injector.inject(&mut banner).unwrap();
	/// assert!(banner.config.is_some());
	/// ```
	pub fn inject(&self, target: &mut dyn Inject) -> InjectResult<()> {
		let mut visited: HashSet<ObjectId> = HashSet::new();
		let mut next = Some(target);
		let mut depth = 0usize;

		while let Some(node) = next {
			let id = node.identity();
			if !visited.insert(id) {
				tracing::trace!(object = %id, "already injected, stopping traversal");
				break;
			}

			let mut fields = FieldInjector::new(&self.inner.registry, node.type_name());
			node.inject_fields(&mut fields)?;
			tracing::debug!(
				object = id.type_name(),
				depth,
				injected = fields.injected(),
				"injected object"
			);

			depth += 1;
			next = node.delegate();
		}

		Ok(())
	}

	/// Like [`inject`](Self::inject), but reports a missing target as a
	/// precondition violation instead of silently doing nothing.
	pub fn inject_optional(&self, target: Option<&mut dyn Inject>) -> InjectResult<()> {
		match target {
			Some(target) => self.inject(target),
			None => Err(InjectError::Precondition(
				"cannot inject a missing target".to_string(),
			)),
		}
	}
}

impl InjectorInner {
	pub(crate) fn new(registry: InjectableRegistry) -> Self {
		Self { registry }
	}
}

impl TryFrom<Option<InjectableRegistry>> for Injector {
	type Error = InjectError;

	fn try_from(registry: Option<InjectableRegistry>) -> InjectResult<Self> {
		registry.map(Self::new).ok_or_else(|| {
			InjectError::Precondition("injector requires an injectable registry".to_string())
		})
	}
}

impl fmt::Debug for Injector {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Injector")
			.field("capabilities", &self.inner.registry.capabilities())
			.finish()
	}
}

impl PartialEq for Injector {
	fn eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.inner, &other.inner)
	}
}

impl Eq for Injector {}
