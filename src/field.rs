//! Injectable field slots
//!
//! A field marked with `#[inject]` is a *slot*: it declares which capability it
//! asks for, whether its owner already initialized it, and how a resolved
//! value is stored into it.
//!
//! Defaults that count as "uninitialized":
//!
//! | Slot type                                    | Uninitialized when |
//! |----------------------------------------------|--------------------|
//! | `Option<T>`                                  | `None`             |
//! | `String`, `PathBuf`, `Vec<T>`, `HashMap<K, V>` | empty            |
//! | integers, floats                             | zero               |
//! | `bool`                                       | `false`            |

use crate::{InjectError, InjectResult, InjectableRegistry};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::hash::Hash;
use std::path::PathBuf;

/// A field that can be populated by the injector.
pub trait InjectField {
	/// Capability type this slot asks for.
	fn capability() -> TypeId;

	/// Human readable capability name.
	fn capability_name() -> &'static str;

	/// Whether the slot holds a non-default value.
	fn is_initialized(&self) -> bool;

	/// Store a resolved value. Returns `false` when `value` is not of the
	/// slot's capability type.
	fn assign(&mut self, value: &(dyn Any + Send + Sync)) -> bool;
}

impl<T> InjectField for Option<T>
where
	T: Any + Clone + Send + Sync,
{
	fn capability() -> TypeId {
		TypeId::of::<T>()
	}

	fn capability_name() -> &'static str {
		std::any::type_name::<T>()
	}

	fn is_initialized(&self) -> bool {
		self.is_some()
	}

	fn assign(&mut self, value: &(dyn Any + Send + Sync)) -> bool {
		match value.downcast_ref::<T>() {
			Some(value) => {
				*self = Some(value.clone());
				true
			}
			None => false,
		}
	}
}

/// Slots whose capability is their own type.
macro_rules! self_typed_slot {
	($ty:ty, |$v:ident| $initialized:expr) => {
		impl InjectField for $ty {
			fn capability() -> TypeId {
				TypeId::of::<$ty>()
			}

			fn capability_name() -> &'static str {
				std::any::type_name::<$ty>()
			}

			fn is_initialized(&self) -> bool {
				let $v = self;
				$initialized
			}

			fn assign(&mut self, value: &(dyn Any + Send + Sync)) -> bool {
				match value.downcast_ref::<$ty>() {
					Some(value) => {
						*self = value.clone();
						true
					}
					None => false,
				}
			}
		}
	};
}

self_typed_slot!(String, |v| !v.is_empty());
self_typed_slot!(PathBuf, |v| !v.as_os_str().is_empty());
self_typed_slot!(bool, |v| *v);

macro_rules! numeric_slots {
	($($ty:ty),* $(,)?) => {
		$(self_typed_slot!($ty, |v| *v != 0 as $ty);)*
	};
}

numeric_slots!(
	i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64
);

impl<T> InjectField for Vec<T>
where
	T: Any + Clone + Send + Sync,
{
	fn capability() -> TypeId {
		TypeId::of::<Vec<T>>()
	}

	fn capability_name() -> &'static str {
		std::any::type_name::<Vec<T>>()
	}

	fn is_initialized(&self) -> bool {
		!self.is_empty()
	}

	fn assign(&mut self, value: &(dyn Any + Send + Sync)) -> bool {
		match value.downcast_ref::<Vec<T>>() {
			Some(value) => {
				self.clone_from(value);
				true
			}
			None => false,
		}
	}
}

impl<K, V> InjectField for HashMap<K, V>
where
	K: Any + Clone + Eq + Hash + Send + Sync,
	V: Any + Clone + Send + Sync,
{
	fn capability() -> TypeId {
		TypeId::of::<HashMap<K, V>>()
	}

	fn capability_name() -> &'static str {
		std::any::type_name::<HashMap<K, V>>()
	}

	fn is_initialized(&self) -> bool {
		!self.is_empty()
	}

	fn assign(&mut self, value: &(dyn Any + Send + Sync)) -> bool {
		match value.downcast_ref::<HashMap<K, V>>() {
			Some(value) => {
				self.clone_from(value);
				true
			}
			None => false,
		}
	}
}

/// Resolution step for the fields of a single object.
///
/// Created by the [`Injector`](crate::Injector) for every node of the object
/// graph and handed to [`Inject::inject_fields`](crate::Inject::inject_fields).
pub struct FieldInjector<'a> {
	registry: &'a InjectableRegistry,
	owner: &'static str,
	injected: usize,
}

impl<'a> FieldInjector<'a> {
	pub(crate) fn new(registry: &'a InjectableRegistry, owner: &'static str) -> Self {
		Self {
			registry,
			owner,
			injected: 0,
		}
	}

	/// Resolve one marked field.
	///
	/// A registered capability always overwrites the slot. An unregistered one
	/// is tolerated only if the owner already initialized the slot.
	pub fn field<F: InjectField>(&mut self, name: &'static str, slot: &mut F) -> InjectResult<()> {
		let capability = F::capability();
		let type_name = F::capability_name();

		let Some(provider) = self.registry.provider(capability) else {
			if slot.is_initialized() {
				tracing::trace!(
					owner = self.owner,
					field = name,
					type_name,
					"keeping pre-initialized value of unsupported type"
				);
				return Ok(());
			}
			return Err(InjectError::UnsupportedType {
				owner: self.owner,
				field: name,
				type_name,
			});
		};

		let value = provider.provide()?;
		if !slot.assign(&*value) {
			return Err(InjectError::ProviderMismatch { type_name });
		}

		tracing::trace!(owner = self.owner, field = name, type_name, "injected field");
		self.injected += 1;
		Ok(())
	}

	/// Number of fields populated from the registry so far.
	pub fn injected(&self) -> usize {
		self.injected
	}
}
