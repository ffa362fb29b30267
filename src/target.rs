//! Injection targets and the decorator contract

use crate::{FieldInjector, InjectResult};
use std::fmt;

/// An object whose marked fields can be populated by an [`Injector`](crate::Injector).
///
/// Usually implemented with `#[derive(Inject)]`. Hand-written implementations
/// are useful for decorators whose delegate is optional or computed.
///
/// # Example
///
/// ```
/// use kiln_di::{CallbackRegistry, Inject};
///
/// #[derive(Inject, Default)]
/// struct Reporter {
///     #[inject]
///     callbacks: Option<CallbackRegistry>,
///     verbose: bool,
/// }
/// ```
pub trait Inject {
	/// Visit every marked field of this object, including the fields of
	/// flattened base values, in declaration order.
	fn inject_fields(&mut self, fields: &mut FieldInjector<'_>) -> InjectResult<()>;

	/// The immediate delegate of a decorator, or `None` when this object does
	/// not wrap anything.
	fn delegate(&mut self) -> Option<&mut dyn Inject> {
		None
	}

	/// Identity used by the visited set.
	fn identity(&self) -> ObjectId {
		ObjectId::new(self as *const Self as *const () as usize, self.type_name())
	}

	/// Concrete type name, used in error messages and logs.
	fn type_name(&self) -> &'static str {
		std::any::type_name::<Self>()
	}
}

/// Boxed targets are transparent: the box has the identity of its contents.
impl<T: Inject + ?Sized> Inject for Box<T> {
	fn inject_fields(&mut self, fields: &mut FieldInjector<'_>) -> InjectResult<()> {
		(**self).inject_fields(fields)
	}

	fn delegate(&mut self) -> Option<&mut dyn Inject> {
		(**self).delegate()
	}

	fn identity(&self) -> ObjectId {
		(**self).identity()
	}

	fn type_name(&self) -> &'static str {
		(**self).type_name()
	}
}

/// Identity of an object within one injection call.
///
/// The concrete type name is part of the identity so that a decorator and a
/// delegate stored inline at offset zero are still told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId {
	addr: usize,
	type_name: &'static str,
}

impl ObjectId {
	pub fn new(addr: usize, type_name: &'static str) -> Self {
		Self { addr, type_name }
	}

	pub fn type_name(&self) -> &'static str {
		self.type_name
	}
}

impl fmt::Display for ObjectId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}@{:#x}", self.type_name, self.addr)
	}
}
