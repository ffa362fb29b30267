//! Injector builder

use crate::injector::InjectorInner;
use crate::{
	CallbackRegistry, Configuration, Context, InjectError, InjectResult, InjectableRegistry,
	Injector, ManagerFactory, RegistryBuilder,
};
use std::any::Any;
use std::sync::{Arc, Weak};

/// Assembles the injectable registry from a [`ManagerFactory`] and freezes it
/// into an [`Injector`].
///
/// Built-in capabilities:
///
/// | Capability           | Provider                                   |
/// |----------------------|--------------------------------------------|
/// | [`Injector`]         | the injector being built                   |
/// | [`Context`]          | the ambient context, read at injection time |
/// | [`ReadOnlyContext`](crate::ReadOnlyContext) | view of the ambient context |
/// | [`Configuration`]    | the manager's configuration                |
/// | [`CallbackRegistry`] | the manager's callback registry            |
///
/// # Examples
///
/// ```
/// use kiln_di::{BaseManagerFactory, InjectorBuilder};
///
/// let injector = InjectorBuilder::create(BaseManagerFactory::new())
///     .with_value(String::from("kiln"))
///     .build()
///     .unwrap();
/// assert!(injector.registry().contains::<String>());
/// ```
#[derive(Default)]
pub struct InjectorBuilder {
	factory: Option<Arc<dyn ManagerFactory>>,
	extra: RegistryBuilder,
}

impl InjectorBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Start a builder for the services of `factory`.
	pub fn create(factory: impl ManagerFactory + 'static) -> Self {
		Self::new().manager_factory(Arc::new(factory))
	}

	pub fn manager_factory(mut self, factory: Arc<dyn ManagerFactory>) -> Self {
		self.factory = Some(factory);
		self
	}

	/// Register an additional singleton capability.
	///
	/// Additional capabilities are registered after the built-in ones and
	/// replace them on conflict.
	pub fn with_value<T: Any + Send + Sync>(mut self, value: T) -> Self {
		self.extra = self.extra.value(value);
		self
	}

	/// Register an additional capability resolved on every injection.
	pub fn with_supplier<T, F>(mut self, func: F) -> Self
	where
		T: Any + Send + Sync,
		F: Fn() -> InjectResult<T> + Send + Sync + 'static,
	{
		self.extra = self.extra.supplier(func);
		self
	}

	/// Freeze the registry and create the injector.
	///
	/// # Errors
	///
	/// [`InjectError::Precondition`] when no manager factory was given, or the
	/// factory provides no configuration or no callback registry.
	pub fn build(self) -> InjectResult<Injector> {
		let factory = self.factory.ok_or_else(|| {
			InjectError::Precondition("injector builder requires a manager factory".to_string())
		})?;
		let configuration = factory.configuration().ok_or_else(|| {
			InjectError::Precondition("manager factory provided no configuration".to_string())
		})?;
		let callbacks = factory.callback_registry().ok_or_else(|| {
			InjectError::Precondition("manager factory provided no callback registry".to_string())
		})?;
		let extra = self.extra;

		let inner = Arc::new_cyclic(|this: &Weak<InjectorInner>| {
			let this = this.clone();
			let registry = InjectableRegistry::builder()
				.supplier(move || {
					this.upgrade().map(Injector::from_inner).ok_or_else(|| {
						InjectError::Precondition("injector is no longer alive".to_string())
					})
				})
				.supplier(Context::get)
				.supplier(|| Context::get().map(|context| context.read_only()))
				.value::<Configuration>(configuration)
				.value::<CallbackRegistry>(callbacks)
				.extend(extra)
				.build();
			InjectorInner::new(registry)
		});

		let injector = Injector::from_inner(inner);
		tracing::debug!(
			capabilities = ?injector.registry().capabilities(),
			"built injector"
		);
		Ok(injector)
	}
}
