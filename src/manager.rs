//! Manager factory collaborator
//!
//! The injector does not build the asset-processing manager; it only needs
//! the shared services a manager factory owns.

use crate::{CallbackRegistry, Configuration, Settings};

/// Source of the manager-owned injectable services.
///
/// Returning `None` for either service is a caller error reported by
/// [`InjectorBuilder::build`](crate::InjectorBuilder::build).
pub trait ManagerFactory: Send + Sync {
	fn configuration(&self) -> Option<Configuration>;

	fn callback_registry(&self) -> Option<CallbackRegistry>;
}

/// Manager factory holding a configuration and an empty callback registry.
#[derive(Debug, Clone, Default)]
pub struct BaseManagerFactory {
	configuration: Configuration,
	callbacks: CallbackRegistry,
}

impl BaseManagerFactory {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_settings(settings: Settings) -> Self {
		Self::with_configuration(Configuration::new(settings))
	}

	pub fn with_configuration(configuration: Configuration) -> Self {
		Self {
			configuration,
			callbacks: CallbackRegistry::new(),
		}
	}
}

impl ManagerFactory for BaseManagerFactory {
	fn configuration(&self) -> Option<Configuration> {
		Some(self.configuration.clone())
	}

	fn callback_registry(&self) -> Option<CallbackRegistry> {
		Some(self.callbacks.clone())
	}
}
