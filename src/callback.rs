//! Lifecycle callbacks
//!
//! Hooks fired by the manager around model creation, processing and merging.
//! A failing callback is logged and never stops the others.

use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Receiver of manager lifecycle events. Every hook defaults to a no-op.
pub trait LifecycleCallback: Send + Sync {
	fn on_before_model_created(&self) -> anyhow::Result<()> {
		Ok(())
	}

	fn on_after_model_created(&self) -> anyhow::Result<()> {
		Ok(())
	}

	fn on_before_pre_process(&self) -> anyhow::Result<()> {
		Ok(())
	}

	fn on_after_pre_process(&self) -> anyhow::Result<()> {
		Ok(())
	}

	fn on_before_post_process(&self) -> anyhow::Result<()> {
		Ok(())
	}

	fn on_after_post_process(&self) -> anyhow::Result<()> {
		Ok(())
	}

	fn on_before_merge(&self) -> anyhow::Result<()> {
		Ok(())
	}

	/// Called with the merged content of a group.
	fn on_after_merge(&self, _merged: &str) -> anyhow::Result<()> {
		Ok(())
	}

	fn on_processing_complete(&self) -> anyhow::Result<()> {
		Ok(())
	}
}

/// Shared collection of lifecycle callbacks.
///
/// Clones share the same callbacks; equality is identity.
#[derive(Clone, Default)]
pub struct CallbackRegistry {
	callbacks: Arc<RwLock<Vec<Arc<dyn LifecycleCallback>>>>,
}

impl CallbackRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Add a callback. Callbacks fire in registration order.
	pub fn register(&self, callback: Arc<dyn LifecycleCallback>) {
		self.callbacks.write().push(callback);
	}

	pub fn len(&self) -> usize {
		self.callbacks.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.callbacks.read().is_empty()
	}

	pub fn clear(&self) {
		self.callbacks.write().clear();
	}

	pub fn on_before_model_created(&self) {
		self.dispatch("on_before_model_created", |c| c.on_before_model_created());
	}

	pub fn on_after_model_created(&self) {
		self.dispatch("on_after_model_created", |c| c.on_after_model_created());
	}

	pub fn on_before_pre_process(&self) {
		self.dispatch("on_before_pre_process", |c| c.on_before_pre_process());
	}

	pub fn on_after_pre_process(&self) {
		self.dispatch("on_after_pre_process", |c| c.on_after_pre_process());
	}

	pub fn on_before_post_process(&self) {
		self.dispatch("on_before_post_process", |c| c.on_before_post_process());
	}

	pub fn on_after_post_process(&self) {
		self.dispatch("on_after_post_process", |c| c.on_after_post_process());
	}

	pub fn on_before_merge(&self) {
		self.dispatch("on_before_merge", |c| c.on_before_merge());
	}

	pub fn on_after_merge(&self, merged: &str) {
		self.dispatch("on_after_merge", |c| c.on_after_merge(merged));
	}

	pub fn on_processing_complete(&self) {
		self.dispatch("on_processing_complete", |c| c.on_processing_complete());
	}

	/// Run `hook` on every callback, returning how many failed.
	fn dispatch(
		&self,
		hook: &'static str,
		f: impl Fn(&dyn LifecycleCallback) -> anyhow::Result<()>,
	) -> usize {
		// Snapshot so callbacks may register further callbacks.
		let callbacks: Vec<_> = self.callbacks.read().clone();
		let mut failures = 0;
		for callback in &callbacks {
			if let Err(error) = f(callback.as_ref()) {
				failures += 1;
				tracing::error!(hook, error = %error, "lifecycle callback failed");
			}
		}
		failures
	}

	pub fn ptr_eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.callbacks, &other.callbacks)
	}
}

impl PartialEq for CallbackRegistry {
	fn eq(&self, other: &Self) -> bool {
		self.ptr_eq(other)
	}
}

impl Eq for CallbackRegistry {}

impl fmt::Debug for CallbackRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("CallbackRegistry")
			.field("callbacks", &self.len())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use parking_lot::Mutex;

	#[derive(Default)]
	struct Recorder {
		events: Mutex<Vec<String>>,
	}

	impl LifecycleCallback for Recorder {
		fn on_before_merge(&self) -> anyhow::Result<()> {
			self.events.lock().push("before_merge".into());
			Ok(())
		}

		fn on_after_merge(&self, merged: &str) -> anyhow::Result<()> {
			self.events.lock().push(format!("after_merge:{merged}"));
			Ok(())
		}
	}

	struct Failing;

	impl LifecycleCallback for Failing {
		fn on_before_merge(&self) -> anyhow::Result<()> {
			anyhow::bail!("boom")
		}
	}

	#[test]
	fn failing_callback_does_not_stop_the_others() {
		let registry = CallbackRegistry::new();
		let recorder = Arc::new(Recorder::default());
		registry.register(Arc::new(Failing));
		registry.register(recorder.clone());

		let failures = registry.dispatch("on_before_merge", |c| c.on_before_merge());
		registry.on_after_merge("a{}");

		assert_eq!(failures, 1);
		assert_eq!(*recorder.events.lock(), vec!["before_merge", "after_merge:a{}"]);
	}

	#[test]
	fn clones_share_callbacks() {
		let registry = CallbackRegistry::new();
		let shared = registry.clone();

		shared.register(Arc::new(Failing));

		assert_eq!(registry.len(), 1);
		assert_eq!(registry, shared);
		assert_ne!(registry, CallbackRegistry::new());
	}
}
