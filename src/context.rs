//! Ambient per-operation context
//!
//! A [`Context`] is installed around one logical unit of work (one request,
//! one build) and read by whatever runs inside it, including the injector.
//!
//! ## Scope storage
//!
//! - **Task scope**: [`Context::scope`] opens a slot bound to a future through
//!   a tokio task-local, so it follows the task across worker threads.
//! - **Thread scope**: a per-thread slot used when no task scope is active.
//!
//! [`Context::set`], [`Context::unset`] and the RAII form [`Context::enter`]
//! act on the innermost active slot, and [`Context::get`] reads only that
//! slot. An emptied task slot does not fall back to the thread slot; `get`
//! fails with [`InjectError::NoAmbientContext`] instead.

use crate::{Configuration, InjectError, InjectResult};
use http::Uri;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use uuid::Uuid;

thread_local! {
	static THREAD_CONTEXT: RefCell<Option<Context>> = const { RefCell::new(None) };
}

tokio::task_local! {
	static TASK_CONTEXT: RefCell<Option<Context>>;
}

/// Slot a context was installed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
	Task,
	Thread,
}

struct ContextState {
	config: Configuration,
	correlation_id: Uuid,
	request_uri: Option<Uri>,
	aggregated_folder_path: RwLock<Option<String>>,
	attributes: RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

/// Mutable state of one logical operation.
///
/// Clones share state; equality is identity.
#[derive(Clone)]
pub struct Context {
	state: Arc<ContextState>,
}

impl Context {
	fn with_parts(config: Configuration, request_uri: Option<Uri>) -> Self {
		Self {
			state: Arc::new(ContextState {
				config,
				correlation_id: Uuid::new_v4(),
				request_uri,
				aggregated_folder_path: RwLock::new(None),
				attributes: RwLock::new(HashMap::new()),
			}),
		}
	}

	/// A context usable outside of any request, e.g. in tools and tests.
	///
	/// # Examples
	///
	/// ```
	/// use kiln_di::Context;
	///
	/// let ctx = Context::standalone();
	/// assert!(ctx.request_uri().is_none());
	/// ```
	pub fn standalone() -> Self {
		Self::with_parts(Configuration::default(), None)
	}

	/// A standalone context sharing an existing configuration.
	pub fn with_config(config: Configuration) -> Self {
		Self::with_parts(config, None)
	}

	/// A context bound to an incoming request.
	pub fn web(request_uri: Uri, config: Configuration) -> Self {
		Self::with_parts(config, Some(request_uri))
	}

	pub fn config(&self) -> &Configuration {
		&self.state.config
	}

	/// Unique id of this operation, for log correlation.
	pub fn correlation_id(&self) -> Uuid {
		self.state.correlation_id
	}

	pub fn request_uri(&self) -> Option<&Uri> {
		self.state.request_uri.as_ref()
	}

	/// Folder, relative to the context root, where aggregated resources are served from.
	pub fn aggregated_folder_path(&self) -> Option<String> {
		self.state.aggregated_folder_path.read().clone()
	}

	pub fn set_aggregated_folder_path(&self, path: impl Into<String>) {
		*self.state.aggregated_folder_path.write() = Some(path.into());
	}

	/// Retrieves an operation-scoped value by type.
	///
	/// # Examples
	///
	/// ```
	/// use kiln_di::Context;
	///
	/// let ctx = Context::standalone();
	/// ctx.set_attribute(3usize);
	///
	/// assert_eq!(*ctx.attribute::<usize>().unwrap(), 3);
	/// assert!(ctx.attribute::<String>().is_none());
	/// ```
	pub fn attribute<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
		let attributes = self.state.attributes.read();
		attributes
			.get(&TypeId::of::<T>())
			.and_then(|arc| arc.clone().downcast::<T>().ok())
	}

	/// Stores an operation-scoped value, replacing any previous value of the same type.
	pub fn set_attribute<T: Any + Send + Sync>(&self, value: T) {
		let mut attributes = self.state.attributes.write();
		attributes.insert(TypeId::of::<T>(), Arc::new(value));
	}

	/// Accessor-only view of this context.
	pub fn read_only(&self) -> ReadOnlyContext {
		ReadOnlyContext {
			state: Arc::clone(&self.state),
		}
	}

	pub fn ptr_eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.state, &other.state)
	}
}

/// Ambient holder.
impl Context {
	/// Install `context` for the current scope, replacing any previous one.
	///
	/// Inside [`Context::scope`] this replaces the task's context until the
	/// scope ends; elsewhere it replaces the context of the current thread.
	pub fn set(context: Context) {
		tracing::trace!(correlation_id = %context.correlation_id(), "context set");
		replace_context(Some(context));
	}

	/// Remove the context of the current scope.
	pub fn unset() {
		if let (slot, Some(_)) = replace_context(None) {
			tracing::trace!(?slot, "context unset");
		}
	}

	/// The ambient context.
	///
	/// # Errors
	///
	/// [`InjectError::NoAmbientContext`] when no context is installed.
	pub fn get() -> InjectResult<Context> {
		TASK_CONTEXT
			.try_with(|slot| slot.borrow().clone())
			.unwrap_or_else(|_| THREAD_CONTEXT.with(|slot| slot.borrow().clone()))
			.ok_or(InjectError::NoAmbientContext)
	}

	pub fn is_set() -> bool {
		Self::get().is_ok()
	}

	/// Install `context` for the current scope until the guard is dropped.
	///
	/// # Examples
	///
	/// ```
	/// use kiln_di::Context;
	///
	/// {
	///     let _guard = Context::enter(Context::standalone());
	///     assert!(Context::is_set());
	/// }
	/// assert!(!Context::is_set());
	/// ```
	pub fn enter(context: Context) -> ContextGuard {
		let (slot, previous) = replace_context(Some(context));
		ContextGuard {
			slot,
			previous,
			_not_send: PhantomData,
		}
	}

	/// Run `future` with `context` bound to its task.
	pub async fn scope<F: Future>(context: Context, future: F) -> F::Output {
		TASK_CONTEXT.scope(RefCell::new(Some(context)), future).await
	}

	/// Run `f` with `context` bound to a new task scope.
	pub fn sync_scope<R>(context: Context, f: impl FnOnce() -> R) -> R {
		TASK_CONTEXT.sync_scope(RefCell::new(Some(context)), f)
	}

	/// Capture the ambient context so `f` can run with it on another thread.
	///
	/// # Examples
	///
	/// ```
	/// use kiln_di::Context;
	///
	/// let ctx = Context::standalone();
	/// let _guard = Context::enter(ctx.clone());
	///
	/// let task = Context::decorate(|| Context::get().unwrap().correlation_id()).unwrap();
	/// let id = std::thread::spawn(task).join().unwrap();
	/// assert_eq!(id, ctx.correlation_id());
	/// ```
	pub fn decorate<F, R>(f: F) -> InjectResult<impl FnOnce() -> R + Send + 'static>
	where
		F: FnOnce() -> R + Send + 'static,
	{
		let context = Self::get()?;
		Ok(move || {
			let _guard = Context::enter(context);
			f()
		})
	}
}

/// Swap the context of the innermost active slot.
fn replace_context(context: Option<Context>) -> (Slot, Option<Context>) {
	let mut pending = Some(context);
	match TASK_CONTEXT.try_with(|slot| slot.replace(pending.take().flatten())) {
		Ok(previous) => (Slot::Task, previous),
		Err(_) => {
			let previous = THREAD_CONTEXT.with(|slot| slot.replace(pending.take().flatten()));
			(Slot::Thread, previous)
		}
	}
}

impl PartialEq for Context {
	fn eq(&self, other: &Self) -> bool {
		self.ptr_eq(other)
	}
}

impl Eq for Context {}

impl PartialEq<ReadOnlyContext> for Context {
	fn eq(&self, other: &ReadOnlyContext) -> bool {
		Arc::ptr_eq(&self.state, &other.state)
	}
}

impl fmt::Debug for Context {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Context")
			.field("correlation_id", &self.state.correlation_id)
			.field("request_uri", &self.state.request_uri)
			.finish_non_exhaustive()
	}
}

/// Restores the previously installed context when dropped.
#[must_use = "the context is removed as soon as the guard is dropped"]
pub struct ContextGuard {
	slot: Slot,
	previous: Option<Context>,
	// Thread-local state must be restored on the thread that installed it.
	_not_send: PhantomData<*const ()>,
}

impl Drop for ContextGuard {
	fn drop(&mut self) {
		let previous = self.previous.take();
		match self.slot {
			// A task scope that already ended has nothing left to restore.
			Slot::Task => {
				let _ = TASK_CONTEXT.try_with(|slot| slot.replace(previous));
			}
			Slot::Thread => {
				let _ = THREAD_CONTEXT.with(|slot| slot.replace(previous));
			}
		}
	}
}

/// Accessor-only view of a [`Context`].
#[derive(Clone)]
pub struct ReadOnlyContext {
	state: Arc<ContextState>,
}

impl ReadOnlyContext {
	pub fn config(&self) -> &Configuration {
		&self.state.config
	}

	pub fn correlation_id(&self) -> Uuid {
		self.state.correlation_id
	}

	pub fn request_uri(&self) -> Option<&Uri> {
		self.state.request_uri.as_ref()
	}

	pub fn aggregated_folder_path(&self) -> Option<String> {
		self.state.aggregated_folder_path.read().clone()
	}

	pub fn attribute<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
		let attributes = self.state.attributes.read();
		attributes
			.get(&TypeId::of::<T>())
			.and_then(|arc| arc.clone().downcast::<T>().ok())
	}
}

impl PartialEq for ReadOnlyContext {
	fn eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.state, &other.state)
	}
}

impl Eq for ReadOnlyContext {}

impl PartialEq<Context> for ReadOnlyContext {
	fn eq(&self, other: &Context) -> bool {
		other == self
	}
}

impl fmt::Debug for ReadOnlyContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ReadOnlyContext")
			.field("correlation_id", &self.state.correlation_id)
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn get_without_context_is_a_scope_violation() {
		Context::unset();

		let err = Context::get().unwrap_err();
		assert!(err.is_scope_violation());
	}

	#[test]
	fn guard_restores_previous_context() {
		let outer = Context::standalone();
		let inner = Context::standalone();
		Context::set(outer.clone());

		{
			let _guard = Context::enter(inner.clone());
			assert_eq!(Context::get().unwrap(), inner);
		}

		assert_eq!(Context::get().unwrap(), outer);
		Context::unset();
	}

	#[test]
	fn guard_restores_on_panic() {
		Context::unset();

		let result = std::panic::catch_unwind(|| {
			let _guard = Context::enter(Context::standalone());
			panic!("operation failed");
		});

		assert!(result.is_err());
		assert!(!Context::is_set());
	}

	#[test]
	fn read_only_view_shares_state() {
		let ctx = Context::web(Uri::from_static("/kiln/all.js"), Configuration::default());
		let view = ctx.read_only();

		ctx.set_aggregated_folder_path("kiln");
		ctx.set_attribute(7u32);

		assert_eq!(view.aggregated_folder_path().as_deref(), Some("kiln"));
		assert_eq!(*view.attribute::<u32>().unwrap(), 7);
		assert_eq!(view.request_uri().map(Uri::path), Some("/kiln/all.js"));
		assert_eq!(ctx, view);
		assert_eq!(view, ctx);
		assert!(view.config().ptr_eq(ctx.config()));
	}

	#[test]
	fn sync_scope_takes_precedence_over_thread_scope() {
		let thread_ctx = Context::standalone();
		let task_ctx = Context::standalone();
		let _guard = Context::enter(thread_ctx.clone());

		let seen = Context::sync_scope(task_ctx.clone(), || Context::get().unwrap());

		assert_eq!(seen, task_ctx);
		assert_eq!(Context::get().unwrap(), thread_ctx);
	}

	#[test]
	fn set_and_unset_act_on_the_task_scope() {
		let thread_ctx = Context::standalone();
		let task_ctx = Context::standalone();
		let replacement = Context::standalone();
		let _guard = Context::enter(thread_ctx.clone());

		Context::sync_scope(task_ctx, || {
			Context::set(replacement.clone());
			assert_eq!(Context::get().unwrap(), replacement);

			Context::unset();
			assert!(Context::get().unwrap_err().is_scope_violation());
		});

		assert_eq!(Context::get().unwrap(), thread_ctx);
	}

	#[test]
	fn guard_inside_task_scope_restores_the_task_context() {
		let task_ctx = Context::standalone();
		let inner = Context::standalone();

		Context::sync_scope(task_ctx.clone(), || {
			{
				let _guard = Context::enter(inner.clone());
				assert_eq!(Context::get().unwrap(), inner);
			}
			assert_eq!(Context::get().unwrap(), task_ctx);
		});

		assert!(!Context::is_set());
	}

	#[test]
	fn decorate_requires_an_ambient_context() {
		Context::unset();

		let result = Context::decorate(|| ());

		assert!(matches!(result, Err(InjectError::NoAmbientContext)));
	}
}
