//! # Kiln Dependency Injection
//!
//! Scoped field injector for the kiln asset-processing manager.
//!
//! ## Features
//!
//! - **Field injection**: `#[derive(Inject)]` marks the fields an [`Injector`] may populate
//! - **Decorator aware**: injection walks through any number of wrapping decorators
//! - **Scoped**: manager-wide singletons plus an ambient per-operation [`Context`]
//! - **Tolerant**: unknown field types are accepted as long as they are already initialized
//!
//! ## Example
//!
//! ```rust
//! use kiln_di::{
//!     BaseManagerFactory, CallbackRegistry, Context, CopyrightKeeperDecorator, Inject,
//!     InjectorBuilder, ReadOnlyContext, ResourceProcessor,
//! };
//!
//! #[derive(Inject, Default)]
//! struct Minifier {
//!     #[inject]
//!     context: Option<ReadOnlyContext>,
//!     #[inject]
//!     callbacks: Option<CallbackRegistry>,
//! }
//!
//! impl ResourceProcessor for Minifier {
//!     fn process(&self, content: &str) -> anyhow::Result<String> {
//!         Ok(content.split_whitespace().collect())
//!     }
//! }
//!
//! let injector = InjectorBuilder::create(BaseManagerFactory::new()).build().unwrap();
//! let context = Context::standalone();
//! let _scope = Context::enter(context.clone());
//!
//! let mut processor = CopyrightKeeperDecorator::decorate(Minifier::default());
//! injector.inject(&mut processor).unwrap();
//!
//! assert_eq!(processor.inner().context.as_ref(), Some(&context.read_only()));
//! ```
//!
//! ## Ambient context
//!
//! ```rust
//! use kiln_di::Context;
//!
//! # async fn handle() {
//! let result = Context::scope(Context::standalone(), async {
//!     Context::get().map(|ctx| ctx.correlation_id())
//! })
//! .await;
//! assert!(result.is_ok());
//! # }
//! ```

// Lets `#[derive(Inject)]` expand inside this crate.
extern crate self as kiln_di;

pub mod builder;
pub mod callback;
pub mod config;
pub mod context;
pub mod error;
pub mod field;
pub mod injector;
pub mod manager;
pub mod processor;
pub mod provider;
pub mod registry;
pub mod target;

pub use builder::InjectorBuilder;
pub use callback::{CallbackRegistry, LifecycleCallback};
pub use config::{ConfigError, Configuration, Settings};
pub use context::{Context, ContextGuard, ReadOnlyContext};
pub use error::{InjectError, InjectResult};
pub use field::{FieldInjector, InjectField};
pub use injector::Injector;
pub use manager::{BaseManagerFactory, ManagerFactory};
pub use processor::{CopyrightKeeperDecorator, ResourceProcessor};
pub use provider::{Provider, ProviderFn, SharedAny};
pub use registry::{InjectableRegistry, RegistryBuilder};
pub use target::{Inject, ObjectId};

pub use kiln_di_macros::Inject;
