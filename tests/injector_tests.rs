//! Injector behavior against the built-in capabilities
//!
//! These tests verify that:
//! 1. Every built-in capability can be injected when a context is installed
//! 2. Unsupported field types are tolerated only when already initialized
//! 3. Context capabilities fail with a scope violation outside of a scope

use kiln_di::{
	BaseManagerFactory, CallbackRegistry, Configuration, Context, ContextGuard, Inject,
	InjectError, Injector, InjectorBuilder, ManagerFactory, ReadOnlyContext, Settings,
};
use rstest::*;
use std::collections::HashMap;

#[fixture]
fn manager() -> BaseManagerFactory {
	BaseManagerFactory::new()
}

#[fixture]
fn injector(manager: BaseManagerFactory) -> Injector {
	InjectorBuilder::create(manager).build().unwrap()
}

#[fixture]
fn standalone_context() -> ContextGuard {
	Context::enter(Context::standalone())
}

#[derive(Clone, Debug, PartialEq)]
struct Widget;

#[derive(Inject, Default)]
struct UnsupportedHolder {
	#[inject]
	object: Option<Widget>,
}

#[derive(Inject, Default)]
struct CallbacksHolder {
	#[inject]
	object: Option<CallbackRegistry>,
}

#[derive(Inject, Default)]
struct ReadOnlyContextHolder {
	#[inject]
	object: Option<ReadOnlyContext>,
}

#[derive(Inject, Default)]
struct ContextHolder {
	#[inject]
	object: Option<Context>,
}

#[derive(Inject, Default)]
struct ConfigurationHolder {
	#[inject]
	object: Option<Configuration>,
}

#[derive(Inject, Default)]
struct InjectorHolder {
	#[inject]
	object: Option<Injector>,
}

#[derive(Inject)]
struct InitializedHolder {
	#[inject]
	unsupported_initialized_type: String,
	#[inject]
	limits: Vec<u32>,
	#[inject]
	aliases: HashMap<String, String>,
}

impl Default for InitializedHolder {
	fn default() -> Self {
		Self {
			unsupported_initialized_type: "kiln".to_string(),
			limits: vec![1, 2],
			aliases: HashMap::from([("all".to_string(), "all.js".to_string())]),
		}
	}
}

#[derive(Inject, Default)]
struct FailFast {
	#[inject]
	missing: Option<Widget>,
	#[inject]
	config: Option<Configuration>,
}

#[derive(Inject, Default)]
struct PlainFields {
	#[inject]
	config: Option<Configuration>,
	untouched: Option<Configuration>,
	label: String,
}

#[rstest]
fn accepts_initialized_manager(manager: BaseManagerFactory) {
	// Act
	let result = InjectorBuilder::create(manager).build();

	// Assert
	assert!(result.is_ok());
}

#[rstest]
fn missing_registry_is_a_precondition_violation() {
	// Act
	let result = Injector::try_from(None);

	// Assert
	assert!(matches!(result, Err(InjectError::Precondition(_))));
}

#[rstest]
fn cannot_inject_unsupported_and_uninitialized_type(
	injector: Injector,
	#[from(standalone_context)] _scope: ContextGuard,
) {
	// Arrange
	let mut target = UnsupportedHolder::default();

	// Act
	let err = injector.inject(&mut target).unwrap_err();

	// Assert
	match err {
		InjectError::UnsupportedType {
			owner,
			field,
			type_name,
		} => {
			assert!(owner.ends_with("UnsupportedHolder"));
			assert_eq!(field, "object");
			assert!(type_name.ends_with("Widget"));
		}
		other => panic!("expected unsupported type, got {other:?}"),
	}
	assert!(target.object.is_none());
}

#[rstest]
fn injects_callback_registry(
	manager: BaseManagerFactory,
	#[from(standalone_context)] _scope: ContextGuard,
) {
	// Arrange
	let expected = manager.callback_registry().unwrap();
	let injector = InjectorBuilder::create(manager).build().unwrap();
	let mut target = CallbacksHolder::default();

	// Act
	injector.inject(&mut target).unwrap();

	// Assert
	assert_eq!(target.object, Some(expected));
}

#[rstest]
fn injects_read_only_context(injector: Injector) {
	// Arrange
	let context = Context::standalone();
	let _scope = Context::enter(context.clone());
	let mut target = ReadOnlyContextHolder::default();

	// Act
	injector.inject(&mut target).unwrap();

	// Assert
	let view = target.object.expect("context view should be injected");
	assert_eq!(view, context);
	assert_eq!(view.correlation_id(), context.correlation_id());
}

#[rstest]
fn injects_current_context_not_a_snapshot(injector: Injector) {
	// Arrange
	let first = Context::standalone();
	let second = Context::standalone();
	let mut a = ContextHolder::default();
	let mut b = ContextHolder::default();

	// Act
	Context::set(first.clone());
	injector.inject(&mut a).unwrap();
	Context::set(second.clone());
	injector.inject(&mut b).unwrap();
	Context::unset();

	// Assert
	assert_eq!(a.object, Some(first));
	assert_eq!(b.object, Some(second));
}

#[rstest]
fn cannot_inject_context_outside_of_context_scope(injector: Injector) {
	// Arrange
	Context::set(Context::standalone());
	injector
		.inject(&mut ReadOnlyContextHolder::default())
		.unwrap();
	Context::unset();
	let mut target = ReadOnlyContextHolder::default();

	// Act
	let err = injector.inject(&mut target).unwrap_err();

	// Assert
	assert!(err.is_scope_violation());
	assert!(target.object.is_none());
}

#[rstest]
fn context_free_capabilities_do_not_need_a_scope(injector: Injector) {
	// Arrange
	Context::unset();
	let mut target = ConfigurationHolder::default();

	// Act
	let result = injector.inject(&mut target);

	// Assert
	assert!(result.is_ok());
	assert!(target.object.is_some());
}

#[rstest]
fn injects_manager_configuration(#[from(standalone_context)] _scope: ContextGuard) {
	// Arrange
	let settings = Settings {
		debug: false,
		..Settings::default()
	};
	let manager = BaseManagerFactory::with_settings(settings);
	let expected = manager.configuration().unwrap();
	let injector = InjectorBuilder::create(manager).build().unwrap();
	let mut target = ConfigurationHolder::default();

	// Act
	injector.inject(&mut target).unwrap();
	let injected = target.object.expect("configuration should be injected");
	injected.update(|s| s.cache_update_period = 60);

	// Assert
	assert_eq!(injected, expected);
	assert!(!expected.read().debug);
	assert_eq!(expected.read().cache_update_period, 60);
}

#[rstest]
fn injects_itself(injector: Injector) {
	// Arrange
	let mut target = InjectorHolder::default();

	// Act
	injector.inject(&mut target).unwrap();

	// Assert
	assert_eq!(target.object, Some(injector));
}

#[rstest]
fn injects_unsupported_but_initialized_types(
	injector: Injector,
	#[from(standalone_context)] _scope: ContextGuard,
) {
	// Arrange
	let mut target = InitializedHolder::default();

	// Act
	injector.inject(&mut target).unwrap();

	// Assert
	let pristine = InitializedHolder::default();
	assert_eq!(
		target.unsupported_initialized_type,
		pristine.unsupported_initialized_type
	);
	assert_eq!(target.limits, pristine.limits);
	assert_eq!(target.aliases, pristine.aliases);
}

#[rstest]
fn empty_string_counts_as_uninitialized(injector: Injector) {
	// Arrange
	let mut target = InitializedHolder {
		unsupported_initialized_type: String::new(),
		..InitializedHolder::default()
	};

	// Act
	let err = injector.inject(&mut target).unwrap_err();

	// Assert
	assert!(matches!(
		err,
		InjectError::UnsupportedType {
			field: "unsupported_initialized_type",
			..
		}
	));
}

#[rstest]
fn first_failing_field_aborts_the_object(injector: Injector) {
	// Arrange
	let mut target = FailFast::default();

	// Act
	let result = injector.inject(&mut target);

	// Assert
	assert!(result.is_err());
	assert!(target.config.is_none());
}

#[rstest]
fn unmarked_fields_are_never_touched(injector: Injector) {
	// Arrange
	let mut target = PlainFields::default();

	// Act
	injector.inject(&mut target).unwrap();

	// Assert
	assert!(target.config.is_some());
	assert!(target.untouched.is_none());
	assert!(target.label.is_empty());
}

#[rstest]
fn missing_target_fails_fast(injector: Injector) {
	// Act
	let result = injector.inject_optional(None);

	// Assert
	assert!(matches!(result, Err(InjectError::Precondition(_))));
}

#[rstest]
fn present_optional_target_is_injected(injector: Injector) {
	// Arrange
	let mut target = ConfigurationHolder::default();

	// Act
	injector.inject_optional(Some(&mut target)).unwrap();

	// Assert
	assert!(target.object.is_some());
}
