//! Manager configuration
//!
//! [`Settings`] is the plain, serde-loadable value. [`Configuration`] is the
//! shared, mutable handle that the manager owns and the injector hands out.

use parking_lot::{RwLock, RwLockReadGuard};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Settings file could not be read.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	/// Settings file is not valid TOML or has unexpected values.
	#[error("Parse error: {0}")]
	Parse(#[from] toml::de::Error),
}

/// Tunable behavior of the asset-processing manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
	/// Development mode: more logging, no caching headers.
	pub debug: bool,
	pub gzip_enabled: bool,
	pub minimize_enabled: bool,
	pub ignore_missing_resources: bool,
	pub ignore_empty_group: bool,
	pub ignore_failing_processor: bool,
	pub parallel_preprocessing: bool,
	pub cache_gzipped_content: bool,
	/// Seconds between cache refreshes; 0 disables.
	pub cache_update_period: u64,
	/// Seconds between model reloads; 0 disables.
	pub model_update_period: u64,
	/// Seconds between resource change checks; 0 disables.
	pub resource_watcher_update_period: u64,
	/// Milliseconds allowed for remote resource fetches.
	pub connection_timeout: u64,
	pub encoding: String,
	/// Extra response headers, `Name: value` lines separated by `|`.
	pub header: Option<String>,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			debug: true,
			gzip_enabled: true,
			minimize_enabled: true,
			ignore_missing_resources: true,
			ignore_empty_group: true,
			ignore_failing_processor: false,
			parallel_preprocessing: false,
			cache_gzipped_content: true,
			cache_update_period: 0,
			model_update_period: 0,
			resource_watcher_update_period: 0,
			connection_timeout: 2000,
			encoding: "UTF-8".to_string(),
			header: None,
		}
	}
}

impl Settings {
	/// Parse settings from a TOML document. Missing keys keep their defaults.
	///
	/// # Examples
	///
	/// ```
	/// use kiln_di::Settings;
	///
	/// let settings = Settings::from_toml_str("debug = false\ncache_update_period = 30").unwrap();
	/// assert!(!settings.debug);
	/// assert_eq!(settings.cache_update_period, 30);
	/// assert!(settings.gzip_enabled);
	/// ```
	pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(source)?)
	}

	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let source = std::fs::read_to_string(path)?;
		tracing::debug!(path = %path.display(), "loading manager settings");
		Self::from_toml_str(&source)
	}
}

/// Shared, mutable configuration handle.
///
/// Clones share the same settings; equality is identity.
#[derive(Clone, Default)]
pub struct Configuration {
	inner: Arc<RwLock<Settings>>,
}

impl Configuration {
	pub fn new(settings: Settings) -> Self {
		Self {
			inner: Arc::new(RwLock::new(settings)),
		}
	}

	/// Borrow the current settings.
	pub fn read(&self) -> RwLockReadGuard<'_, Settings> {
		self.inner.read()
	}

	/// Copy of the current settings.
	pub fn snapshot(&self) -> Settings {
		self.inner.read().clone()
	}

	/// Mutate the settings in place. Every holder of this handle observes the change.
	pub fn update<R>(&self, f: impl FnOnce(&mut Settings) -> R) -> R {
		f(&mut self.inner.write())
	}

	pub fn ptr_eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.inner, &other.inner)
	}
}

impl PartialEq for Configuration {
	fn eq(&self, other: &Self) -> bool {
		self.ptr_eq(other)
	}
}

impl Eq for Configuration {}

impl fmt::Debug for Configuration {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Configuration").field(&*self.inner.read()).finish()
	}
}
