//! Resource processor boundary
//!
//! Processors themselves live in the asset pipeline. This module only
//! defines the contract the injector sees and the decorators that ship with
//! the manager.

use crate::Inject;
use regex::Regex;
use std::sync::LazyLock;

/// Transforms the content of one resource.
pub trait ResourceProcessor: Inject + Send + Sync {
	fn process(&self, content: &str) -> anyhow::Result<String>;
}

impl<P: ResourceProcessor + ?Sized> ResourceProcessor for Box<P> {
	fn process(&self, content: &str) -> anyhow::Result<String> {
		(**self).process(content)
	}
}

/// `/*! ... */` comments mark content that must survive minification.
static COPYRIGHT_COMMENT: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?s)/\*!.*?\*/").unwrap_or_else(|e| panic!("invalid copyright pattern: {e}"))
});

/// Keeps `/*! ... */` copyright headers that the wrapped processor removes.
///
/// # Examples
///
/// ```
/// use kiln_di::{CopyrightKeeperDecorator, Inject, ResourceProcessor};
///
/// #[derive(Inject)]
/// struct StripComments;
///
/// impl ResourceProcessor for StripComments {
///     fn process(&self, content: &str) -> anyhow::Result<String> {
///         Ok(content.lines().filter(|l| !l.trim_start().starts_with("/*")).collect())
///     }
/// }
///
/// let processor = CopyrightKeeperDecorator::decorate(StripComments);
/// let output = processor.process("/*! (c) kiln */\nvar a = 1;").unwrap();
/// assert_eq!(output, "/*! (c) kiln */\nvar a = 1;");
/// ```
#[derive(Inject)]
pub struct CopyrightKeeperDecorator<P: ResourceProcessor> {
	#[inject(delegate)]
	inner: P,
}

impl<P: ResourceProcessor> CopyrightKeeperDecorator<P> {
	pub fn decorate(inner: P) -> Self {
		Self { inner }
	}

	pub fn inner(&self) -> &P {
		&self.inner
	}

	pub fn into_inner(self) -> P {
		self.inner
	}
}

impl<P: ResourceProcessor> ResourceProcessor for CopyrightKeeperDecorator<P> {
	fn process(&self, content: &str) -> anyhow::Result<String> {
		let processed = self.inner.process(content)?;

		let missing: Vec<&str> = COPYRIGHT_COMMENT
			.find_iter(content)
			.map(|m| m.as_str())
			.filter(|header| !processed.contains(header))
			.collect();
		if missing.is_empty() {
			return Ok(processed);
		}

		let mut output = missing.join("\n");
		output.push('\n');
		output.push_str(&processed);
		Ok(output)
	}
}
