//! Configuration sources.
//!
//! A [`ConfigSource`] supplies raw string values by key. Sources are consulted
//! in descending [ordinal](ConfigSource::ordinal) order; the first one with a
//! non-empty value wins.
//!
//! | Source          | Default ordinal |
//! |-----------------|-----------------|
//! | [`EnvSource`]   | 300             |
//! | [`MapSource`]   | 100             |
//! | [`TomlSource`]  | 100             |
//!
//! Any source can override its default by carrying a `config_ordinal`
//! property of its own.

use std::cmp::Ordering;
use std::sync::Arc;

use confstamp_cache::VersionCounter;

mod env;
mod map;
mod toml_file;

pub use env::{ENV_ORDINAL, EnvSource};
pub use map::MapSource;
pub use toml_file::TomlSource;


/// Property a source may carry to override its default ordinal.
pub const CONFIG_ORDINAL: &str = "config_ordinal";

/// Ordinal used by sources that do not specify one.
pub const DEFAULT_ORDINAL: i32 = 100;

/// A provider of raw configuration values.
pub trait ConfigSource: Send + Sync {
	/// Unique name of this source, also used as provenance.
	fn name(&self) -> &str;

	/// Returns the raw value for `key`, if present.
	fn get(&self, key: &str) -> Option<String>;

	/// Returns every key this source currently holds.
	fn keys(&self) -> Vec<String>;

	/// Ordinal used when the source has no `config_ordinal` property.
	fn default_ordinal(&self) -> i32 {
		DEFAULT_ORDINAL
	}

	/// Effective ordinal. Higher ordinals take precedence.
	fn ordinal(&self) -> i32 {
		self.get(CONFIG_ORDINAL)
			.and_then(|raw| raw.trim().parse().ok())
			.unwrap_or_else(|| self.default_ordinal())
	}

	/// Registers a counter to bump whenever this source's contents change.
	///
	/// Immutable sources ignore it.
	fn watch(&self, _version: VersionCounter) {}
}

/// Orders sources by descending ordinal, then ascending name.
pub(crate) fn cmp_priority(a: &Arc<dyn ConfigSource>, b: &Arc<dyn ConfigSource>) -> Ordering {
	b.ordinal()
		.cmp(&a.ordinal())
		.then_with(|| a.name().cmp(b.name()))
}
