//! Composite configuration over ordered sources.
//!
//! # Role
//!
//! [`Config`] owns the shared [`VersionCounter`], the ordered source list and
//! one [`TypeContainer`] per property name. Lookups go through the container,
//! so repeated reads at an unchanged version are answered from the cache.
//!
//! # Invariants
//!
//! - Every source mutation (attached [`MapSource`](crate::MapSource) writes,
//!   [`Config::add_source`], [`Config::remove_source`], [`Config::refresh`])
//!   bumps the counter, which marks every cached value stale.
//! - The source list is an immutable snapshot replaced by compare-and-swap;
//!   resolution never observes a half-updated list.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;
use confstamp_cache::{Resolver, SourcedValue, TypeContainer, ValueType, VersionCounter};
use parking_lot::RwLock;
use rustc_hash::FxHashMap as HashMap;

use crate::convert::Converters;
use crate::source::{ConfigSource, EnvSource, TomlSource, cmp_priority};
use crate::{ConfigError, Result};

#[cfg(test)]
mod tests;

/// Provenance reported for builder-registered defaults.
pub const DEFAULT_SOURCE: &str = "default";

type PropertyCache = TypeContainer<Layers, VersionCounter>;

/// Resolution state shared between a [`Config`] and its property caches.
pub(crate) struct Layers {
	sources: ArcSwap<Vec<Arc<dyn ConfigSource>>>,
	defaults: HashMap<String, String>,
	converters: Converters,
	version: VersionCounter,
}

impl Layers {
	fn convert(&self, ty: ValueType, key: &str, raw: &str, source: &str) -> Result<SourcedValue> {
		let converted = self
			.converters
			.convert(ty, raw)
			.ok_or(ConfigError::MissingConverter(ty.name()))?;
		match converted {
			Ok(value) => Ok(SourcedValue::from_erased(value, ty, source)),
			Err(reason) => {
				tracing::debug!(key, source, ty = ty.name(), %reason, "conversion failed");
				Err(ConfigError::Conversion {
					key: key.to_string(),
					type_name: ty.name(),
					value: raw.to_string(),
					reason,
				})
			}
		}
	}

	/// Re-sorts the source list by current priority.
	fn resort(&self) {
		loop {
			let cur = self.sources.load_full();
			let mut next = (*cur).clone();
			next.sort_by(cmp_priority);

			let prev = self.sources.compare_and_swap(&cur, Arc::new(next));
			if Arc::ptr_eq(&prev, &cur) {
				return;
			}
		}
	}

	/// Replaces the source list through `edit`, retrying on concurrent edits.
	fn update_sources<T>(
		&self,
		mut edit: impl FnMut(&mut Vec<Arc<dyn ConfigSource>>) -> Result<T>,
	) -> Result<T> {
		loop {
			let cur = self.sources.load_full();
			let mut next = (*cur).clone();
			let out = edit(&mut next)?;
			next.sort_by(cmp_priority);

			let prev = self.sources.compare_and_swap(&cur, Arc::new(next));
			if Arc::ptr_eq(&prev, &cur) {
				return Ok(out);
			}
		}
	}
}

impl Resolver for Layers {
	type Error = ConfigError;

	fn resolve(&self, ty: ValueType, key: &str) -> Result<Option<SourcedValue>> {
		let sources = self.sources.load();
		for source in sources.iter() {
			if let Some(raw) = source.get(key)
				&& !raw.trim().is_empty()
			{
				tracing::trace!(key, source = source.name(), ty = ty.name(), "resolved from source");
				return self.convert(ty, key, &raw, source.name()).map(Some);
			}
		}
		if let Some(raw) = self.defaults.get(key)
			&& !raw.trim().is_empty()
		{
			return self.convert(ty, key, raw, DEFAULT_SOURCE).map(Some);
		}
		Ok(None)
	}
}

/// Layered configuration with a lazily revalidated property cache.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use confstamp_composite::{Config, MapSource};
///
/// let overrides = Arc::new(MapSource::new("overrides").with_ordinal(400));
/// let config = Config::builder()
/// 	.with_default("timeout", "5")
/// 	.with_shared_source(overrides.clone())
/// 	.build()
/// 	.unwrap();
///
/// assert_eq!(config.get_value::<i32>("timeout").unwrap(), 5);
///
/// overrides.set("timeout", "10");
/// assert_eq!(config.get_value::<i32>("timeout").unwrap(), 10);
/// ```
pub struct Config {
	layers: Arc<Layers>,
	properties: RwLock<HashMap<Arc<str>, Arc<PropertyCache>>>,
}

impl Config {
	/// Starts building a configuration.
	pub fn builder() -> ConfigBuilder {
		ConfigBuilder::new()
	}

	fn property(&self, key: &str) -> Arc<PropertyCache> {
		if let Some(found) = self.properties.read().get(key) {
			return Arc::clone(found);
		}
		let mut properties = self.properties.write();
		let entry = properties.entry(Arc::from(key)).or_insert_with(|| {
			Arc::new(TypeContainer::new(key, Arc::clone(&self.layers), self.layers.version.clone()))
		});
		Arc::clone(entry)
	}

	/// Returns the value of `key` as `T` together with its provenance.
	pub fn get_sourced<T: Any>(&self, key: &str) -> Result<Option<SourcedValue>> {
		self.property(key).as_type(ValueType::of::<T>()).get_sourced()
	}

	/// Returns the value of `key` as `T`, or `None` if no source has it.
	pub fn get_optional_value<T>(&self, key: &str) -> Result<Option<T>>
	where
		T: Any + Clone + Send + Sync,
	{
		let Some(sourced) = self.get_sourced::<T>(key)? else {
			return Ok(None);
		};
		sourced
			.downcast_ref::<T>()
			.cloned()
			.map(Some)
			.ok_or_else(|| ConfigError::TypeMismatch {
				key: key.to_string(),
				expected: std::any::type_name::<T>(),
				found: sourced.value_type().name(),
			})
	}

	/// Returns the value of `key` as `T`.
	///
	/// # Errors
	///
	/// [`ConfigError::NoSuchElement`] if no source and no default supply it.
	pub fn get_value<T>(&self, key: &str) -> Result<T>
	where
		T: Any + Clone + Send + Sync,
	{
		self.get_optional_value::<T>(key)?
			.ok_or_else(|| ConfigError::NoSuchElement {
				key: key.to_string(),
				type_name: std::any::type_name::<T>(),
			})
	}

	/// Returns every property name known to any source or default, sorted.
	pub fn property_names(&self) -> Vec<String> {
		let mut names: Vec<String> = self
			.layers
			.sources
			.load()
			.iter()
			.flat_map(|s| s.keys())
			.chain(self.layers.defaults.keys().cloned())
			.collect();
		names.sort_unstable();
		names.dedup();
		names
	}

	/// Returns the sources in resolution order.
	pub fn sources(&self) -> Vec<Arc<dyn ConfigSource>> {
		self.layers.sources.load().to_vec()
	}

	/// Adds a source and invalidates every cached value.
	pub fn add_source(&self, source: Arc<dyn ConfigSource>) -> Result<()> {
		let name = source.name().to_string();
		self.layers.update_sources(|sources| {
			if sources.iter().any(|s| s.name() == name) {
				return Err(ConfigError::DuplicateSource(name.clone()));
			}
			sources.push(Arc::clone(&source));
			Ok(())
		})?;
		source.watch(self.layers.version.clone());
		let version = self.layers.version.bump();
		tracing::debug!(source = %name, ordinal = source.ordinal(), version, "config source added");
		Ok(())
	}

	/// Removes the source called `name` and invalidates every cached value.
	///
	/// A removed mutable source keeps bumping this configuration's version on
	/// change; that only costs spurious revalidation.
	pub fn remove_source(&self, name: &str) -> Result<Arc<dyn ConfigSource>> {
		let removed = self.layers.update_sources(|sources| {
			let idx = sources
				.iter()
				.position(|s| s.name() == name)
				.ok_or_else(|| ConfigError::UnknownSource(name.to_string()))?;
			Ok(sources.remove(idx))
		})?;
		let version = self.layers.version.bump();
		tracing::debug!(source = name, version, "config source removed");
		Ok(removed)
	}

	/// Re-sorts sources by their current ordinals and invalidates every
	/// cached value. Returns the new version.
	///
	/// Needed after changes a source cannot announce itself, such as a
	/// `config_ordinal` edit.
	pub fn refresh(&self) -> u64 {
		self.layers.resort();
		let version = self.layers.version.bump();
		tracing::debug!(version, "config refreshed");
		version
	}

	/// Returns the current configuration version.
	pub fn version(&self) -> u64 {
		self.layers.version.get()
	}

	/// Returns a handle on the shared version counter.
	pub fn version_counter(&self) -> VersionCounter {
		self.layers.version.clone()
	}

	/// Returns the number of property names with a cache entry.
	pub fn cached_properties(&self) -> usize {
		self.properties.read().len()
	}
}

impl fmt::Debug for Config {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let sources = self.layers.sources.load();
		let names: Vec<_> = sources.iter().map(|s| s.name()).collect();
		f.debug_struct("Config")
			.field("version", &self.version())
			.field("sources", &names)
			.field("cached_properties", &self.cached_properties())
			.finish_non_exhaustive()
	}
}

/// Builder for [`Config`].
pub struct ConfigBuilder {
	sources: Vec<Arc<dyn ConfigSource>>,
	defaults: HashMap<String, String>,
	converters: Converters,
}

impl Default for ConfigBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigBuilder {
	/// Creates a builder with the built-in converters and no sources.
	pub fn new() -> Self {
		Self {
			sources: Vec::new(),
			defaults: HashMap::default(),
			converters: Converters::builtin(),
		}
	}

	/// Adds an owned source.
	pub fn with_source(self, source: impl ConfigSource + 'static) -> Self {
		self.with_shared_source(Arc::new(source))
	}

	/// Adds a source the caller keeps a handle on, e.g. a mutable
	/// [`MapSource`](crate::MapSource).
	pub fn with_shared_source(mut self, source: Arc<dyn ConfigSource>) -> Self {
		self.sources.push(source);
		self
	}

	/// Adds a snapshot of the process environment.
	pub fn with_env(self) -> Self {
		self.with_source(EnvSource::new())
	}

	/// Parses `text` as TOML and adds it as a source called `name`.
	pub fn with_toml_str(self, name: impl Into<String>, text: &str) -> Result<Self> {
		Ok(self.with_source(TomlSource::parse(name, text)?))
	}

	/// Registers a fallback used when no source supplies `key`.
	pub fn with_default(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.defaults.insert(key.into(), value.into());
		self
	}

	/// Registers a converter for `T`, replacing any built-in.
	pub fn with_converter<T, E, F>(mut self, convert: F) -> Self
	where
		T: Any + Send + Sync,
		E: fmt::Display,
		F: Fn(&str) -> std::result::Result<T, E> + Send + Sync + 'static,
	{
		self.converters.register::<T, E, F>(convert);
		self
	}

	/// Builds the configuration.
	///
	/// # Errors
	///
	/// [`ConfigError::DuplicateSource`] if two sources share a name.
	pub fn build(self) -> Result<Config> {
		let mut sources = self.sources;
		for (i, source) in sources.iter().enumerate() {
			if sources[..i].iter().any(|s| s.name() == source.name()) {
				return Err(ConfigError::DuplicateSource(source.name().to_string()));
			}
		}
		sources.sort_by(cmp_priority);

		let version = VersionCounter::new();
		for source in &sources {
			source.watch(version.clone());
		}
		tracing::debug!(
			sources = sources.len(),
			defaults = self.defaults.len(),
			"config built"
		);

		Ok(Config {
			layers: Arc::new(Layers {
				sources: ArcSwap::from_pointee(sources),
				defaults: self.defaults,
				converters: self.converters,
				version,
			}),
			properties: RwLock::new(HashMap::default()),
		})
	}
}
