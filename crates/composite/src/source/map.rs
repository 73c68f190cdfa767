use std::fmt;

use confstamp_cache::VersionCounter;
use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap as HashMap;

use super::{ConfigSource, DEFAULT_ORDINAL};

/// Mutable in-memory source.
///
/// Every effective change bumps the counters of the configurations this
/// source is attached to. The write lands before the bump, so a reader that
/// observes the new version also observes the new value.
pub struct MapSource {
	name: String,
	ordinal: i32,
	values: RwLock<HashMap<String, String>>,
	watchers: Mutex<Vec<VersionCounter>>,
}

impl MapSource {
	/// Creates an empty source with the default ordinal.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			ordinal: DEFAULT_ORDINAL,
			values: RwLock::new(HashMap::default()),
			watchers: Mutex::new(Vec::new()),
		}
	}

	/// Sets the default ordinal.
	pub fn with_ordinal(mut self, ordinal: i32) -> Self {
		self.ordinal = ordinal;
		self
	}

	/// Seeds the source with `values`.
	pub fn with_values<I, K, V>(self, values: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		self.values
			.write()
			.extend(values.into_iter().map(|(k, v)| (k.into(), v.into())));
		self
	}

	/// Sets `key` to `value`, returning the previous value.
	pub fn set(&self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
		let value = value.into();
		let prev = self.values.write().insert(key.into(), value.clone());
		if prev.as_ref() != Some(&value) {
			self.notify();
		}
		prev
	}

	/// Removes `key`, returning its value.
	pub fn remove(&self, key: &str) -> Option<String> {
		let prev = self.values.write().remove(key);
		if prev.is_some() {
			self.notify();
		}
		prev
	}

	/// Removes every value.
	pub fn clear(&self) {
		let had_values = {
			let mut values = self.values.write();
			let had = !values.is_empty();
			values.clear();
			had
		};
		if had_values {
			self.notify();
		}
	}

	/// Returns the number of stored values.
	pub fn len(&self) -> usize {
		self.values.read().len()
	}

	/// Returns `true` if no values are stored.
	pub fn is_empty(&self) -> bool {
		self.values.read().is_empty()
	}

	fn notify(&self) {
		for version in self.watchers.lock().iter() {
			let now = version.bump();
			tracing::trace!(source = %self.name, version = now, "source changed");
		}
	}
}

impl ConfigSource for MapSource {
	fn name(&self) -> &str {
		&self.name
	}

	fn get(&self, key: &str) -> Option<String> {
		self.values.read().get(key).cloned()
	}

	fn keys(&self) -> Vec<String> {
		self.values.read().keys().cloned().collect()
	}

	fn default_ordinal(&self) -> i32 {
		self.ordinal
	}

	fn watch(&self, version: VersionCounter) {
		let mut watchers = self.watchers.lock();
		if !watchers.iter().any(|w| w.same_counter(&version)) {
			watchers.push(version);
		}
	}
}

impl fmt::Debug for MapSource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MapSource")
			.field("name", &self.name)
			.field("ordinal", &self.ordinal)
			.field("len", &self.len())
			.finish_non_exhaustive()
	}
}
