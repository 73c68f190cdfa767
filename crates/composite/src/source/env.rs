use rustc_hash::FxHashMap as HashMap;

use super::ConfigSource;

/// Ordinal of environment variables.
pub const ENV_ORDINAL: i32 = 300;

/// Snapshot of environment variables.
///
/// A key is looked up as written, then with every non-alphanumeric character
/// replaced by `_`, then additionally upper-cased: `server.port` matches
/// `server.port`, `server_port` or `SERVER_PORT`. The snapshot is taken at
/// construction; later changes to the process environment are not seen.
#[derive(Debug, Clone)]
pub struct EnvSource {
	name: String,
	vars: HashMap<String, String>,
}

impl EnvSource {
	/// Captures the current process environment.
	pub fn new() -> Self {
		Self::from_vars(std::env::vars())
	}

	/// Captures only variables starting with `prefix`, with the prefix stripped.
	pub fn with_prefix(prefix: &str) -> Self {
		let vars = std::env::vars()
			.filter_map(|(k, v)| k.strip_prefix(prefix).map(|rest| (rest.to_string(), v)))
			.filter(|(k, _)| !k.is_empty());
		Self::from_vars(vars)
	}

	/// Builds a source from explicit variables.
	pub fn from_vars<I, K, V>(vars: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		Self {
			name: "env".to_string(),
			vars: vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
		}
	}

	/// Renames the source.
	pub fn named(mut self, name: impl Into<String>) -> Self {
		self.name = name.into();
		self
	}
}

impl Default for EnvSource {
	fn default() -> Self {
		Self::new()
	}
}

fn sanitize(key: &str) -> String {
	key.chars()
		.map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
		.collect()
}

impl ConfigSource for EnvSource {
	fn name(&self) -> &str {
		&self.name
	}

	fn get(&self, key: &str) -> Option<String> {
		if let Some(v) = self.vars.get(key) {
			return Some(v.clone());
		}
		let sanitized = sanitize(key);
		if let Some(v) = self.vars.get(&sanitized) {
			return Some(v.clone());
		}
		self.vars.get(&sanitized.to_ascii_uppercase()).cloned()
	}

	fn keys(&self) -> Vec<String> {
		self.vars.keys().cloned().collect()
	}

	fn default_ordinal(&self) -> i32 {
		ENV_ORDINAL
	}
}
