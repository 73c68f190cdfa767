use ::toml::{Table, Value};
use rustc_hash::FxHashMap as HashMap;

use super::ConfigSource;
use crate::Result;

/// Immutable source parsed from a TOML document.
///
/// Tables flatten into dotted keys. Arrays of scalars become one
/// comma-separated value with embedded backslashes and commas escaped as `\\`
/// and `\,`; arrays holding tables or arrays flatten element-wise under
/// `key[index]`.
///
/// ```toml
/// [server]
/// port = 8080
/// hosts = ["a", "b"]
/// ```
///
/// yields `server.port = "8080"` and `server.hosts = "a,b"`.
#[derive(Debug, Clone)]
pub struct TomlSource {
	name: String,
	values: HashMap<String, String>,
}

impl TomlSource {
	/// Parses `text` into a source called `name`.
	pub fn parse(name: impl Into<String>, text: &str) -> Result<Self> {
		let table: Table = ::toml::from_str(text)?;
		let mut values = HashMap::default();
		flatten_table(None, &table, &mut values);
		Ok(Self {
			name: name.into(),
			values,
		})
	}

	/// Returns the number of flattened properties.
	pub fn len(&self) -> usize {
		self.values.len()
	}

	/// Returns `true` if the document held no values.
	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}
}

fn join(prefix: Option<&str>, key: &str) -> String {
	match prefix {
		Some(prefix) => format!("{prefix}.{key}"),
		None => key.to_string(),
	}
}

fn flatten_table(prefix: Option<&str>, table: &Table, out: &mut HashMap<String, String>) {
	for (key, value) in table {
		flatten_value(join(prefix, key), value, out);
	}
}

fn flatten_value(key: String, value: &Value, out: &mut HashMap<String, String>) {
	match value {
		Value::Table(table) => flatten_table(Some(&key), table, out),
		Value::Array(items) if items.iter().all(is_scalar) => {
			let joined = items
				.iter()
				.filter_map(scalar)
				.map(|s| s.replace('\\', "\\\\").replace(',', "\\,"))
				.collect::<Vec<_>>()
				.join(",");
			out.insert(key, joined);
		}
		Value::Array(items) => {
			for (i, item) in items.iter().enumerate() {
				flatten_value(format!("{key}[{i}]"), item, out);
			}
		}
		other => {
			if let Some(s) = scalar(other) {
				out.insert(key, s);
			}
		}
	}
}

fn is_scalar(value: &Value) -> bool {
	!matches!(value, Value::Table(_) | Value::Array(_))
}

fn scalar(value: &Value) -> Option<String> {
	match value {
		Value::String(s) => Some(s.clone()),
		Value::Integer(i) => Some(i.to_string()),
		Value::Float(f) => Some(f.to_string()),
		Value::Boolean(b) => Some(b.to_string()),
		Value::Datetime(d) => Some(d.to_string()),
		Value::Table(_) | Value::Array(_) => None,
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &str {
		&self.name
	}

	fn get(&self, key: &str) -> Option<String> {
		self.values.get(key).cloned()
	}

	fn keys(&self) -> Vec<String> {
		self.values.keys().cloned().collect()
	}
}
