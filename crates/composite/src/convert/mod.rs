//! String-to-type conversion for raw property values.
//!
//! [`Converters::builtin`] covers strings, booleans, integers, floats, `char`
//! and comma-separated lists. Custom converters are registered per target
//! type and replace any built-in for the same type.

use std::any::Any;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use confstamp_cache::ValueType;
use rustc_hash::FxHashMap as HashMap;


/// Type-erased converted value.
pub type Erased = Arc<dyn Any + Send + Sync>;

type ConvertFn = Arc<dyn Fn(&str) -> Result<Erased, String> + Send + Sync>;

/// Registry of converters keyed by target type.
#[derive(Clone, Default)]
pub struct Converters {
	by_type: HashMap<ValueType, ConvertFn>,
}

impl Converters {
	/// Creates a registry with no converters.
	pub fn empty() -> Self {
		Self::default()
	}

	/// Creates a registry with the built-in converters.
	pub fn builtin() -> Self {
		let mut c = Self::empty();
		c.register::<String, std::convert::Infallible, _>(|raw| Ok(raw.to_string()));
		c.register::<bool, std::convert::Infallible, _>(|raw| Ok(parse_bool(raw)));
		c.register_from_str::<i8>();
		c.register_from_str::<i16>();
		c.register_from_str::<i32>();
		c.register_from_str::<i64>();
		c.register_from_str::<u8>();
		c.register_from_str::<u16>();
		c.register_from_str::<u32>();
		c.register_from_str::<u64>();
		c.register_from_str::<usize>();
		c.register_from_str::<f32>();
		c.register_from_str::<f64>();
		c.register::<char, String, _>(parse_char);
		c.register::<Vec<String>, std::convert::Infallible, _>(|raw| Ok(split_list(raw)));
		c
	}

	/// Registers `convert` for `T`, replacing any previous converter.
	pub fn register<T, E, F>(&mut self, convert: F)
	where
		T: Any + Send + Sync,
		E: fmt::Display,
		F: Fn(&str) -> Result<T, E> + Send + Sync + 'static,
	{
		let erased: ConvertFn = Arc::new(move |raw: &str| {
			convert(raw)
				.map(|v| Arc::new(v) as Erased)
				.map_err(|e| e.to_string())
		});
		self.by_type.insert(ValueType::of::<T>(), erased);
	}

	/// Registers a converter for `T` based on its [`FromStr`] impl, ignoring
	/// surrounding whitespace.
	pub fn register_from_str<T>(&mut self)
	where
		T: FromStr + Any + Send + Sync,
		T::Err: fmt::Display,
	{
		self.register::<T, T::Err, _>(|raw| raw.trim().parse::<T>());
	}

	/// Returns `true` if `ty` has a converter.
	pub fn supports(&self, ty: ValueType) -> bool {
		self.by_type.contains_key(&ty)
	}

	/// Converts `raw` to `ty`. `None` if no converter is registered.
	pub fn convert(&self, ty: ValueType, raw: &str) -> Option<Result<Erased, String>> {
		self.by_type.get(&ty).map(|convert| convert(raw))
	}
}

impl fmt::Debug for Converters {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_set().entries(self.by_type.keys()).finish()
	}
}

/// `true`, `1`, `yes`, `y` and `on` (any case) are true; anything else is false.
pub fn parse_bool(raw: &str) -> bool {
	matches!(
		raw.trim().to_ascii_lowercase().as_str(),
		"true" | "1" | "yes" | "y" | "on"
	)
}

fn parse_char(raw: &str) -> Result<char, String> {
	let mut chars = raw.chars();
	match (chars.next(), chars.next()) {
		(Some(c), None) => Ok(c),
		_ => Err(format!("expected exactly one character, got {}", raw.chars().count())),
	}
}

/// Splits a comma-separated list. `\,` is a literal comma and `\\` a literal
/// backslash; empty elements are dropped.
pub fn split_list(raw: &str) -> Vec<String> {
	let mut items = Vec::new();
	let mut current = String::new();
	let mut chars = raw.chars().peekable();
	while let Some(c) = chars.next() {
		match c {
			'\\' if matches!(chars.peek(), Some(',' | '\\')) => {
				current.extend(chars.next());
			}
			',' => {
				if !current.is_empty() {
					items.push(std::mem::take(&mut current));
				}
			}
			c => current.push(c),
		}
	}
	if !current.is_empty() {
		items.push(current);
	}
	items
}
