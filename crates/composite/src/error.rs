//! Error types for configuration lookup and source management.

use thiserror::Error;

/// Errors raised while resolving properties or managing sources.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// The property has no value in any source and no default.
	#[error("no value for property {key} as {type_name}")]
	NoSuchElement {
		/// Requested property name.
		key: String,
		/// Requested type.
		type_name: &'static str,
	},

	/// A raw value could not be converted to the requested type.
	#[error("cannot convert {value:?} for property {key} to {type_name}: {reason}")]
	Conversion {
		/// Property name.
		key: String,
		/// Target type.
		type_name: &'static str,
		/// Raw value as supplied by the source.
		value: String,
		/// Converter's explanation.
		reason: String,
	},

	/// No converter is registered for the requested type.
	#[error("no converter registered for {0}")]
	MissingConverter(&'static str),

	/// The resolved payload is not of the requested type.
	#[error("property {key} resolved to {found}, expected {expected}")]
	TypeMismatch {
		/// Property name.
		key: String,
		/// Requested type.
		expected: &'static str,
		/// Type the resolver produced.
		found: &'static str,
	},

	/// A source with the same name is already registered.
	#[error("config source {0:?} is already registered")]
	DuplicateSource(String),

	/// No source with the given name is registered.
	#[error("no config source named {0:?}")]
	UnknownSource(String),

	/// Error parsing TOML syntax.
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
