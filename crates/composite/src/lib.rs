//! Composite configuration on top of the version-stamped property cache.
//!
//! Raw values come from [`ConfigSource`]s ordered by ordinal. The first
//! source holding a non-empty value for a key wins; its string is converted to
//! the requested type by the [`Converters`] registry, falling back to a
//! builder-registered default when no source has the key.
//!
//! Converted values are cached per `(key, type)` in a
//! [`TypeContainer`](confstamp_cache::TypeContainer) and revalidated lazily
//! whenever the configuration's version moves, which happens on every source
//! change.
//!
//! # Example
//!
//! ```
//! use confstamp_composite::Config;
//!
//! let config = Config::builder()
//! 	.with_toml_str("app.toml", "[server]\nport = 8080\nhosts = [\"a\", \"b\"]")
//! 	.unwrap()
//! 	.with_default("server.timeout", "30")
//! 	.build()
//! 	.unwrap();
//!
//! assert_eq!(config.get_value::<u16>("server.port").unwrap(), 8080);
//! assert_eq!(config.get_value::<Vec<String>>("server.hosts").unwrap(), ["a", "b"]);
//! assert_eq!(config.get_value::<u64>("server.timeout").unwrap(), 30);
//!
//! let sourced = config.get_sourced::<u16>("server.port").unwrap().unwrap();
//! assert_eq!(sourced.source(), "app.toml");
//! ```

mod config;
pub mod convert;
mod error;
pub mod source;

pub use config::{Config, ConfigBuilder, DEFAULT_SOURCE};
pub use confstamp_cache::{SourcedValue, ValueType, VersionCounter};
pub use convert::Converters;
pub use error::{ConfigError, Result};
pub use source::{ConfigSource, EnvSource, MapSource, TomlSource};
