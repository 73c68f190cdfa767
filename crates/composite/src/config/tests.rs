use std::sync::Arc;

use super::*;
use crate::MapSource;

fn layered() -> (Arc<MapSource>, Arc<MapSource>, Config) {
	let global = Arc::new(MapSource::new("global").with_values([("tab-width", "4"), ("theme", "nord")]));
	let local = Arc::new(MapSource::new("local").with_ordinal(200));
	let config = Config::builder()
		.with_shared_source(global.clone())
		.with_shared_source(local.clone())
		.with_default("tab-width", "8")
		.with_default("scrolloff", "3")
		.build()
		.unwrap();
	(global, local, config)
}

#[test]
fn resolve_default() {
	let (_, _, config) = layered();
	assert_eq!(config.get_value::<i64>("scrolloff").unwrap(), 3);
	let sourced = config.get_sourced::<i64>("scrolloff").unwrap().unwrap();
	assert_eq!(sourced.source(), DEFAULT_SOURCE);
}

#[test]
fn resolve_global_over_default() {
	let (_, _, config) = layered();
	assert_eq!(config.get_value::<i64>("tab-width").unwrap(), 4);
}

#[test]
fn higher_ordinal_overrides() {
	let (_, local, config) = layered();
	local.set("tab-width", "2");
	assert_eq!(config.get_value::<i64>("tab-width").unwrap(), 2);
	let sourced = config.get_sourced::<i64>("tab-width").unwrap().unwrap();
	assert_eq!(sourced.source(), "local");

	local.remove("tab-width");
	assert_eq!(config.get_value::<i64>("tab-width").unwrap(), 4);
}

#[test]
fn empty_value_counts_as_absent() {
	let (global, local, config) = layered();
	local.set("theme", "");
	assert_eq!(config.get_value::<String>("theme").unwrap(), "nord");

	global.set("theme", "");
	assert!(config.get_optional_value::<String>("theme").unwrap().is_none());
}

#[test]
fn blank_value_counts_as_absent() {
	let hi = MapSource::new("hi").with_ordinal(400).with_values([("timeout", "   ")]);
	let lo = MapSource::new("lo").with_values([("timeout", "5")]);
	let config = Config::builder()
		.with_source(hi)
		.with_source(lo)
		.with_default("retries", " \t")
		.build()
		.unwrap();

	let timeout = config.get_sourced::<i32>("timeout").unwrap().unwrap();
	assert_eq!(timeout.downcast_ref::<i32>(), Some(&5));
	assert_eq!(timeout.source(), "lo");
	assert!(config.get_optional_value::<i32>("retries").unwrap().is_none());
}

#[test]
fn toml_list_keeps_trailing_backslash() {
	let config = Config::builder()
		.with_toml_str("app.toml", "xs = ['a\\', 'b', 'c,d']\n")
		.unwrap()
		.build()
		.unwrap();
	assert_eq!(config.get_value::<Vec<String>>("xs").unwrap(), ["a\\", "b", "c,d"]);
}

#[test]
fn refresh_bumps_version_and_keeps_sources() {
	let (_, _, config) = layered();
	let before = config.version();
	assert_eq!(config.refresh(), before + 1);
	assert_eq!(config.sources().len(), 2);
	assert_eq!(config.get_value::<i64>("tab-width").unwrap(), 4);
}

#[test]
fn missing_property() {
	let (_, _, config) = layered();
	assert!(config.get_optional_value::<i32>("nope").unwrap().is_none());
	let err = config.get_value::<i32>("nope").unwrap_err();
	assert!(matches!(err, ConfigError::NoSuchElement { ref key, .. } if key == "nope"));
}

#[test]
fn conversion_failure_is_reported_and_retried() {
	let (global, _, config) = layered();
	global.set("tab-width", "wide");
	let err = config.get_value::<i64>("tab-width").unwrap_err();
	assert!(matches!(
		err,
		ConfigError::Conversion { ref key, ref value, .. } if key == "tab-width" && value == "wide"
	));

	global.set("tab-width", "6");
	assert_eq!(config.get_value::<i64>("tab-width").unwrap(), 6);
}

#[test]
fn missing_converter() {
	#[derive(Debug, Clone)]
	struct Unknown;

	let (_, _, config) = layered();
	let err = config.get_value::<Unknown>("theme").unwrap_err();
	assert!(matches!(err, ConfigError::MissingConverter(_)));

	// Absent keys never reach a converter.
	assert!(config.get_optional_value::<Unknown>("nope").unwrap().is_none());
}

#[test]
fn same_key_different_types() {
	let (_, _, config) = layered();
	assert_eq!(config.get_value::<i64>("tab-width").unwrap(), 4);
	assert_eq!(config.get_value::<String>("tab-width").unwrap(), "4");
	assert_eq!(config.get_value::<f64>("tab-width").unwrap(), 4.0);
	assert_eq!(config.cached_properties(), 1);
}

#[test]
fn cached_reads_share_payload_until_change() {
	let (global, _, config) = layered();
	let a = config.get_sourced::<String>("theme").unwrap().unwrap();
	let b = config.get_sourced::<String>("theme").unwrap().unwrap();
	assert!(a.ptr_eq(&b));

	global.set("theme", "gruvbox");
	let c = config.get_sourced::<String>("theme").unwrap().unwrap();
	assert!(!a.ptr_eq(&c));
	assert_eq!(c.downcast_ref::<String>().map(String::as_str), Some("gruvbox"));
}

#[test]
fn add_and_remove_sources() {
	let (_, _, config) = layered();
	let before = config.version();
	assert_eq!(config.get_value::<String>("theme").unwrap(), "nord");

	let extra = Arc::new(MapSource::new("extra").with_ordinal(500).with_values([("theme", "dracula")]));
	config.add_source(extra.clone()).unwrap();
	assert!(config.version() > before);
	assert_eq!(config.get_value::<String>("theme").unwrap(), "dracula");

	// Newly attached sources announce their own changes.
	extra.set("theme", "solarized");
	assert_eq!(config.get_value::<String>("theme").unwrap(), "solarized");

	let dup = config.add_source(Arc::new(MapSource::new("extra"))).unwrap_err();
	assert!(matches!(dup, ConfigError::DuplicateSource(ref n) if n == "extra"));

	let removed = config.remove_source("extra").unwrap();
	assert_eq!(removed.name(), "extra");
	assert_eq!(config.get_value::<String>("theme").unwrap(), "nord");

	assert!(matches!(config.remove_source("extra"), Err(ConfigError::UnknownSource(_))));
}

#[test]
fn refresh_reorders_after_ordinal_change() {
	let (global, _, config) = layered();
	let names = |c: &Config| c.sources().iter().map(|s| s.name().to_string()).collect::<Vec<_>>();
	assert_eq!(names(&config), ["local", "global"]);

	global.set(crate::source::CONFIG_ORDINAL, "900");
	let version = config.refresh();
	assert_eq!(version, config.version());
	assert_eq!(names(&config), ["global", "local"]);
}

#[test]
fn property_names_are_merged() {
	let (_, local, config) = layered();
	local.set("wrap", "true");
	assert_eq!(config.property_names(), ["scrolloff", "tab-width", "theme", "wrap"]);
}

#[test]
fn builder_rejects_duplicate_names() {
	let err = Config::builder()
		.with_source(MapSource::new("same"))
		.with_source(MapSource::new("same"))
		.build()
		.unwrap_err();
	assert!(matches!(err, ConfigError::DuplicateSource(_)));
}

#[test]
fn custom_converter() {
	#[derive(Debug, Clone, PartialEq)]
	struct Level(u8);

	let config = Config::builder()
		.with_source(MapSource::new("m").with_values([("level", "high")]))
		.with_converter::<Level, String, _>(|raw| match raw {
			"low" => Ok(Level(0)),
			"high" => Ok(Level(9)),
			other => Err(format!("unknown level {other}")),
		})
		.build()
		.unwrap();
	assert_eq!(config.get_value::<Level>("level").unwrap(), Level(9));
}
