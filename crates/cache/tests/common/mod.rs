#![allow(dead_code)]

use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};

use confstamp_cache::{Resolver, SourcedValue, ValueType, VersionCounter};

pub fn init_tracing() {
	let _ = tracing_subscriber::fmt::try_init();
}

/// Resolves every key to the version observed at resolution time, tagged with
/// the requested type name as provenance.
pub struct VersionEcho {
	pub version: VersionCounter,
	calls: AtomicUsize,
}

impl VersionEcho {
	pub fn new(version: VersionCounter) -> Self {
		Self {
			version,
			calls: AtomicUsize::new(0),
		}
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}

impl Resolver for VersionEcho {
	type Error = Infallible;

	fn resolve(&self, ty: ValueType, _key: &str) -> Result<Option<SourcedValue>, Infallible> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		Ok(Some(SourcedValue::new(self.version.get(), ty.name())))
	}
}
