//! Scripted resolver shared by the unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::{Resolver, SourcedValue, ValueType, VersionCounter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ResolveFailed;

/// Resolves `i32` as `5 * (version + 1)` and `String` as `"{key}@{version}"`.
/// Any other type has no value.
pub(crate) struct ScriptedResolver {
	pub(crate) version: VersionCounter,
	calls: AtomicUsize,
	fail_next: AtomicBool,
}

impl ScriptedResolver {
	pub(crate) fn new(version: VersionCounter) -> Self {
		Self {
			version,
			calls: AtomicUsize::new(0),
			fail_next: AtomicBool::new(false),
		}
	}

	pub(crate) fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	pub(crate) fn fail_next(&self) {
		self.fail_next.store(true, Ordering::SeqCst);
	}
}

impl Resolver for ScriptedResolver {
	type Error = ResolveFailed;

	fn resolve(&self, ty: ValueType, key: &str) -> Result<Option<SourcedValue>, ResolveFailed> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		if self.fail_next.swap(false, Ordering::SeqCst) {
			return Err(ResolveFailed);
		}
		let version = self.version.get();
		if ty.is::<i32>() {
			Ok(Some(SourcedValue::new(5 * (version as i32 + 1), "scripted")))
		} else if ty.is::<String>() {
			Ok(Some(SourcedValue::new(format!("{key}@{version}"), "scripted")))
		} else {
			Ok(None)
		}
	}
}
