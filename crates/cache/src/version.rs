use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Supplier of the shared "something changed" version.
///
/// The cache only compares versions for equality; it never interprets their
/// magnitude and never writes them.
pub trait VersionSource: Send + Sync {
	/// Returns the current version.
	fn current_version(&self) -> u64;
}

impl VersionSource for AtomicU64 {
	fn current_version(&self) -> u64 {
		self.load(Ordering::Acquire)
	}
}

impl<T: VersionSource + ?Sized> VersionSource for Arc<T> {
	fn current_version(&self) -> u64 {
		(**self).current_version()
	}
}

/// Shared monotonic version counter.
///
/// Clones observe and advance the same counter. The owner of the
/// configuration bumps it whenever any underlying source changes.
#[derive(Debug, Default, Clone)]
pub struct VersionCounter {
	current: Arc<AtomicU64>,
}

impl VersionCounter {
	/// Creates a counter starting at version 0.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the current version.
	pub fn get(&self) -> u64 {
		self.current.load(Ordering::Acquire)
	}

	/// Advances the counter and returns the new version.
	pub fn bump(&self) -> u64 {
		self.current.fetch_add(1, Ordering::AcqRel).wrapping_add(1)
	}

	/// Returns `true` if both handles drive the same counter.
	pub fn same_counter(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.current, &other.current)
	}
}

impl VersionSource for VersionCounter {
	fn current_version(&self) -> u64 {
		self.get()
	}
}
