//! Per-key holder of typed stamped values.
//!
//! # Invariants
//!
//! - At most one [`StampedValue`] per [`ValueType`] is ever published. The
//!   list is an immutable snapshot behind an [`ArcSwap`]; insertion copies the
//!   snapshot, appends, and publishes with compare-and-swap, re-scanning on
//!   conflict so racing callers converge on the winner's entry.
//! - Entries are never removed.

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::{Resolver, StampedValue, ValueType, VersionSource};


/// All cached types of one configuration key.
///
/// The number of distinct types requested per key is expected to be tiny
/// (usually one), so lookups are a linear scan.
pub struct TypeContainer<R, V> {
	key: Arc<str>,
	resolver: Arc<R>,
	version: V,
	types: ArcSwap<Vec<Arc<StampedValue<R, V>>>>,
}

impl<R, V> TypeContainer<R, V>
where
	R: Resolver,
	V: VersionSource + Clone,
{
	/// Creates an empty container for `key`.
	///
	/// `resolver` and `version` are shared with every stamped value the
	/// container hands out; neither is owned exclusively.
	pub fn new(key: impl Into<Arc<str>>, resolver: Arc<R>, version: V) -> Self {
		Self {
			key: key.into(),
			resolver,
			version,
			types: ArcSwap::from_pointee(Vec::new()),
		}
	}

	/// Returns the cached accessor for `ty`, creating it on first use.
	pub fn as_type(&self, ty: ValueType) -> Arc<StampedValue<R, V>> {
		loop {
			let cur = self.types.load_full();
			if let Some(found) = cur.iter().find(|entry| entry.value_type() == ty) {
				return Arc::clone(found);
			}

			let entry = Arc::new(StampedValue::new(
				ty,
				Arc::clone(&self.key),
				Arc::clone(&self.resolver),
				self.version.clone(),
			));
			let mut next = Vec::with_capacity(cur.len() + 1);
			next.extend(cur.iter().cloned());
			next.push(Arc::clone(&entry));

			let prev = self.types.compare_and_swap(&cur, Arc::new(next));
			if Arc::ptr_eq(&prev, &cur) {
				tracing::trace!(key = &*self.key, ty = ty.name(), "cached new value type");
				return entry;
			}
			// Another type was published concurrently; rescan.
		}
	}

	/// Returns the shared version as seen right now.
	pub fn primary_version(&self) -> u64 {
		self.version.current_version()
	}
}

impl<R, V> TypeContainer<R, V> {
	/// Returns the key this container caches.
	pub fn key(&self) -> &str {
		&self.key
	}

	/// Returns the number of cached types.
	pub fn len(&self) -> usize {
		self.types.load().len()
	}

	/// Returns `true` if no type has been requested yet.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Returns the cached types in insertion order.
	pub fn value_types(&self) -> Vec<ValueType> {
		self.types.load().iter().map(|entry| entry.value_type()).collect()
	}
}

impl<R, V> fmt::Debug for TypeContainer<R, V> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TypeContainer")
			.field("key", &&*self.key)
			.field("types", &self.value_types())
			.finish_non_exhaustive()
	}
}
