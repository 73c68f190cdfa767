//! Per-type cached value with version-stamped revalidation.
//!
//! # Invariants
//!
//! - The `(version, value)` pair lives in one immutable [`Stamp`] behind an
//!   [`ArcSwap`]; the two are never read or written separately.
//! - A stale read resolves exactly once per call and publishes with a single
//!   compare-and-swap. A lost swap is not retried: the caller gets whatever
//!   the winning publication holds.
//! - A failed resolution leaves the stamp untouched, so the next read retries.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::{Resolver, SourcedValue, ValueType, VersionSource};


/// Immutable `(version, value)` pair published as one unit.
#[derive(Debug, Clone, Default)]
pub struct Stamp {
	version: Option<u64>,
	value: Option<SourcedValue>,
}

impl Stamp {
	/// Version this value was resolved at. `None` until the first resolution.
	pub const fn version(&self) -> Option<u64> {
		self.version
	}

	/// The resolved value, `None` if the key had no value at that version.
	pub fn value(&self) -> Option<&SourcedValue> {
		self.value.as_ref()
	}

	/// Returns `true` once a resolution has been published.
	pub const fn is_resolved(&self) -> bool {
		self.version.is_some()
	}
}

/// Cached resolution of one key as one type.
///
/// Obtained from [`TypeContainer::as_type`](crate::TypeContainer::as_type).
/// Two stamped values compare equal when their types are equal, regardless of
/// what they currently hold.
pub struct StampedValue<R, V> {
	ty: ValueType,
	key: Arc<str>,
	resolver: Arc<R>,
	version: V,
	stamp: ArcSwap<Stamp>,
}

impl<R, V> StampedValue<R, V>
where
	R: Resolver,
	V: VersionSource,
{
	pub(crate) fn new(ty: ValueType, key: Arc<str>, resolver: Arc<R>, version: V) -> Self {
		Self {
			ty,
			key,
			resolver,
			version,
			stamp: ArcSwap::from_pointee(Stamp::default()),
		}
	}

	/// Returns the value for the current version, resolving it if stale.
	///
	/// Resolver errors are returned unchanged and leave the cache as it was.
	pub fn get_sourced(&self) -> Result<Option<SourcedValue>, R::Error> {
		let cached = self.stamp.load_full();
		let latest = self.version.current_version();
		if cached.version == Some(latest) {
			return Ok(cached.value.clone());
		}

		tracing::trace!(
			key = &*self.key,
			ty = self.ty.name(),
			cached = ?cached.version,
			latest,
			"revalidating stale value"
		);
		let value = self.resolver.resolve(self.ty, &self.key)?;
		let fresh = Arc::new(Stamp {
			version: Some(latest),
			value,
		});

		let prev = self.stamp.compare_and_swap(&cached, Arc::clone(&fresh));
		if Arc::ptr_eq(&prev, &cached) {
			return Ok(fresh.value.clone());
		}

		tracing::trace!(
			key = &*self.key,
			ty = self.ty.name(),
			winner = ?prev.version,
			"lost publish race; returning winner"
		);
		Ok(prev.value.clone())
	}

	/// Like [`Self::get_sourced`], downcasting the payload to `T`.
	///
	/// Returns `Ok(None)` when the key has no value or the resolver produced a
	/// payload of a different type.
	pub fn get_as<T: Any + Send + Sync>(&self) -> Result<Option<Arc<T>>, R::Error> {
		Ok(self.get_sourced()?.and_then(|v| v.downcast::<T>()))
	}
}

impl<R, V> StampedValue<R, V> {
	/// Returns the type this value is resolved as.
	pub const fn value_type(&self) -> ValueType {
		self.ty
	}

	/// Returns the key this value belongs to.
	pub fn key(&self) -> &str {
		&self.key
	}

	/// Returns the currently published stamp without revalidating.
	pub fn stamp(&self) -> Arc<Stamp> {
		self.stamp.load_full()
	}
}

impl<R, V> PartialEq for StampedValue<R, V> {
	fn eq(&self, other: &Self) -> bool {
		self.ty == other.ty
	}
}

impl<R, V> Eq for StampedValue<R, V> {}

impl<R, V> fmt::Debug for StampedValue<R, V> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let stamp = self.stamp.load();
		f.debug_struct("StampedValue")
			.field("key", &&*self.key)
			.field("type", &self.ty)
			.field("version", &stamp.version)
			.finish_non_exhaustive()
	}
}
