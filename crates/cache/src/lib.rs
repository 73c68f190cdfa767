//! Version-stamped value cache for layered configuration.
//!
//! A [`TypeContainer`] owns one configuration key and hands out one
//! [`StampedValue`] per requested [`ValueType`]. Each stamped value caches the
//! last resolution together with the version it was resolved at, and
//! re-resolves lazily once the shared [`VersionSource`] moves on.
//!
//! # Concurrency
//!
//! Nothing in this crate takes a lock. Reads are atomic snapshot loads, new
//! types are published by a copy-on-write compare-and-swap loop, and a stale
//! value is replaced by a single compare-and-swap of an immutable
//! `(version, value)` pair. A caller never observes a value paired with a
//! version it was not resolved for.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! use confstamp_cache::{Resolver, SourcedValue, TypeContainer, ValueType, VersionCounter};
//!
//! struct Fixed(AtomicUsize);
//!
//! impl Resolver for Fixed {
//! 	type Error = std::convert::Infallible;
//!
//! 	fn resolve(&self, _ty: ValueType, _key: &str) -> Result<Option<SourcedValue>, Self::Error> {
//! 		self.0.fetch_add(1, Ordering::SeqCst);
//! 		Ok(Some(SourcedValue::new(5_i32, "fixed")))
//! 	}
//! }
//!
//! let counter = VersionCounter::new();
//! let resolver = Arc::new(Fixed(AtomicUsize::new(0)));
//! let container = TypeContainer::new("timeout", resolver.clone(), counter.clone());
//!
//! let timeout = container.as_type(ValueType::of::<i32>());
//! let value = timeout.get_sourced().unwrap().unwrap();
//! assert_eq!(value.downcast_ref::<i32>(), Some(&5));
//!
//! timeout.get_sourced().unwrap();
//! assert_eq!(resolver.0.load(Ordering::SeqCst), 1);
//!
//! counter.bump();
//! timeout.get_sourced().unwrap();
//! assert_eq!(resolver.0.load(Ordering::SeqCst), 2);
//! ```

mod container;
mod resolver;
mod stamped;
#[cfg(test)]
mod testing;
mod value;
mod version;

pub use container::TypeContainer;
pub use resolver::Resolver;
pub use stamped::{Stamp, StampedValue};
pub use value::{SourcedValue, ValueType};
pub use version::{VersionCounter, VersionSource};
