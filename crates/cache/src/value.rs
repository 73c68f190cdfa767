//! Type descriptors and resolved values.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Runtime descriptor for a requested value type.
///
/// Equality and hashing only consider the [`TypeId`]; the name is carried for
/// diagnostics.
#[derive(Clone, Copy)]
pub struct ValueType {
	id: TypeId,
	name: &'static str,
}

impl ValueType {
	/// Returns the descriptor for `T`.
	pub fn of<T: Any>() -> Self {
		Self {
			id: TypeId::of::<T>(),
			name: std::any::type_name::<T>(),
		}
	}

	/// Returns the underlying [`TypeId`].
	pub const fn id(&self) -> TypeId {
		self.id
	}

	/// Returns the type name as reported by [`std::any::type_name`].
	pub const fn name(&self) -> &'static str {
		self.name
	}

	/// Returns `true` if this descriptor names `T`.
	pub fn is<T: Any>(&self) -> bool {
		self.id == TypeId::of::<T>()
	}
}

impl PartialEq for ValueType {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id
	}
}

impl Eq for ValueType {}

impl Hash for ValueType {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id.hash(state);
	}
}

impl fmt::Debug for ValueType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name)
	}
}

impl fmt::Display for ValueType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name)
	}
}

/// A resolved value together with the name of the source that supplied it.
///
/// Cloning is cheap: the payload is shared behind an [`Arc`].
#[derive(Clone)]
pub struct SourcedValue {
	value: Arc<dyn Any + Send + Sync>,
	ty: ValueType,
	source: Arc<str>,
}

impl SourcedValue {
	/// Wraps `value` with its provenance.
	pub fn new<T: Any + Send + Sync>(value: T, source: impl Into<Arc<str>>) -> Self {
		Self {
			value: Arc::new(value),
			ty: ValueType::of::<T>(),
			source: source.into(),
		}
	}

	/// Wraps an already type-erased payload.
	///
	/// `ty` must describe the concrete type behind `value`.
	pub fn from_erased(value: Arc<dyn Any + Send + Sync>, ty: ValueType, source: impl Into<Arc<str>>) -> Self {
		debug_assert_eq!((*value).type_id(), ty.id(), "erased payload does not match {ty}");
		Self {
			value,
			ty,
			source: source.into(),
		}
	}

	/// Returns the descriptor of the held value.
	pub const fn value_type(&self) -> ValueType {
		self.ty
	}

	/// Returns the name of the source that produced this value.
	pub fn source(&self) -> &str {
		&self.source
	}

	/// Borrows the payload as `T`, if it is one.
	pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
		self.value.downcast_ref::<T>()
	}

	/// Returns a shared handle on the payload as `T`, if it is one.
	pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
		self.value.clone().downcast::<T>().ok()
	}

	/// Returns `true` if both values share the same payload allocation.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.value, &other.value)
	}
}

impl fmt::Debug for SourcedValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SourcedValue")
			.field("type", &self.ty)
			.field("source", &&*self.source)
			.finish_non_exhaustive()
	}
}
