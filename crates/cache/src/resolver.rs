use crate::{SourcedValue, ValueType};

/// Re-derives the current value for a key.
///
/// Implementations are free to be expensive: walking several sources in
/// priority order, converting types, falling back to defaults. For a fixed
/// version the result should be deterministic.
pub trait Resolver: Send + Sync {
	/// Failure raised by a resolution attempt. Returned to callers unchanged.
	type Error;

	/// Resolves `key` as `ty`. `Ok(None)` means the key has no value.
	fn resolve(&self, ty: ValueType, key: &str) -> Result<Option<SourcedValue>, Self::Error>;
}
