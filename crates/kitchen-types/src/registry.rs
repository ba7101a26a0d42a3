//! Registry trait for pluggable implementations.

/// Declares the configuration name and factory of an implementation.
///
/// Storage backends and order sources each provide a `Registry` struct
/// implementing this trait, so the service can map the names used under
/// `[storage.implementations]` and `[source.implementations]` to factories.
pub trait ImplementationRegistry {
	/// Name used in configuration, e.g. `"file"` or `"postgrest"`.
	const NAME: &'static str;

	/// Factory function type of the component family.
	type Factory;

	fn factory() -> Self::Factory;
}
