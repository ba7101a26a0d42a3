//! Storage namespaces used by the board.

use std::str::FromStr;

/// Namespaces of the key-value store.
///
/// Each namespace is combined with an id as `namespace:id` to form the
/// storage key, so values of different purposes never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
	/// Per-user channel filter preferences, keyed by user id.
	KitchenFilters,
}

impl StorageKey {
	pub fn as_str(&self) -> &'static str {
		match self {
			StorageKey::KitchenFilters => "kitchen_filters",
		}
	}

	pub fn all() -> impl Iterator<Item = Self> {
		[Self::KitchenFilters].into_iter()
	}
}

impl FromStr for StorageKey {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"kitchen_filters" => Ok(Self::KitchenFilters),
			_ => Err(()),
		}
	}
}

impl From<StorageKey> for &'static str {
	fn from(key: StorageKey) -> Self {
		key.as_str()
	}
}
