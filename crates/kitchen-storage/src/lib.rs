//! Key-value storage for the kitchen board.
//!
//! This module provides the durable store behind per-user filter preferences.
//! Backends implement the byte-level [`StorageInterface`]; [`StorageService`]
//! layers typed JSON access and `namespace:id` keys on top of any backend.

use async_trait::async_trait;
use kitchen_types::{ConfigSchema, ImplementationRegistry};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod file;
	pub mod memory;
}

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
	/// Error that occurs when a requested item is not found.
	#[error("Not found")]
	NotFound,
	/// Error that occurs during serialization/deserialization.
	#[error("Serialization error: {0}")]
	Serialization(String),
	/// Error that occurs in the storage backend.
	#[error("Backend error: {0}")]
	Backend(String),
	/// Error that occurs during configuration validation.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Low-level interface every storage backend implements.
#[async_trait]
pub trait StorageInterface: Send + Sync {
	/// Retrieves raw bytes for the given key.
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError>;

	/// Stores raw bytes, replacing any previous value.
	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;

	/// Deletes the value associated with the given key. Missing keys are not an error.
	async fn delete(&self, key: &str) -> Result<(), StorageError>;

	/// Checks if a key exists in storage.
	async fn exists(&self, key: &str) -> Result<bool, StorageError>;

	/// Returns the configuration schema for validation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;
}

/// Signature of the factory every storage implementation provides.
pub type StorageFactory = fn(&toml::Value) -> Result<Box<dyn StorageInterface>, StorageError>;

/// Registry trait for storage implementations.
pub trait StorageRegistry: ImplementationRegistry<Factory = StorageFactory> {}

/// Get all registered storage implementations.
///
/// Returns a vector of (name, factory) tuples for all available storage implementations.
pub fn get_all_implementations() -> Vec<(&'static str, StorageFactory)> {
	use implementations::{file, memory};

	vec![
		(file::Registry::NAME, file::Registry::factory()),
		(memory::Registry::NAME, memory::Registry::factory()),
	]
}

/// Typed access to a storage backend.
///
/// Values are stored as JSON under the key `namespace:id`.
pub struct StorageService {
	backend: Box<dyn StorageInterface>,
}

impl StorageService {
	pub fn new(backend: Box<dyn StorageInterface>) -> Self {
		Self { backend }
	}

	fn key(namespace: &str, id: &str) -> String {
		format!("{}:{}", namespace, id)
	}

	/// Serializes `data` to JSON and stores it, replacing any previous value.
	pub async fn store<T: Serialize>(
		&self,
		namespace: &str,
		id: &str,
		data: &T,
	) -> Result<(), StorageError> {
		let bytes =
			serde_json::to_vec(data).map_err(|e| StorageError::Serialization(e.to_string()))?;
		self.backend.set_bytes(&Self::key(namespace, id), bytes).await
	}

	/// Retrieves and deserializes a value.
	///
	/// Returns [`StorageError::NotFound`] when nothing is stored under the key
	/// and [`StorageError::Serialization`] when the stored bytes do not decode
	/// as `T`.
	pub async fn retrieve<T: DeserializeOwned>(
		&self,
		namespace: &str,
		id: &str,
	) -> Result<T, StorageError> {
		let bytes = self.backend.get_bytes(&Self::key(namespace, id)).await?;
		serde_json::from_slice(&bytes).map_err(|e| StorageError::Serialization(e.to_string()))
	}

	pub async fn remove(&self, namespace: &str, id: &str) -> Result<(), StorageError> {
		self.backend.delete(&Self::key(namespace, id)).await
	}

	pub async fn exists(&self, namespace: &str, id: &str) -> Result<bool, StorageError> {
		self.backend.exists(&Self::key(namespace, id)).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use implementations::memory::MemoryStorage;
	use serde::Deserialize;

	#[derive(Debug, PartialEq, Serialize, Deserialize)]
	struct Record {
		name: String,
		count: u32,
	}

	#[tokio::test]
	async fn test_store_and_retrieve_typed() {
		let service = StorageService::new(Box::new(MemoryStorage::new()));
		let record = Record {
			name: "grill".into(),
			count: 3,
		};

		service.store("stations", "1", &record).await.unwrap();
		let loaded: Record = service.retrieve("stations", "1").await.unwrap();
		assert_eq!(loaded, record);
		assert!(service.exists("stations", "1").await.unwrap());
		assert!(!service.exists("stations", "2").await.unwrap());
	}

	#[tokio::test]
	async fn test_namespaces_do_not_collide() {
		let service = StorageService::new(Box::new(MemoryStorage::new()));
		service.store("a", "1", &1u32).await.unwrap();
		service.store("b", "1", &2u32).await.unwrap();

		assert_eq!(service.retrieve::<u32>("a", "1").await.unwrap(), 1);
		assert_eq!(service.retrieve::<u32>("b", "1").await.unwrap(), 2);
	}

	#[tokio::test]
	async fn test_retrieve_errors() {
		let backend = MemoryStorage::new();
		backend.set_bytes("ns:bad", b"{not json".to_vec()).await.unwrap();
		let service = StorageService::new(Box::new(backend));

		assert!(matches!(
			service.retrieve::<Record>("ns", "missing").await,
			Err(StorageError::NotFound)
		));
		assert!(matches!(
			service.retrieve::<Record>("ns", "bad").await,
			Err(StorageError::Serialization(_))
		));

		service.remove("ns", "bad").await.unwrap();
		assert!(!service.exists("ns", "bad").await.unwrap());
	}

	#[test]
	fn test_all_implementations_registered() {
		let names: Vec<_> = get_all_implementations()
			.into_iter()
			.map(|(name, _)| name)
			.collect();
		assert_eq!(names, vec!["file", "memory"]);
	}
}
