//! File-based storage backend.
//!
//! Stores each key as its own JSON file under a base directory. Writes go to
//! a temporary file that is then renamed over the target, so a crash never
//! leaves a half-written preference record behind.

use crate::{StorageError, StorageFactory, StorageInterface, StorageRegistry};
use async_trait::async_trait;
use kitchen_types::{ConfigSchema, Field, FieldType, ImplementationRegistry, Schema, ValidationError};
use std::path::PathBuf;
use tokio::fs;

const DEFAULT_STORAGE_PATH: &str = "./data/storage";

pub struct FileStorage {
	base_path: PathBuf,
}

impl FileStorage {
	pub fn new(base_path: PathBuf) -> Self {
		Self { base_path }
	}

	/// Maps a storage key to a filesystem-safe path, e.g.
	/// `kitchen_filters:42` -> `<base>/kitchen_filters%3A42.json`.
	///
	/// Distinct keys always map to distinct file names.
	fn get_file_path(&self, key: &str) -> PathBuf {
		self.base_path.join(format!("{}.json", encode_key(key)))
	}
}

/// Percent-encodes every byte outside `[A-Za-z0-9_-]`, `%` included.
fn encode_key(key: &str) -> String {
	let mut encoded = String::with_capacity(key.len());
	for byte in key.bytes() {
		match byte {
			b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_' | b'-' => encoded.push(byte as char),
			_ => encoded.push_str(&format!("%{:02X}", byte)),
		}
	}
	encoded
}

#[async_trait]
impl StorageInterface for FileStorage {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		let path = self.get_file_path(key);

		match fs::read(&path).await {
			Ok(data) => Ok(data),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound),
			Err(e) => Err(StorageError::Backend(e.to_string())),
		}
	}

	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
		let path = self.get_file_path(key);

		fs::create_dir_all(&self.base_path)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;

		let temp_path = path.with_extension("tmp");
		fs::write(&temp_path, value)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;

		fs::rename(&temp_path, &path)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;

		tracing::trace!(path = %path.display(), "Wrote storage file");
		Ok(())
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		let path = self.get_file_path(key);

		match fs::remove_file(&path).await {
			Ok(_) => Ok(()),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
			Err(e) => Err(StorageError::Backend(e.to_string())),
		}
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		fs::try_exists(self.get_file_path(key))
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(FileStorageSchema)
	}
}

/// Configuration schema for FileStorage.
pub struct FileStorageSchema;

impl ConfigSchema for FileStorageSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![],
			vec![
				Field::new("storage_path", FieldType::String).with_validator(|value| {
					match value.as_str() {
						Some(path) if !path.trim().is_empty() => Ok(()),
						_ => Err("storage_path cannot be empty".to_string()),
					}
				}),
			],
		);
		schema.validate(config)
	}
}

/// Factory function to create a file storage backend from configuration.
///
/// Configuration parameters:
/// - `storage_path`: Base directory for storage files (default: "./data/storage")
pub fn create_storage(config: &toml::Value) -> Result<Box<dyn StorageInterface>, StorageError> {
	FileStorageSchema
		.validate(config)
		.map_err(|e| StorageError::Configuration(e.to_string()))?;

	let storage_path = config
		.get("storage_path")
		.and_then(|v| v.as_str())
		.unwrap_or(DEFAULT_STORAGE_PATH);

	Ok(Box::new(FileStorage::new(PathBuf::from(storage_path))))
}

/// Registry for the file storage implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "file";
	type Factory = StorageFactory;

	fn factory() -> Self::Factory {
		create_storage
	}
}

impl StorageRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	#[tokio::test]
	async fn test_round_trip_and_delete() {
		let dir = TempDir::new().unwrap();
		let storage = FileStorage::new(dir.path().join("prefs"));

		let key = "kitchen_filters:user-1";
		storage.set_bytes(key, b"{\"queueFilter\":\"store\"}".to_vec()).await.unwrap();

		assert!(storage.exists(key).await.unwrap());
		assert_eq!(
			storage.get_bytes(key).await.unwrap(),
			b"{\"queueFilter\":\"store\"}".to_vec()
		);
		assert!(dir.path().join("prefs/kitchen_filters%3Auser-1.json").exists());

		storage.delete(key).await.unwrap();
		assert!(!storage.exists(key).await.unwrap());
		assert!(matches!(
			storage.get_bytes(key).await,
			Err(StorageError::NotFound)
		));
	}

	#[tokio::test]
	async fn test_keys_cannot_escape_base_path() {
		let dir = TempDir::new().unwrap();
		let storage = FileStorage::new(dir.path().to_path_buf());

		let path = storage.get_file_path("kitchen_filters:../../etc/passwd");
		assert_eq!(path.parent().unwrap(), dir.path());
	}

	#[tokio::test]
	async fn test_similar_keys_stay_separate() {
		let dir = TempDir::new().unwrap();
		let storage = FileStorage::new(dir.path().to_path_buf());

		let keys = [
			"kitchen_filters:ana.silva",
			"kitchen_filters:ana_silva",
			"kitchen_filters:ana:silva",
			"kitchen_filters:ana/silva",
			"kitchen_filters:ana%2Esilva",
		];
		for (i, key) in keys.iter().enumerate() {
			storage.set_bytes(key, vec![i as u8]).await.unwrap();
		}
		for (i, key) in keys.iter().enumerate() {
			assert_eq!(storage.get_bytes(key).await.unwrap(), vec![i as u8]);
		}
		assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), keys.len());
	}

	#[test]
	fn test_encode_key() {
		assert_eq!(encode_key("kitchen_filters:42"), "kitchen_filters%3A42");
		assert_eq!(encode_key("a.b"), "a%2Eb");
		assert_eq!(encode_key("a%2Eb"), "a%252Eb");
		assert_eq!(encode_key("ñ"), "%C3%B1");
	}

	#[tokio::test]
	async fn test_values_persist_across_instances() {
		let dir = TempDir::new().unwrap();

		FileStorage::new(dir.path().to_path_buf())
			.set_bytes("k", b"v".to_vec())
			.await
			.unwrap();

		let reopened = FileStorage::new(dir.path().to_path_buf());
		assert_eq!(reopened.get_bytes("k").await.unwrap(), b"v".to_vec());
	}

	#[test]
	fn test_schema_rejects_blank_path() {
		let config: toml::Value = toml::from_str(r#"storage_path = " ""#).unwrap();
		assert!(matches!(
			create_storage(&config),
			Err(StorageError::Configuration(_))
		));

		let config: toml::Value = toml::from_str(r#"storage_path = "/tmp/kitchen""#).unwrap();
		assert!(create_storage(&config).is_ok());
	}
}
