//! Per-user channel filter preferences.
//!
//! Each user's four filters live in one JSON object stored under
//! `kitchen_filters:<user id>`. Reads are forgiving: a missing record, a
//! corrupt record or an unknown value all fall back to
//! [`ChannelFilter::All`] field by field. Writes never fail the caller, and a
//! record that cannot be read is never overwritten.

use kitchen_storage::{StorageError, StorageService};
use kitchen_types::{Bucket, ChannelFilter, FilterPreferences, StorageKey};
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct FilterPreferenceStore {
	storage: Arc<StorageService>,
	/// Held across the read and the write of [`FilterPreferenceStore::save`].
	write_lock: Mutex<()>,
}

impl FilterPreferenceStore {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self {
			storage,
			write_lock: Mutex::new(()),
		}
	}

	/// Returns the user's filters. Without a user id, every bucket shows all.
	pub async fn load(&self, user_id: Option<&str>) -> FilterPreferences {
		let Some(user_id) = user_id else {
			return FilterPreferences::default();
		};

		let record = match self.read_record(user_id).await {
			Ok(record) => record,
			Err(e) => {
				tracing::warn!(user_id = %user_id, error = %e, "Using default filters, preferences unreadable");
				Map::new()
			},
		};

		let mut preferences = FilterPreferences::default();
		for bucket in Bucket::ALL {
			let filter = record
				.get(bucket.preference_key())
				.and_then(Value::as_str)
				.and_then(|s| s.parse::<ChannelFilter>().ok())
				.unwrap_or_default();
			preferences.set(bucket, filter);
		}
		preferences
	}

	/// Stores one bucket's filter, keeping the other fields of the record.
	///
	/// Returns whether the write reached storage. Failures are logged. When the
	/// existing record cannot be read nothing is written.
	pub async fn save(&self, user_id: Option<&str>, bucket: Bucket, filter: ChannelFilter) -> bool {
		let Some(user_id) = user_id else {
			return false;
		};

		let _guard = self.write_lock.lock().await;

		let mut record = match self.read_record(user_id).await {
			Ok(record) => record,
			Err(e) => {
				tracing::warn!(
					user_id = %user_id,
					bucket = %bucket,
					error = %e,
					"Not saving filter preference, existing record unreadable"
				);
				return false;
			},
		};
		record.insert(
			bucket.preference_key().to_string(),
			Value::String(filter.as_str().to_string()),
		);

		match self
			.storage
			.store(StorageKey::KitchenFilters.as_str(), user_id, &Value::Object(record))
			.await
		{
			Ok(()) => {
				tracing::debug!(user_id = %user_id, bucket = %bucket, filter = %filter, "Saved filter preference");
				true
			},
			Err(e) => {
				tracing::warn!(
					user_id = %user_id,
					bucket = %bucket,
					error = %e,
					"Failed to save filter preference"
				);
				false
			},
		}
	}

	/// Reads the stored record as a JSON object.
	///
	/// A missing or corrupt record reads as an empty object; only backend
	/// failures are errors.
	async fn read_record(&self, user_id: &str) -> Result<Map<String, Value>, StorageError> {
		match self
			.storage
			.retrieve::<Value>(StorageKey::KitchenFilters.as_str(), user_id)
			.await
		{
			Ok(Value::Object(map)) => Ok(map),
			Ok(_) => {
				tracing::warn!(user_id = %user_id, "Ignoring filter preference record that is not an object");
				Ok(Map::new())
			},
			Err(StorageError::NotFound) => Ok(Map::new()),
			Err(StorageError::Serialization(e)) => {
				tracing::warn!(user_id = %user_id, error = %e, "Ignoring corrupt filter preferences");
				Ok(Map::new())
			},
			Err(e) => Err(e),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use failing::{FailingStorage, FlakyReads, SlowReads};
	use kitchen_storage::implementations::file::FileStorage;
	use kitchen_storage::implementations::memory::MemoryStorage;
	use kitchen_storage::StorageInterface;
	use std::sync::atomic::{AtomicBool, Ordering};

	mod failing {
		use kitchen_storage::implementations::memory::MemoryStorage;
		use kitchen_storage::{StorageError, StorageInterface};
		use kitchen_types::{ConfigSchema, Schema, ValidationError};
		use std::sync::atomic::{AtomicBool, Ordering};
		use std::sync::Arc;

		/// Storage whose writes always fail; reads find nothing.
		pub struct FailingStorage;

		/// Memory storage whose next read fails while the flag is set.
		pub struct FlakyReads {
			pub inner: MemoryStorage,
			pub fail_next_read: Arc<AtomicBool>,
		}

		/// Memory storage that yields to the scheduler after every read.
		pub struct SlowReads(pub MemoryStorage);

		struct NoSchema;

		impl ConfigSchema for NoSchema {
			fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
				Schema::new(vec![], vec![]).validate(config)
			}
		}

		#[async_trait::async_trait]
		impl StorageInterface for FailingStorage {
			async fn get_bytes(&self, _key: &str) -> Result<Vec<u8>, StorageError> {
				Err(StorageError::NotFound)
			}
			async fn set_bytes(&self, _key: &str, _value: Vec<u8>) -> Result<(), StorageError> {
				Err(StorageError::Backend("disk full".into()))
			}
			async fn delete(&self, _key: &str) -> Result<(), StorageError> {
				Ok(())
			}
			async fn exists(&self, _key: &str) -> Result<bool, StorageError> {
				Ok(false)
			}
			fn config_schema(&self) -> Box<dyn ConfigSchema> {
				Box::new(NoSchema)
			}
		}

		#[async_trait::async_trait]
		impl StorageInterface for FlakyReads {
			async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
				if self.fail_next_read.swap(false, Ordering::SeqCst) {
					return Err(StorageError::Backend("input/output error".into()));
				}
				self.inner.get_bytes(key).await
			}
			async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
				self.inner.set_bytes(key, value).await
			}
			async fn delete(&self, key: &str) -> Result<(), StorageError> {
				self.inner.delete(key).await
			}
			async fn exists(&self, key: &str) -> Result<bool, StorageError> {
				self.inner.exists(key).await
			}
			fn config_schema(&self) -> Box<dyn ConfigSchema> {
				Box::new(NoSchema)
			}
		}

		#[async_trait::async_trait]
		impl StorageInterface for SlowReads {
			async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
				let result = self.0.get_bytes(key).await;
				tokio::task::yield_now().await;
				result
			}
			async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
				self.0.set_bytes(key, value).await
			}
			async fn delete(&self, key: &str) -> Result<(), StorageError> {
				self.0.delete(key).await
			}
			async fn exists(&self, key: &str) -> Result<bool, StorageError> {
				self.0.exists(key).await
			}
			fn config_schema(&self) -> Box<dyn ConfigSchema> {
				Box::new(NoSchema)
			}
		}
	}

	fn store_with(backend: impl StorageInterface + 'static) -> FilterPreferenceStore {
		FilterPreferenceStore::new(Arc::new(StorageService::new(Box::new(backend))))
	}

	#[tokio::test]
	async fn test_no_record_defaults_to_all() {
		let store = store_with(MemoryStorage::new());
		assert_eq!(store.load(Some("u1")).await, FilterPreferences::default());
	}

	#[tokio::test]
	async fn test_save_then_load_keeps_other_buckets() {
		let store = store_with(MemoryStorage::new());

		assert!(store.save(Some("u1"), Bucket::Queue, ChannelFilter::Delivery).await);
		assert!(store.save(Some("u1"), Bucket::Ready, ChannelFilter::Store).await);

		let prefs = store.load(Some("u1")).await;
		assert_eq!(prefs.queue, ChannelFilter::Delivery);
		assert_eq!(prefs.ready, ChannelFilter::Store);
		assert_eq!(prefs.in_progress, ChannelFilter::All);
		assert_eq!(prefs.picked_up, ChannelFilter::All);

		// other users are unaffected
		assert_eq!(store.load(Some("u2")).await, FilterPreferences::default());
	}

	#[tokio::test]
	async fn test_record_layout_and_unknown_keys_preserved() {
		let backend = MemoryStorage::new();
		backend
			.set_bytes(
				"kitchen_filters:u1",
				br#"{"queueFilter":"store","theme":"dark"}"#.to_vec(),
			)
			.await
			.unwrap();
		let service = Arc::new(StorageService::new(Box::new(backend)));
		let store = FilterPreferenceStore::new(service.clone());

		store
			.save(Some("u1"), Bucket::PickedUp, ChannelFilter::Delivery)
			.await;

		let raw: Value = service.retrieve("kitchen_filters", "u1").await.unwrap();
		assert_eq!(raw["queueFilter"], "store");
		assert_eq!(raw["pickedUpFilter"], "delivery");
		assert_eq!(raw["theme"], "dark");
	}

	#[tokio::test]
	async fn test_corrupt_fields_fall_back_individually() {
		let backend = MemoryStorage::new();
		backend
			.set_bytes(
				"kitchen_filters:u1",
				br#"{"queueFilter":"delivery","inProgressFilter":"drive-thru","readyFilter":7}"#
					.to_vec(),
			)
			.await
			.unwrap();
		let store = store_with(backend);

		let prefs = store.load(Some("u1")).await;
		assert_eq!(prefs.queue, ChannelFilter::Delivery);
		assert_eq!(prefs.in_progress, ChannelFilter::All);
		assert_eq!(prefs.ready, ChannelFilter::All);
	}

	#[tokio::test]
	async fn test_unparsable_record_is_treated_as_absent() {
		let backend = MemoryStorage::new();
		backend
			.set_bytes("kitchen_filters:u1", b"not json at all".to_vec())
			.await
			.unwrap();
		let store = store_with(backend);

		assert_eq!(store.load(Some("u1")).await, FilterPreferences::default());
		assert!(store.save(Some("u1"), Bucket::Queue, ChannelFilter::Store).await);
		assert_eq!(store.load(Some("u1")).await.queue, ChannelFilter::Store);
	}

	#[tokio::test]
	async fn test_anonymous_user_is_not_persisted() {
		let service = Arc::new(StorageService::new(Box::new(MemoryStorage::new())));
		let store = FilterPreferenceStore::new(service.clone());

		assert!(!store.save(None, Bucket::Queue, ChannelFilter::Store).await);
		assert_eq!(store.load(None).await, FilterPreferences::default());
		assert!(!service.exists("kitchen_filters", "").await.unwrap());
	}

	#[tokio::test]
	async fn test_save_failure_is_swallowed() {
		let store = store_with(FailingStorage);
		assert!(!store.save(Some("u1"), Bucket::Queue, ChannelFilter::Store).await);
		assert_eq!(store.load(Some("u1")).await, FilterPreferences::default());
	}

	#[tokio::test]
	async fn test_unreadable_record_is_not_overwritten() {
		let inner = MemoryStorage::new();
		inner
			.set_bytes(
				"kitchen_filters:u1",
				br#"{"queueFilter":"delivery","readyFilter":"store"}"#.to_vec(),
			)
			.await
			.unwrap();
		let fail_next_read = Arc::new(AtomicBool::new(false));
		let store = store_with(FlakyReads {
			inner,
			fail_next_read: fail_next_read.clone(),
		});

		fail_next_read.store(true, Ordering::SeqCst);
		assert!(!store.save(Some("u1"), Bucket::PickedUp, ChannelFilter::Store).await);

		let prefs = store.load(Some("u1")).await;
		assert_eq!(prefs.queue, ChannelFilter::Delivery);
		assert_eq!(prefs.ready, ChannelFilter::Store);
		assert_eq!(prefs.picked_up, ChannelFilter::All);

		// a failed read still yields defaults for display
		fail_next_read.store(true, Ordering::SeqCst);
		assert_eq!(store.load(Some("u1")).await, FilterPreferences::default());
		assert_eq!(store.load(Some("u1")).await.queue, ChannelFilter::Delivery);
	}

	#[tokio::test]
	async fn test_concurrent_saves_keep_both_buckets() {
		let store = store_with(SlowReads(MemoryStorage::new()));

		let (first, second) = tokio::join!(
			store.save(Some("u1"), Bucket::Queue, ChannelFilter::Store),
			store.save(Some("u1"), Bucket::Ready, ChannelFilter::Delivery),
		);
		assert!(first && second);

		let prefs = store.load(Some("u1")).await;
		assert_eq!(prefs.queue, ChannelFilter::Store);
		assert_eq!(prefs.ready, ChannelFilter::Delivery);
	}

	#[tokio::test]
	async fn test_similar_user_ids_do_not_share_file_records() {
		let dir = tempfile::TempDir::new().unwrap();
		let store = store_with(FileStorage::new(dir.path().to_path_buf()));

		assert!(store.save(Some("ana.silva"), Bucket::Queue, ChannelFilter::Delivery).await);

		assert_eq!(store.load(Some("ana_silva")).await, FilterPreferences::default());
		assert_eq!(store.load(Some("ana:silva")).await, FilterPreferences::default());
		assert_eq!(
			store.load(Some("ana.silva")).await.queue,
			ChannelFilter::Delivery
		);
	}
}
