//! Channel filters and lifecycle buckets.

use crate::{Channel, OrderStatus};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Restricts a bucket to one sales channel, or shows both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelFilter {
	#[default]
	All,
	Store,
	Delivery,
}

impl ChannelFilter {
	/// Whether an order on `channel` passes this filter.
	pub fn admits(&self, channel: Channel) -> bool {
		match self {
			Self::All => true,
			Self::Store => !channel.is_delivery(),
			Self::Delivery => channel.is_delivery(),
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Self::All => "all",
			Self::Store => "store",
			Self::Delivery => "delivery",
		}
	}
}

impl fmt::Display for ChannelFilter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for ChannelFilter {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"all" => Ok(Self::All),
			"store" => Ok(Self::Store),
			"delivery" => Ok(Self::Delivery),
			other => Err(format!("unknown channel filter '{}'", other)),
		}
	}
}

/// One of the four display groupings of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
	Queue,
	InProgress,
	Ready,
	PickedUp,
}

impl Bucket {
	/// All buckets in board order.
	pub const ALL: [Bucket; 4] = [Self::Queue, Self::InProgress, Self::Ready, Self::PickedUp];

	/// The canonical status whose orders this bucket shows.
	pub fn status(&self) -> OrderStatus {
		match self {
			Self::Queue => OrderStatus::Queued,
			Self::InProgress => OrderStatus::InProgress,
			Self::Ready => OrderStatus::Ready,
			Self::PickedUp => OrderStatus::PickedUp,
		}
	}

	/// Membership predicate. Raw synonyms are already collapsed by
	/// [`OrderStatus::from_raw`], so the queue bucket covers all of them.
	pub fn contains(&self, status: OrderStatus) -> bool {
		self.status() == status
	}

	pub fn for_status(status: OrderStatus) -> Self {
		match status {
			OrderStatus::Queued => Self::Queue,
			OrderStatus::InProgress => Self::InProgress,
			OrderStatus::Ready => Self::Ready,
			OrderStatus::PickedUp => Self::PickedUp,
		}
	}

	/// Field name used for this bucket in the persisted preference record.
	pub fn preference_key(&self) -> &'static str {
		match self {
			Self::Queue => "queueFilter",
			Self::InProgress => "inProgressFilter",
			Self::Ready => "readyFilter",
			Self::PickedUp => "pickedUpFilter",
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Queue => "queue",
			Self::InProgress => "in_progress",
			Self::Ready => "ready",
			Self::PickedUp => "picked_up",
		}
	}
}

impl fmt::Display for Bucket {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Bucket {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"queue" => Ok(Self::Queue),
			"in_progress" | "inProgress" => Ok(Self::InProgress),
			"ready" => Ok(Self::Ready),
			"picked_up" | "pickedUp" => Ok(Self::PickedUp),
			other => Err(format!("unknown bucket '{}'", other)),
		}
	}
}

/// A user's channel filter for each of the four buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterPreferences {
	#[serde(rename = "queueFilter", default)]
	pub queue: ChannelFilter,
	#[serde(rename = "inProgressFilter", default)]
	pub in_progress: ChannelFilter,
	#[serde(rename = "readyFilter", default)]
	pub ready: ChannelFilter,
	#[serde(rename = "pickedUpFilter", default)]
	pub picked_up: ChannelFilter,
}

impl FilterPreferences {
	pub fn get(&self, bucket: Bucket) -> ChannelFilter {
		match bucket {
			Bucket::Queue => self.queue,
			Bucket::InProgress => self.in_progress,
			Bucket::Ready => self.ready,
			Bucket::PickedUp => self.picked_up,
		}
	}

	/// Replaces the filter of one bucket, leaving the other three untouched.
	pub fn set(&mut self, bucket: Bucket, filter: ChannelFilter) {
		let slot = match bucket {
			Bucket::Queue => &mut self.queue,
			Bucket::InProgress => &mut self.in_progress,
			Bucket::Ready => &mut self.ready,
			Bucket::PickedUp => &mut self.picked_up,
		};
		*slot = filter;
	}

	pub fn with(mut self, bucket: Bucket, filter: ChannelFilter) -> Self {
		self.set(bucket, filter);
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_filter_admits() {
		assert!(ChannelFilter::All.admits(Channel::Store));
		assert!(ChannelFilter::All.admits(Channel::Delivery));
		assert!(ChannelFilter::Store.admits(Channel::Store));
		assert!(!ChannelFilter::Store.admits(Channel::Delivery));
		assert!(ChannelFilter::Delivery.admits(Channel::Delivery));
		assert!(!ChannelFilter::Delivery.admits(Channel::Store));
	}

	#[test]
	fn test_bucket_round_trips_through_status() {
		for bucket in Bucket::ALL {
			assert_eq!(Bucket::for_status(bucket.status()), bucket);
			assert!(bucket.contains(bucket.status()));
			assert_eq!(bucket.as_str().parse::<Bucket>().unwrap(), bucket);
		}
		assert!("kitchen".parse::<Bucket>().is_err());
	}

	#[test]
	fn test_set_touches_only_one_bucket() {
		let mut prefs = FilterPreferences::default();
		prefs.set(Bucket::Ready, ChannelFilter::Delivery);

		assert_eq!(prefs.get(Bucket::Ready), ChannelFilter::Delivery);
		for bucket in [Bucket::Queue, Bucket::InProgress, Bucket::PickedUp] {
			assert_eq!(prefs.get(bucket), ChannelFilter::All);
		}
	}

	#[test]
	fn test_preferences_serialize_with_record_field_names() {
		let prefs = FilterPreferences::default().with(Bucket::InProgress, ChannelFilter::Store);
		let value = serde_json::to_value(prefs).unwrap();

		assert_eq!(value["queueFilter"], "all");
		assert_eq!(value["inProgressFilter"], "store");
		assert_eq!(value["readyFilter"], "all");
		assert_eq!(value["pickedUpFilter"], "all");
		for bucket in Bucket::ALL {
			assert!(value.get(bucket.preference_key()).is_some());
		}
	}
}
