//! Derivation of the four board buckets from the snapshot.
//!
//! Partitioning is a pure function of the snapshot and the filter
//! preferences. Counts are computed from the filtered members and never
//! stored.

use crate::snapshot::OrderSnapshot;
use kitchen_types::{Bucket, ChannelFilter, FilterPreferences, Order, OrderId};
use serde::Serialize;

/// Orders of one bucket after its channel filter was applied.
#[derive(Debug, Clone)]
pub struct BucketView<'a> {
	pub bucket: Bucket,
	pub filter: ChannelFilter,
	/// Members in snapshot order.
	pub orders: Vec<&'a Order>,
}

impl BucketView<'_> {
	pub fn count(&self) -> usize {
		self.orders.len()
	}

	pub fn is_empty(&self) -> bool {
		self.orders.is_empty()
	}

	pub fn ids(&self) -> Vec<OrderId> {
		self.orders.iter().map(|o| o.id).collect()
	}
}

/// The four buckets of the board, in lifecycle order.
#[derive(Debug, Clone)]
pub struct BoardView<'a> {
	buckets: [BucketView<'a>; 4],
}

impl<'a> BoardView<'a> {
	pub fn bucket(&self, bucket: Bucket) -> &BucketView<'a> {
		&self.buckets[index(bucket)]
	}

	pub fn iter(&self) -> impl Iterator<Item = &BucketView<'a>> {
		self.buckets.iter()
	}

	/// Copies the view out of the snapshot borrow.
	pub fn to_summary(&self) -> BoardSummary {
		BoardSummary {
			buckets: self
				.buckets
				.iter()
				.map(|view| BucketSummary {
					bucket: view.bucket,
					filter: view.filter,
					count: view.count(),
					orders: view.orders.iter().map(|o| (*o).clone()).collect(),
				})
				.collect(),
		}
	}
}

/// Owned form of a [`BoardView`], suitable for returning across an await or
/// serializing.
#[derive(Debug, Clone, Serialize)]
pub struct BoardSummary {
	pub buckets: Vec<BucketSummary>,
}

impl BoardSummary {
	pub fn bucket(&self, bucket: Bucket) -> Option<&BucketSummary> {
		self.buckets.iter().find(|b| b.bucket == bucket)
	}
}

#[derive(Debug, Clone, Serialize)]
pub struct BucketSummary {
	pub bucket: Bucket,
	pub filter: ChannelFilter,
	pub count: usize,
	pub orders: Vec<Order>,
}

fn index(bucket: Bucket) -> usize {
	match bucket {
		Bucket::Queue => 0,
		Bucket::InProgress => 1,
		Bucket::Ready => 2,
		Bucket::PickedUp => 3,
	}
}

pub struct QueuePartitioner;

impl QueuePartitioner {
	/// Builds all four buckets, each filtered by its own preference.
	pub fn partition<'a>(
		snapshot: &'a OrderSnapshot,
		preferences: &FilterPreferences,
	) -> BoardView<'a> {
		BoardView {
			buckets: Bucket::ALL
				.map(|bucket| Self::bucket(snapshot, bucket, preferences.get(bucket))),
		}
	}

	/// Builds a single bucket.
	pub fn bucket(
		snapshot: &OrderSnapshot,
		bucket: Bucket,
		filter: ChannelFilter,
	) -> BucketView<'_> {
		BucketView {
			bucket,
			filter,
			orders: snapshot
				.iter()
				.filter(|o| bucket.contains(o.status) && filter.admits(o.channel))
				.collect(),
		}
	}
}
