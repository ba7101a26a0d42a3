//! Core logic of the kitchen board.
//!
//! Orders are assembled from the order source into an [`OrderSnapshot`],
//! moved through their lifecycle by the [`StatusTransitionEngine`] and grouped
//! into four channel-filtered buckets by the [`QueuePartitioner`]. Each user's
//! filters are remembered by the [`FilterPreferenceStore`]. [`KitchenBoard`]
//! wraps all of it behind one async API, and [`KitchenBuilder`] builds a board
//! from configuration.

pub mod assembler;
pub mod builder;
pub mod engine;
pub mod partition;
pub mod preferences;
pub mod snapshot;
pub mod state;

pub use assembler::{AssemblyError, OrderAssembler};
pub use builder::{BuilderError, KitchenBuilder, KitchenFactories};
pub use engine::{event_bus::EventBus, BoardError, KitchenBoard};
pub use partition::{BoardSummary, BoardView, BucketSummary, BucketView, QueuePartitioner};
pub use preferences::FilterPreferenceStore;
pub use snapshot::OrderSnapshot;
pub use state::{StatusTransitionEngine, TransitionError};
