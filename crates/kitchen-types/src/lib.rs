//! Common types for the kitchen board.
//!
//! This crate defines the data model shared by every other crate in the
//! workspace: the assembled order aggregate, the raw records it is built from,
//! the channel filters applied to the board, operator identity and the events
//! published when the board changes.

/// Events published by the board after a successful mutation.
pub mod events;
/// Channel filters, lifecycle buckets and per-user filter preferences.
pub mod filter;
/// Operator identity and the kitchen access predicate.
pub mod operator;
/// The assembled order aggregate and its lifecycle status.
pub mod order;
/// Raw records as returned by the order source.
pub mod records;
/// Wrapper for sensitive configuration values.
pub mod secret_string;
/// Storage namespaces used by the board.
pub mod storage;
/// Implementation registry trait.
pub mod registry;
/// Configuration validation types.
pub mod validation;

pub use events::*;
pub use filter::*;
pub use operator::*;
pub use order::*;
pub use records::*;
pub use registry::ImplementationRegistry;
pub use secret_string::SecretString;
pub use storage::*;
pub use validation::*;
