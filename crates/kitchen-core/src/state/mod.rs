//! Order lifecycle state management.

pub mod transition;

pub use transition::{StatusTransitionEngine, TransitionError};
