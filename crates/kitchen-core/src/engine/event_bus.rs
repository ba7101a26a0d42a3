//! Broadcast channel for board events.

use kitchen_types::BoardEvent;
use tokio::sync::broadcast;

const DEFAULT_CAPACITY: usize = 256;

/// Fan-out of [`BoardEvent`]s to any number of subscribers.
///
/// Publishing with no subscriber is not an error; the event is dropped.
#[derive(Clone)]
pub struct EventBus {
	sender: broadcast::Sender<BoardEvent>,
}

impl EventBus {
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	pub fn subscribe(&self) -> broadcast::Receiver<BoardEvent> {
		self.sender.subscribe()
	}

	pub fn publish(&self, event: BoardEvent) {
		if self.sender.send(event).is_err() {
			tracing::trace!("Board event dropped, no subscribers");
		}
	}
}

impl Default for EventBus {
	fn default() -> Self {
		Self::new(DEFAULT_CAPACITY)
	}
}
