//! Main entry point for the kitchen board service.
//!
//! Loads the configuration, builds the board with the configured storage and
//! order source, and loads the active orders. With the API enabled the board
//! is served over HTTP until interrupted; otherwise the current buckets are
//! printed once.

use clap::Parser;
use kitchen_config::Config;
use kitchen_core::{BoardSummary, KitchenBoard, KitchenBuilder, KitchenFactories};
use kitchen_types::BoardEvent;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

mod apis;
mod server;

use kitchen_source::implementations::memory::create_source as create_memory_source;
use kitchen_source::implementations::postgrest::create_source as create_postgrest_source;
use kitchen_storage::implementations::file::create_storage as create_file_storage;
use kitchen_storage::implementations::memory::create_storage as create_memory_storage;

/// Command-line arguments for the kitchen board service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config/kitchen.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	let config = Config::from_file(&args.config.to_string_lossy()).await?;
	tracing::info!("Loaded configuration [{}]", config.board.id);

	let board = Arc::new(build_board(config.clone())?);
	let _event_logger = tokio::spawn(log_events(Arc::clone(&board)));

	// A failed initial load leaves an empty board that can be refreshed later.
	if let Err(e) = board.refresh().await {
		tracing::error!(error = %e, "Initial load failed");
	}

	match config.api.filter(|api| api.enabled) {
		Some(api_config) => {
			tokio::select! {
				result = server::start_server(api_config, Arc::clone(&board)) => {
					tracing::info!("API server finished");
					result?;
				}
				_ = tokio::signal::ctrl_c() => {
					tracing::info!("Interrupted");
				}
			}
		},
		None => {
			for line in render_summary(&board.view(None).await) {
				println!("{}", line);
			}
		},
	}

	tracing::info!("Stopped kitchen board");
	Ok(())
}

/// Macro to create a factory HashMap with the appropriate type aliases
macro_rules! create_factory_map {
    ($interface:path, $error:path, $( $name:literal => $factory:expr ),* $(,)?) => {{
        let mut factories = std::collections::HashMap::new();
        $(
            factories.insert(
                $name.to_string(),
                $factory as fn(&toml::Value) -> Result<Box<dyn $interface>, $error>
            );
        )*
        factories
    }};
}

/// Builds the board with every storage and source implementation this
/// binary ships.
fn build_board(config: Config) -> Result<KitchenBoard, Box<dyn std::error::Error>> {
	let storage_factories = create_factory_map!(
		kitchen_storage::StorageInterface,
		kitchen_storage::StorageError,
		"file" => create_file_storage,
		"memory" => create_memory_storage,
	);

	let source_factories = create_factory_map!(
		kitchen_source::OrderSourceInterface,
		kitchen_source::SourceError,
		"memory" => create_memory_source,
		"postgrest" => create_postgrest_source,
	);

	let factories = KitchenFactories {
		storage_factories,
		source_factories,
	};

	Ok(KitchenBuilder::new(config).build(factories)?)
}

/// Logs every board event until the bus closes.
async fn log_events(board: Arc<KitchenBoard>) {
	let mut events = board.event_bus().subscribe();
	loop {
		match events.recv().await {
			Ok(BoardEvent::SnapshotReplaced { order_count }) => {
				tracing::debug!(order_count, "Snapshot replaced");
			},
			Ok(BoardEvent::Transitioned(receipt)) => {
				tracing::debug!(
					order_id = receipt.order_id,
					action = %receipt.action,
					to = ?receipt.to,
					"Order moved"
				);
			},
			Ok(BoardEvent::FilterChanged {
				user_id,
				bucket,
				filter,
			}) => {
				tracing::debug!(user_id = ?user_id, bucket = %bucket, filter = %filter, "Filter changed");
			},
			Err(RecvError::Lagged(skipped)) => {
				tracing::warn!(skipped, "Event logger lagged behind");
			},
			Err(RecvError::Closed) => break,
		}
	}
}

/// One heading per bucket followed by its orders.
fn render_summary(summary: &BoardSummary) -> Vec<String> {
	let mut lines = Vec::new();
	for bucket in &summary.buckets {
		lines.push(format!(
			"{} [{}]: {}",
			bucket.bucket, bucket.filter, bucket.count
		));
		for order in &bucket.orders {
			let mut line = format!(
				"  #{} {} {}",
				order.id,
				order.label(),
				order.created_at.format("%H:%M")
			);
			let items = order.item_count();
			if items > 0 {
				line.push_str(&format!(" x{}", items));
			}
			if let Some(name) = &order.assigned_to {
				line.push_str(&format!(" ({})", name));
			}
			lines.push(line);
		}
	}
	lines
}
