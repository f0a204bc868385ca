pub mod collector;
pub mod config;
pub mod error;
pub mod jtop;
pub mod models;
pub mod utils;

use crate::collector::ActionRequest;
use crate::config::AppConfig;
use crate::error::SnapshotError;
use crate::jtop::board::BoardMonitor;
use crate::jtop::PowerModelTarget;
use log::{debug, info};
use serde_json::Value;
use std::time::Duration;

/// Run one snapshot against the local board and return the JSON document to
/// print. Never fails: every error becomes an `{"error": ...}` value.
pub async fn run(
    config: &AppConfig,
    enable_clocks: bool,
    set_nvpmodel: Option<&str>,
) -> Value {
    info!("Starting snapshot collection");
    let request = ActionRequest {
        enable_clocks,
        power_model: set_nvpmodel.map(PowerModelTarget::from),
    };
    debug!("Action request: {:?}", request);

    let settle = Duration::from_secs(config.monitor.settle_secs);

    // The handle lives for exactly this block; it is released on every exit
    // path when the monitor drops.
    match BoardMonitor::acquire(&config.monitor).await {
        Ok(mut monitor) => collector::collect_to_value(&mut monitor, &request, settle).await,
        Err(e) => SnapshotError::from(e).to_value(),
    }
}
