//! Snapshot orchestration: apply the requested management actions, then read
//! every category through the monitor handle.

use crate::error::SnapshotError;
use crate::jtop::{Monitor, PowerModelTarget};
use crate::models::{
    round1, BoardInfo, CpuInfo, DiskInfo, EngineInfo, FanInfo, GpuInfo, JetsonClocksInfo,
    PowerModelInfo, ProcessEntry, RamInfo, Snapshot, SwapInfo,
};
use indexmap::IndexMap;
use log::{debug, info};
use serde_json::Value;
use std::time::{Duration, Instant};

/// The optional management actions applied before the snapshot is read.
#[derive(Debug, Clone, Default)]
pub struct ActionRequest {
    pub enable_clocks: bool,
    pub power_model: Option<PowerModelTarget>,
}

/// Build one snapshot: either the full category set or an error, never both
/// and never a partial mix. A failing category read abandons everything
/// gathered so far; only the two management actions are non-fatal.
pub async fn collect(
    monitor: &mut dyn Monitor,
    request: &ActionRequest,
    settle: Duration,
) -> Result<Snapshot, SnapshotError> {
    if !monitor.ok().await {
        return Err(SnapshotError::NotReady);
    }

    let mut snapshot = Snapshot::default();

    if request.enable_clocks {
        match enable_clocks(monitor).await {
            Ok(()) => {
                info!("Enabled jetson_clocks with boot persistence");
                snapshot.clocks_action =
                    Some("Enabled jetson_clocks and set to boot".to_string());
            }
            Err(e) => snapshot.clocks_action_error = Some(e.to_string()),
        }
    }

    if let Some(target) = &request.power_model {
        match monitor.set_nvpmodel(target).await {
            Ok(()) => {
                // Give the change a moment to reflect before reading back.
                tokio::time::sleep(settle).await;
                snapshot.nvpmodel_action = Some(format!("Set nvpmodel to {}", target));
            }
            Err(e) => snapshot.nvpmodel_action_error = Some(e.to_string()),
        }
    }

    // Actions can in principle take the backend down; re-check before reads.
    if !monitor.ok().await {
        return Err(SnapshotError::NotReady);
    }

    let start = Instant::now();

    let board = monitor.board().await?;
    snapshot.board = BoardInfo::from_data(&board);
    snapshot.libraries = board.libraries;

    let nvpmodel = monitor.nvpmodel().await?;
    snapshot.nvpmodel = PowerModelInfo::from_state(nvpmodel.as_ref());

    let clocks = monitor.jetson_clocks().await?;
    snapshot.jetson_clocks = JetsonClocksInfo::from_state(clocks.as_ref());

    snapshot.cpu = CpuInfo::from_data(&monitor.cpu().await?);
    snapshot.gpu = GpuInfo::from_data(&monitor.gpu().await?);

    let mut engines = IndexMap::new();
    for (group, items) in monitor.engines().await? {
        let mut group_info = IndexMap::new();
        for (name, data) in items {
            group_info.insert(name, EngineInfo::from_data(&data));
        }
        engines.insert(group, group_info);
    }
    snapshot.engines = engines;

    let memory = monitor.memory().await?;
    snapshot.ram = RamInfo::from_data(&memory.ram);
    snapshot.swap = SwapInfo::from_data(&memory.swap);

    let mut temperature = IndexMap::new();
    for (name, sensor) in monitor.temperature().await? {
        // Offline sensors are excluded whatever their reading.
        if sensor.online {
            temperature.insert(name, round1(sensor.temp));
        }
    }
    snapshot.temperature = temperature;

    snapshot.fan = FanInfo::from_data(&monitor.fan().await?);

    snapshot.processes = monitor
        .processes()
        .await?
        .iter()
        .filter_map(ProcessEntry::from_row)
        .collect();

    snapshot.disk = DiskInfo::from_data(&monitor.disk().await?);

    debug!(
        "category reads took: {} ms",
        start.elapsed().as_millis()
    );
    Ok(snapshot)
}

async fn enable_clocks(monitor: &mut dyn Monitor) -> crate::jtop::Result<()> {
    monitor.set_jetson_clocks(true).await?;
    monitor.set_jetson_clocks_boot(true).await?;
    Ok(())
}

/// Serialize the outcome into the document printed on stdout: either the
/// snapshot mapping or `{"error": "..."}`.
pub async fn collect_to_value(
    monitor: &mut dyn Monitor,
    request: &ActionRequest,
    settle: Duration,
) -> Value {
    match collect(monitor, request, settle).await {
        Ok(snapshot) => match serde_json::to_value(&snapshot) {
            Ok(value) => value,
            Err(e) => SnapshotError::from(e).to_value(),
        },
        Err(e) => e.to_value(),
    }
}
