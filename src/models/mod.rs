use indexmap::IndexMap;
use serde::Serialize;

pub(crate) mod board;
pub(crate) mod cpu;
pub(crate) mod disk;
pub(crate) mod engine;
pub(crate) mod fan;
pub(crate) mod gpu;
pub(crate) mod memory;
pub(crate) mod power;
pub(crate) mod process;

pub use board::BoardInfo;
pub use cpu::CpuInfo;
pub use disk::DiskInfo;
pub use engine::EngineInfo;
pub use fan::FanInfo;
pub use gpu::GpuInfo;
pub use memory::{RamInfo, SwapInfo};
pub use power::{JetsonClocksInfo, PowerModelInfo};
pub use process::ProcessEntry;

/// Round to one decimal place, the precision used for CPU percentages and
/// temperatures.
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// The complete snapshot emitted as one JSON document. Built once per
/// invocation and immutable after construction; field order here is the
/// output key order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Snapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clocks_action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clocks_action_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nvpmodel_action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nvpmodel_action_error: Option<String>,
    pub board: BoardInfo,
    pub libraries: IndexMap<String, String>,
    pub nvpmodel: PowerModelInfo,
    pub jetson_clocks: JetsonClocksInfo,
    pub cpu: CpuInfo,
    pub gpu: GpuInfo,
    pub engines: IndexMap<String, IndexMap<String, EngineInfo>>,
    pub ram: RamInfo,
    pub swap: SwapInfo,
    pub temperature: IndexMap<String, f64>,
    pub fan: FanInfo,
    pub processes: Vec<ProcessEntry>,
    pub disk: DiskInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round1() {
        assert_eq!(round1(34.567), 34.6);
        assert_eq!(round1(0.0), 0.0);
        assert_eq!(round1(99.94), 99.9);
    }

    #[test]
    fn test_action_keys_skipped_when_unset() {
        let snapshot = Snapshot::default();
        let value = serde_json::to_value(&snapshot).unwrap();
        let keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(|k| k.as_str())
            .collect();
        assert_eq!(
            keys,
            vec![
                "board",
                "libraries",
                "nvpmodel",
                "jetson_clocks",
                "cpu",
                "gpu",
                "engines",
                "ram",
                "swap",
                "temperature",
                "fan",
                "processes",
                "disk",
            ]
        );
    }
}
