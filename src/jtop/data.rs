use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Board identity and SDK library versions as reported by the backend.
///
/// `hardware` carries the nested board-info mapping with keys such as
/// `Model`, `Serial Number`, `L4T`, `Jetpack` and `Module`; absent keys are
/// simply not inserted and the snapshot layer substitutes its defaults.
#[derive(Debug, Clone, Default)]
pub struct BoardData {
    pub hardware: IndexMap<String, String>,
    pub libraries: IndexMap<String, String>,
}

/// Current power model plus the assignable model names.
#[derive(Debug, Clone)]
pub struct PowerModelState {
    pub name: String,
    pub id: i64,
    pub models: Vec<String>,
}

/// State of the performance-clocks control.
#[derive(Debug, Clone)]
pub struct ClocksState {
    pub active: bool,
    pub status: String,
    pub boot: bool,
}

#[derive(Debug, Clone, Default)]
pub struct CpuTotal {
    pub user: f64,
    pub system: f64,
    pub idle: f64,
}

#[derive(Debug, Clone)]
pub struct CpuCore {
    pub online: bool,
}

#[derive(Debug, Clone, Default)]
pub struct CpuData {
    /// Aggregate utilization percentages; `None` when measurement failed.
    pub total: Option<CpuTotal>,
    pub cores: Vec<CpuCore>,
}

#[derive(Debug, Clone, Default)]
pub struct GpuData {
    pub load: Option<f64>,
    pub cur_freq: Option<u64>,
    pub max_freq: Option<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct EngineData {
    pub online: Option<bool>,
    pub cur: Option<u64>,
}

/// Engine group -> engine name -> state.
pub type EngineMap = IndexMap<String, IndexMap<String, EngineData>>;

#[derive(Debug, Clone, Default)]
pub struct RamData {
    pub total: Option<u64>,
    pub used: Option<u64>,
    pub free: Option<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct SwapData {
    pub total: Option<u64>,
    pub used: Option<u64>,
}

/// RAM and swap figures in the units the backend reports (kB).
#[derive(Debug, Clone, Default)]
pub struct MemoryData {
    pub ram: RamData,
    pub swap: SwapData,
}

/// A single thermal sensor reading. Sensors that could not be read, or that
/// report the tegra "disconnected" sentinel, are flagged offline.
#[derive(Debug, Clone)]
pub struct SensorData {
    pub temp: f64,
    pub online: bool,
}

/// Fan speed as reported: some boards expose a single pwm channel, others a
/// list of channels.
#[derive(Debug, Clone)]
pub enum FanSpeed {
    Scalar(f64),
    PerFan(Vec<f64>),
}

#[derive(Debug, Clone, Default)]
pub struct FanData {
    pub speed: Option<FanSpeed>,
    pub profile: Option<String>,
    pub governor: Option<String>,
    pub control: Option<String>,
}

/// Disk usage in GB.
#[derive(Debug, Clone, Default)]
pub struct DiskData {
    pub total: Option<f64>,
    pub used: Option<f64>,
    pub available: Option<f64>,
}

/// A raw positional accelerator-process record:
/// `[PID, User, GPU, Type, Priority, State, CPU%, RAM, GPU_MEM, Name]`.
///
/// Rows are kept positional on purpose; extraction into named fields happens
/// in the snapshot layer and drops rows shorter than 10 entries.
pub type ProcessRow = Vec<Value>;

/// A requested power model, by numeric id or by name.
///
/// Parsing never fails: anything that is not an integer is a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PowerModelTarget {
    Id(i64),
    Name(String),
}

impl From<&str> for PowerModelTarget {
    fn from(s: &str) -> Self {
        match s.parse::<i64>() {
            Ok(id) => PowerModelTarget::Id(id),
            Err(_) => PowerModelTarget::Name(s.to_string()),
        }
    }
}

impl FromStr for PowerModelTarget {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(PowerModelTarget::from(s))
    }
}

impl fmt::Display for PowerModelTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PowerModelTarget::Id(id) => write!(f, "{}", id),
            PowerModelTarget::Name(name) => write!(f, "{}", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_numeric_string_becomes_id() {
        assert_eq!(PowerModelTarget::from("2"), PowerModelTarget::Id(2));
        assert_eq!(PowerModelTarget::from("-1"), PowerModelTarget::Id(-1));
    }

    #[test]
    fn test_target_name_kept_verbatim() {
        assert_eq!(
            PowerModelTarget::from("Quiet"),
            PowerModelTarget::Name("Quiet".to_string())
        );
        assert_eq!(
            PowerModelTarget::from("15W"),
            PowerModelTarget::Name("15W".to_string())
        );
    }

    #[test]
    fn test_target_display() {
        assert_eq!(PowerModelTarget::Id(2).to_string(), "2");
        assert_eq!(
            PowerModelTarget::Name("MAXN".to_string()).to_string(),
            "MAXN"
        );
    }
}
