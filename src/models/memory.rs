use crate::jtop::{RamData, SwapData};
use serde::Serialize;

/// RAM figures in the units the backend reports; no conversion happens here.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RamInfo {
    pub total: u64,
    pub used: u64,
    pub free: u64,
}

impl RamInfo {
    pub fn from_data(data: &RamData) -> Self {
        Self {
            total: data.total.unwrap_or(0),
            used: data.used.unwrap_or(0),
            free: data.free.unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SwapInfo {
    pub total: u64,
    pub used: u64,
}

impl SwapInfo {
    pub fn from_data(data: &SwapData) -> Self {
        Self {
            total: data.total.unwrap_or(0),
            used: data.used.unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_zero() {
        let ram = RamInfo::from_data(&RamData::default());
        assert_eq!((ram.total, ram.used, ram.free), (0, 0, 0));

        let swap = SwapInfo::from_data(&SwapData::default());
        assert_eq!((swap.total, swap.used), (0, 0));
    }
}
