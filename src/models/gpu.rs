use crate::jtop::GpuData;
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct GpuInfo {
    pub load: f64,
    pub curr_freq: u64,
    pub max_freq: u64,
}

impl GpuInfo {
    pub fn from_data(data: &GpuData) -> Self {
        Self {
            load: data.load.unwrap_or(0.0),
            curr_freq: data.cur_freq.unwrap_or(0),
            max_freq: data.max_freq.unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_default_to_zero() {
        let info = GpuInfo::from_data(&GpuData::default());
        assert_eq!(info.load, 0.0);
        assert_eq!(info.curr_freq, 0);
        assert_eq!(info.max_freq, 0);
    }
}
