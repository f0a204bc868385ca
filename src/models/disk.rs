use crate::jtop::DiskData;
use serde::Serialize;

/// Disk usage in the backend's units (GB).
#[derive(Debug, Clone, Default, Serialize)]
pub struct DiskInfo {
    pub total: f64,
    pub used: f64,
    pub available: f64,
}

impl DiskInfo {
    pub fn from_data(data: &DiskData) -> Self {
        Self {
            total: data.total.unwrap_or(0.0),
            used: data.used.unwrap_or(0.0),
            available: data.available.unwrap_or(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_zero() {
        let info = DiskInfo::from_data(&DiskData::default());
        assert_eq!(info.total, 0.0);
        assert_eq!(info.used, 0.0);
        assert_eq!(info.available, 0.0);
    }
}
