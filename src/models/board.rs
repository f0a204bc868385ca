use crate::jtop::BoardData;
use serde::Serialize;

/// Default for any identity field the backend did not report.
pub(crate) const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, Serialize)]
pub struct BoardInfo {
    pub model: String,
    pub serial: String,
    pub l4t: String,
    pub jetpack: String,
    pub module: String,
}

impl Default for BoardInfo {
    fn default() -> Self {
        Self {
            model: UNKNOWN.to_string(),
            serial: UNKNOWN.to_string(),
            l4t: UNKNOWN.to_string(),
            jetpack: UNKNOWN.to_string(),
            module: UNKNOWN.to_string(),
        }
    }
}

impl BoardInfo {
    pub fn from_data(data: &BoardData) -> Self {
        let field = |key: &str| {
            data.hardware
                .get(key)
                .cloned()
                .unwrap_or_else(|| UNKNOWN.to_string())
        };
        Self {
            model: field("Model"),
            serial: field("Serial Number"),
            l4t: field("L4T"),
            jetpack: field("Jetpack"),
            module: field("Module"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_default_to_unknown() {
        let mut data = BoardData::default();
        data.hardware
            .insert("Model".to_string(), "NVIDIA Orin Nano".to_string());

        let info = BoardInfo::from_data(&data);
        assert_eq!(info.model, "NVIDIA Orin Nano");
        assert_eq!(info.serial, "Unknown");
        assert_eq!(info.jetpack, "Unknown");
    }
}
