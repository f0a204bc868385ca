use super::board::UNKNOWN;
use crate::jtop::{FanData, FanSpeed};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct FanInfo {
    pub speed: f64,
    pub profile: String,
}

impl Default for FanInfo {
    fn default() -> Self {
        Self {
            speed: 0.0,
            profile: UNKNOWN.to_string(),
        }
    }
}

impl FanInfo {
    pub fn from_data(data: &FanData) -> Self {
        let speed = match &data.speed {
            Some(FanSpeed::Scalar(speed)) => *speed,
            Some(FanSpeed::PerFan(speeds)) => speeds.first().copied().unwrap_or(0.0),
            None => 0.0,
        };

        // The profile field wins; an absent or "Unknown" profile falls back
        // through governor, then control.
        let mut profile = data
            .profile
            .clone()
            .unwrap_or_else(|| UNKNOWN.to_string());
        if profile == UNKNOWN {
            profile = data
                .governor
                .clone()
                .or_else(|| data.control.clone())
                .unwrap_or_else(|| UNKNOWN.to_string());
        }

        Self { speed, profile }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_list_takes_first_element() {
        let data = FanData {
            speed: Some(FanSpeed::PerFan(vec![42.0, 43.0])),
            ..Default::default()
        };
        assert_eq!(FanInfo::from_data(&data).speed, 42.0);
    }

    #[test]
    fn test_speed_scalar_passthrough() {
        let data = FanData {
            speed: Some(FanSpeed::Scalar(42.0)),
            ..Default::default()
        };
        assert_eq!(FanInfo::from_data(&data).speed, 42.0);
    }

    #[test]
    fn test_speed_missing_defaults_to_zero() {
        assert_eq!(FanInfo::from_data(&FanData::default()).speed, 0.0);
    }

    #[test]
    fn test_profile_fallback_chain() {
        let info = FanInfo::from_data(&FanData::default());
        assert_eq!(info.profile, "Unknown");

        let data = FanData {
            governor: Some("auto".to_string()),
            control: Some("temp_control".to_string()),
            ..Default::default()
        };
        assert_eq!(FanInfo::from_data(&data).profile, "auto");

        let data = FanData {
            profile: Some("Unknown".to_string()),
            control: Some("temp_control".to_string()),
            ..Default::default()
        };
        assert_eq!(FanInfo::from_data(&data).profile, "temp_control");

        let data = FanData {
            profile: Some("quiet".to_string()),
            governor: Some("auto".to_string()),
            ..Default::default()
        };
        assert_eq!(FanInfo::from_data(&data).profile, "quiet");
    }
}
