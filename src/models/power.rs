use super::board::UNKNOWN;
use crate::jtop::{ClocksState, PowerModelState};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct PowerModelInfo {
    pub name: String,
    pub id: i64,
    pub models: Vec<String>,
}

impl Default for PowerModelInfo {
    fn default() -> Self {
        Self {
            name: UNKNOWN.to_string(),
            id: -1,
            models: Vec::new(),
        }
    }
}

impl PowerModelInfo {
    /// All three fields default together when no mode object exists.
    pub fn from_state(state: Option<&PowerModelState>) -> Self {
        match state {
            Some(state) => Self {
                name: state.name.clone(),
                id: state.id,
                models: state.models.clone(),
            },
            None => Self::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JetsonClocksInfo {
    pub active: bool,
    pub status: String,
    pub boot: bool,
}

impl Default for JetsonClocksInfo {
    fn default() -> Self {
        Self {
            active: false,
            status: "inactive".to_string(),
            boot: false,
        }
    }
}

impl JetsonClocksInfo {
    pub fn from_state(state: Option<&ClocksState>) -> Self {
        match state {
            Some(state) => Self {
                active: state.active,
                status: state.status.clone(),
                boot: state.boot,
            },
            None => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_model_defaults_together() {
        let info = PowerModelInfo::from_state(None);
        assert_eq!(info.name, "Unknown");
        assert_eq!(info.id, -1);
        assert!(info.models.is_empty());
    }

    #[test]
    fn test_clocks_default_is_inactive() {
        let info = JetsonClocksInfo::from_state(None);
        assert!(!info.active);
        assert_eq!(info.status, "inactive");
        assert!(!info.boot);
    }

    #[test]
    fn test_clocks_passthrough() {
        let state = ClocksState {
            active: true,
            status: "running".to_string(),
            boot: true,
        };
        let info = JetsonClocksInfo::from_state(Some(&state));
        assert!(info.active);
        assert_eq!(info.status, "running");
        assert!(info.boot);
    }
}
