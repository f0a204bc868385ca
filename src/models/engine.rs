use crate::jtop::EngineData;
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct EngineInfo {
    pub online: bool,
    pub cur: u64,
}

impl EngineInfo {
    pub fn from_data(data: &EngineData) -> Self {
        Self {
            online: data.online.unwrap_or(false),
            cur: data.cur.unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_field_defaults() {
        let info = EngineInfo::from_data(&EngineData::default());
        assert!(!info.online);
        assert_eq!(info.cur, 0);

        let info = EngineInfo::from_data(&EngineData {
            online: Some(true),
            cur: None,
        });
        assert!(info.online);
        assert_eq!(info.cur, 0);
    }
}
