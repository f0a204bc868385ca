use super::round1;
use crate::jtop::CpuData;
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct CpuInfo {
    pub total_user: f64,
    pub total_system: f64,
    pub total_idle: f64,
    pub online_cores: u64,
}

impl CpuInfo {
    pub fn from_data(data: &CpuData) -> Self {
        let (user, system, idle) = match &data.total {
            Some(total) => (total.user, total.system, total.idle),
            None => (0.0, 0.0, 0.0),
        };
        Self {
            total_user: round1(user),
            total_system: round1(system),
            total_idle: round1(idle),
            online_cores: data.cores.iter().filter(|core| core.online).count() as u64,
        }
    }
}
