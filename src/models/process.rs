use crate::jtop::ProcessRow;
use serde::Serialize;
use serde_json::Value;

/// One accelerator-using process, extracted from a raw positional row
/// `[PID, User, GPU, Type, Priority, State, CPU%, RAM, GPU_MEM, Name]`.
///
/// Values pass through untouched so the output mirrors whatever the backend
/// reported at those positions.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessEntry {
    pub pid: Value,
    pub user: Value,
    pub gpu_mem: Value,
    pub name: Value,
}

impl ProcessEntry {
    /// Rows with fewer than 10 fields are silently dropped.
    pub fn from_row(row: &ProcessRow) -> Option<Self> {
        if row.len() < 10 {
            return None;
        }
        Some(Self {
            pid: row[0].clone(),
            user: row[1].clone(),
            gpu_mem: row[8].clone(),
            name: row[9].clone(),
        })
    }
}
