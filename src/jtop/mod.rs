//! The seam between the snapshot layer and whatever actually measures the
//! board. `BoardMonitor` is the production implementation; tests substitute
//! their own `Monitor`.

pub mod board;
mod data;
mod parse;

pub use data::*;

use async_trait::async_trait;
use indexmap::IndexMap;
use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, JtopError>;

/// Backend-specific failures, kept distinct from generic errors so the
/// snapshot layer can report them under their own prefix.
#[derive(Error, Debug)]
pub enum JtopError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Management command returned a failure
    #[error("Command failed: {0}")]
    CommandFailed(String),

    /// Unparseable backend output
    #[error("Parse error: {0}")]
    Parse(String),

    /// Requested power model does not exist on this board
    #[error("Unknown power model: {0}")]
    UnknownPowerModel(String),
}

/// Read and control access to a running board.
///
/// One handle per invocation; readiness gates every accessor. Field absence
/// inside a category is expressed through `Option` sub-fields rather than
/// errors, so `Err` from an accessor means the category itself could not be
/// read and aborts the snapshot.
#[async_trait]
pub trait Monitor: Send {
    /// Readiness predicate; checked before actions and again before reads.
    async fn ok(&self) -> bool;

    async fn board(&self) -> Result<BoardData>;
    async fn nvpmodel(&self) -> Result<Option<PowerModelState>>;
    async fn jetson_clocks(&self) -> Result<Option<ClocksState>>;
    async fn cpu(&self) -> Result<CpuData>;
    async fn gpu(&self) -> Result<GpuData>;
    async fn engines(&self) -> Result<EngineMap>;
    async fn memory(&self) -> Result<MemoryData>;
    async fn temperature(&self) -> Result<IndexMap<String, SensorData>>;
    async fn fan(&self) -> Result<FanData>;
    async fn processes(&self) -> Result<Vec<ProcessRow>>;
    async fn disk(&self) -> Result<DiskData>;

    async fn set_nvpmodel(&mut self, target: &PowerModelTarget) -> Result<()>;
    async fn set_jetson_clocks(&mut self, enabled: bool) -> Result<()>;
    async fn set_jetson_clocks_boot(&mut self, persist: bool) -> Result<()>;
}
