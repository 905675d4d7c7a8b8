pub mod client;
pub mod controller;
pub mod status;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::process::Process;

/// A long-running operation as reported by the executive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<OperationError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationError {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

impl Operation {
    /// Copy of the operation without its metadata payload.
    pub fn summary(&self) -> Operation {
        Operation {
            metadata: None,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionMode {
    #[serde(rename = "EXECUTION_MODE_NORMAL")]
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimulationMode {
    /// Physical execution on real hardware (or physics-based simulation).
    #[serde(rename = "SIMULATION_MODE_REALITY")]
    Reality,
    #[serde(rename = "SIMULATION_MODE_DRAFT")]
    Draft,
}

impl std::str::FromStr for SimulationMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "reality" | "real" => Ok(SimulationMode::Reality),
            "draft" => Ok(SimulationMode::Draft),
            other => Err(anyhow::anyhow!(
                "unknown simulation mode '{other}' (expected 'draft' or 'reality')"
            )),
        }
    }
}

/// The long-running-operations surface of the executive service.
#[async_trait]
pub trait ExecutiveBackend: Send + Sync {
    async fn list_operations(&self) -> Result<Vec<Operation>>;
    async fn create_operation(&self, process: &Process) -> Result<Operation>;
    async fn start_operation(
        &self,
        name: &str,
        execution_mode: ExecutionMode,
        simulation_mode: SimulationMode,
    ) -> Result<Operation>;
    async fn cancel_operation(&self, name: &str) -> Result<()>;
    async fn delete_operation(&self, name: &str) -> Result<()>;
}
