use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::status::{ExecutiveStart, ExecutiveStatus};
use super::{ExecutionMode, ExecutiveBackend, Operation, SimulationMode};
use crate::core::error::HmiError;
use crate::core::process::Process;

/// Drives the executive's long-running-operation API on behalf of the HMI.
///
/// The executive accepts a single operation at a time, so starting a run
/// always clears the previous operation first (list, delete, create, start).
pub struct OperationController {
    backend: Arc<dyn ExecutiveBackend>,
    simulation_mode: SimulationMode,
    start_guard: Option<Mutex<()>>,
}

impl OperationController {
    pub fn new(backend: Arc<dyn ExecutiveBackend>, simulation_mode: SimulationMode) -> Self {
        Self {
            backend,
            simulation_mode,
            start_guard: None,
        }
    }

    /// Serialize concurrent `start` calls inside this process. Without it the
    /// executive alone decides which of two racing creates wins.
    pub fn with_exclusive_start(mut self, exclusive: bool) -> Self {
        self.start_guard = exclusive.then(|| Mutex::new(()));
        self
    }

    /// First operation reported by the executive, or `None` if it has never run.
    pub async fn current_operation(&self) -> Result<Option<Operation>, HmiError> {
        let operations = self
            .backend
            .list_operations()
            .await
            .map_err(|e| HmiError::backend("could not list operations", e))?;
        if operations.len() > 1 {
            debug!(
                "Executive reported {} operations, using the first",
                operations.len()
            );
        }
        Ok(operations.into_iter().next())
    }

    pub async fn status(&self) -> Result<ExecutiveStatus, HmiError> {
        match self.current_operation().await? {
            Some(op) => ExecutiveStatus::project(&op),
            None => Ok(ExecutiveStatus::default()),
        }
    }

    pub async fn operations(&self) -> Result<Vec<Operation>, HmiError> {
        let operations = self
            .backend
            .list_operations()
            .await
            .map_err(|e| HmiError::backend("could not list operations", e))?;
        Ok(operations.iter().map(Operation::summary).collect())
    }

    /// Forwards the cancel request verbatim; the executive checks the id.
    pub async fn stop(&self, operation_id: &str) -> Result<(), HmiError> {
        self.backend
            .cancel_operation(operation_id)
            .await
            .map_err(|e| HmiError::backend("could not stop operation", e))?;
        info!("Requested cancellation of {}", operation_id);
        Ok(())
    }

    pub async fn start(&self, process: &Process) -> Result<ExecutiveStart, HmiError> {
        let _guard = match &self.start_guard {
            Some(lock) => Some(lock.lock().await),
            None => None,
        };

        if let Some(current) = self.current_operation().await? {
            self.backend
                .delete_operation(&current.name)
                .await
                .map_err(|e| HmiError::backend("could not delete old operation", e))?;
            debug!("Deleted previous operation {}", current.name);
        }

        let created = self
            .backend
            .create_operation(process)
            .await
            .map_err(|e| HmiError::backend("could not create operation", e))?;

        let started = self
            .backend
            .start_operation(&created.name, ExecutionMode::Normal, self.simulation_mode)
            .await
            .map_err(|e| HmiError::backend("could not start operation", e))?;

        info!(
            "Started process '{}' as {} ({:?})",
            process.name, started.name, self.simulation_mode
        );
        Ok(ExecutiveStart {
            operation_id: started.name,
        })
    }
}
