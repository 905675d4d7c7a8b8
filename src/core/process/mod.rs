use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::core::error::HmiError;
use crate::core::solution::SolutionCatalog;

/// Behavior-tree definition handed to the executive. The proxy never looks inside it.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessDefinition {
    /// Binary-encoded behavior tree exported to a file.
    Serialized(Vec<u8>),
    /// Behavior tree document fetched from the solution catalog.
    Document(Value),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Process {
    pub name: String,
    pub definition: ProcessDefinition,
}

/// Processes read once from a directory at startup, keyed by file name.
#[derive(Debug, Default)]
pub struct StaticProcessTable {
    processes: HashMap<String, Arc<Process>>,
}

impl StaticProcessTable {
    pub async fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let mut entries = tokio::fs::read_dir(dir)
            .await
            .with_context(|| format!("failed to read processes directory {}", dir.display()))?;

        let mut processes = HashMap::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                warn!("Skipping non-file entry in processes directory: {:?}", entry.path());
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') || name.ends_with(".md") {
                warn!("Skipping non-process file in processes directory: {:?}", entry.path());
                continue;
            }
            let bytes = tokio::fs::read(entry.path())
                .await
                .with_context(|| format!("failed to read process file {:?}", entry.path()))?;
            processes.insert(
                name.clone(),
                Arc::new(Process {
                    name,
                    definition: ProcessDefinition::Serialized(bytes),
                }),
            );
        }

        let table = Self { processes };
        info!(
            "Loaded {} static process(es) from {}: {:?}",
            table.processes.len(),
            dir.display(),
            table.names()
        );
        Ok(table)
    }

    #[cfg(test)]
    pub fn from_processes(processes: impl IntoIterator<Item = Process>) -> Self {
        Self {
            processes: processes
                .into_iter()
                .map(|p| (p.name.clone(), Arc::new(p)))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<Process>> {
        self.processes.get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.processes.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Resolves a client-supplied process name to a runnable definition.
/// The strategy is fixed per deployment.
pub enum ProcessResolver {
    Static(StaticProcessTable),
    Catalog(Arc<dyn SolutionCatalog>),
}

impl ProcessResolver {
    pub async fn resolve(&self, name: &str) -> Result<Arc<Process>, HmiError> {
        match self {
            ProcessResolver::Static(table) => table
                .get(name)
                .ok_or_else(|| HmiError::ProcessNotFound(name.to_string())),
            ProcessResolver::Catalog(catalog) => match catalog.get_behavior_tree(name).await {
                Ok(document) => Ok(Arc::new(Process {
                    name: name.to_string(),
                    definition: ProcessDefinition::Document(document),
                })),
                Err(e) => {
                    // Catalog outages are reported as an unknown process as well.
                    warn!("Could not fetch behavior tree '{}' from catalog: {}", name, e);
                    Err(HmiError::ProcessNotFound(name.to_string()))
                }
            },
        }
    }
}
