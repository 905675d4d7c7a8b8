use axum::{extract::State, response::Response};
use serde::Serialize;

use super::super::AppState;
use super::super::response::json_ok;
use crate::core::error::HmiError;
use crate::core::solution::PROCESS_PAGE_SIZE;

#[derive(Serialize)]
pub struct ProcessList {
    names: Vec<String>,
}

/// Names of all processes saved in the running solution.
pub async fn list_processes_endpoint(
    State(state): State<AppState>,
) -> Result<Response, HmiError> {
    let catalog = state
        .catalog
        .as_ref()
        .ok_or_else(|| HmiError::NotFound("solution catalog is not configured".into()))?;

    let page = catalog
        .list_behavior_trees(PROCESS_PAGE_SIZE)
        .await
        .map_err(|e| HmiError::backend("could not get list of behavior trees in solution", e))?;
    if !page.next_page_token.is_empty() {
        return Err(HmiError::Internal(format!(
            "more than {PROCESS_PAGE_SIZE} behavior trees in solution, pagination is not supported"
        )));
    }

    Ok(json_ok(&ProcessList {
        names: page.behavior_trees.into_iter().map(|bt| bt.name).collect(),
    }))
}

pub async fn solution_status_endpoint(
    State(state): State<AppState>,
) -> Result<Response, HmiError> {
    let catalog = state
        .catalog
        .as_ref()
        .ok_or_else(|| HmiError::NotFound("solution catalog is not configured".into()))?;
    let status = catalog
        .status()
        .await
        .map_err(|e| HmiError::backend("could not get solution status", e))?;
    Ok(json_ok(&status))
}
