use axum::{
    body::Bytes,
    extract::{Path, State},
    response::Response,
};
use serde::Deserialize;

use super::super::AppState;
use super::super::response::{empty_ok, json_ok};
use crate::core::error::HmiError;

pub async fn status_endpoint(State(state): State<AppState>) -> Result<Response, HmiError> {
    let status = state
        .controller
        .status()
        .await
        .map_err(|e| prefixed("could not get executive status", e))?;
    Ok(json_ok(&status))
}

pub async fn operations_endpoint(State(state): State<AppState>) -> Result<Response, HmiError> {
    let operations = state.controller.operations().await?;
    Ok(json_ok(&serde_json::json!({ "operations": operations })))
}

#[derive(Deserialize)]
pub struct StartRequest {
    #[serde(rename = "processName", default)]
    process_name: String,
}

pub async fn start_endpoint(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, HmiError> {
    let request: StartRequest = serde_json::from_slice(&body)
        .map_err(|e| HmiError::InvalidRequest(format!("could not parse request body: {e}")))?;
    if request.process_name.is_empty() {
        return Err(HmiError::InvalidRequest(
            "processName must not be empty".into(),
        ));
    }

    let process = state.resolver.resolve(&request.process_name).await?;
    let started = state
        .controller
        .start(&process)
        .await
        .map_err(|e| prefixed("could not start execution", e))?;
    Ok(json_ok(&started))
}

/// `POST /api/executive/{id}/stop`. Operation ids contain slashes
/// (`operations/42`), so the id is everything before the trailing `/stop`.
pub async fn stop_endpoint(
    State(state): State<AppState>,
    Path(rest): Path<String>,
) -> Result<Response, HmiError> {
    let Some(id) = rest.strip_suffix("/stop").or_else(|| {
        // `/api/executive/stop` itself leaves no room for an id.
        (rest == "stop").then_some("")
    }) else {
        return Err(HmiError::NotFound(format!(
            "no route for /api/executive/{rest}"
        )));
    };
    let id = id.trim_matches('/');
    if id.is_empty() {
        return Err(HmiError::InvalidRequest(
            "missing operation ID in path".into(),
        ));
    }

    state
        .controller
        .stop(id)
        .await
        .map_err(|e| prefixed("could not stop execution", e))?;
    Ok(empty_ok())
}

/// Adds handler context to backend failures while keeping the error kind.
fn prefixed(context: &str, err: HmiError) -> HmiError {
    match err {
        HmiError::BackendUnavailable(msg) => {
            HmiError::BackendUnavailable(format!("{context}: {msg}"))
        }
        other => other,
    }
}
