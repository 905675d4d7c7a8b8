use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::Operation;
use crate::core::error::HmiError;

/// Execution state of a behavior tree, as carried in run metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BehaviorTreeState {
    #[default]
    Unspecified,
    Accepted,
    Running,
    Succeeded,
    Failed,
    Canceled,
    Canceling,
    Failing,
    Suspending,
    Suspended,
}

const STATES: [(BehaviorTreeState, &str); 10] = [
    (BehaviorTreeState::Unspecified, "UNSPECIFIED"),
    (BehaviorTreeState::Accepted, "ACCEPTED"),
    (BehaviorTreeState::Running, "RUNNING"),
    (BehaviorTreeState::Succeeded, "SUCCEEDED"),
    (BehaviorTreeState::Failed, "FAILED"),
    (BehaviorTreeState::Canceled, "CANCELED"),
    (BehaviorTreeState::Canceling, "CANCELING"),
    (BehaviorTreeState::Failing, "FAILING"),
    (BehaviorTreeState::Suspending, "SUSPENDING"),
    (BehaviorTreeState::Suspended, "SUSPENDED"),
];

impl BehaviorTreeState {
    pub fn name(self) -> &'static str {
        STATES[self as usize].1
    }

    fn from_number(n: i64) -> Option<Self> {
        usize::try_from(n)
            .ok()
            .and_then(|i| STATES.get(i))
            .map(|(state, _)| *state)
    }

    fn from_name(name: &str) -> Option<Self> {
        // The gateway may send either `RUNNING` or the fully qualified `STATE_RUNNING`.
        let short = name.strip_prefix("STATE_").unwrap_or(name);
        STATES
            .iter()
            .find(|(_, n)| *n == short)
            .map(|(state, _)| *state)
    }
}

impl<'de> Deserialize<'de> for BehaviorTreeState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Name(String),
            Number(i64),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Name(name) => BehaviorTreeState::from_name(&name).ok_or_else(|| {
                serde::de::Error::custom(format!("unknown behavior tree state '{name}'"))
            }),
            Raw::Number(n) => BehaviorTreeState::from_number(n).ok_or_else(|| {
                serde::de::Error::custom(format!("unknown behavior tree state {n}"))
            }),
        }
    }
}

/// Execution payload embedded in an operation's metadata.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunMetadata {
    #[serde(rename = "@type", default)]
    pub type_url: Option<String>,
    #[serde(default)]
    pub behavior_tree_state: BehaviorTreeState,
}

const RUN_METADATA_TYPE: &str = "RunMetadata";

impl RunMetadata {
    pub fn decode(metadata: Option<&Value>) -> Result<Self, HmiError> {
        let value = metadata
            .ok_or_else(|| HmiError::MalformedMetadata("operation has no metadata".into()))?;
        if !value.is_object() {
            return Err(HmiError::MalformedMetadata(format!(
                "expected an object, got {value}"
            )));
        }
        let decoded: RunMetadata = serde_json::from_value(value.clone())
            .map_err(|e| HmiError::MalformedMetadata(e.to_string()))?;

        if let Some(type_url) = &decoded.type_url {
            let message = type_url.rsplit(['/', '.']).next().unwrap_or_default();
            if message != RUN_METADATA_TYPE {
                return Err(HmiError::MalformedMetadata(format!(
                    "mismatched message type '{type_url}'"
                )));
            }
        }
        Ok(decoded)
    }
}

/// Status projection returned by `GET /api/executive/status`.
///
/// The default value (empty id and status) means the executive has never run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutiveStatus {
    pub done: bool,
    pub operation_id: String,
    pub status: String,
    pub error: String,
}

impl ExecutiveStatus {
    pub fn project(op: &Operation) -> Result<Self, HmiError> {
        let metadata = RunMetadata::decode(op.metadata.as_ref())?;
        Ok(Self {
            done: op.done,
            operation_id: op.name.clone(),
            status: metadata.behavior_tree_state.name().to_string(),
            error: op
                .error
                .as_ref()
                .map(|e| e.message.clone())
                .unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutiveStart {
    pub operation_id: String,
}
