use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::{ExecutionMode, ExecutiveBackend, Operation, SimulationMode};
use crate::core::process::{Process, ProcessDefinition};
use crate::core::solution::{BehaviorTreePage, SolutionCatalog};

/// JSON/HTTP client for the executive and solution services, both reached
/// through the cluster ingress.
#[derive(Clone)]
pub struct GatewayClient {
    client: Client,
    base: Url,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
enum CreateOperationRequest<'a> {
    BehaviorTree(&'a Value),
    SerializedBehaviorTree(String),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StartOperationRequest {
    execution_mode: ExecutionMode,
    simulation_mode: SimulationMode,
}

#[derive(Deserialize, Default)]
struct ListOperationsResponse {
    #[serde(default)]
    operations: Vec<Operation>,
}

impl GatewayClient {
    /// `address` is either a full URL or a bare `host:port` (plain HTTP is assumed).
    pub fn new(address: &str, timeout: Duration) -> Result<Self> {
        let with_scheme = if address.contains("://") {
            address.to_string()
        } else {
            format!("http://{address}")
        };
        let base = Url::parse(&with_scheme)
            .with_context(|| format!("invalid ingress address '{address}'"))?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base })
    }

    /// Builds `<base>/v1/<segments...>`, percent-encoding each segment.
    /// Empty and dot segments are refused so a name can never climb out of
    /// the resource it addresses.
    fn endpoint(&self, segments: &[&str], verb: Option<&str>) -> Result<String> {
        let mut encoded = Vec::with_capacity(segments.len());
        for segment in segments {
            if segment.is_empty() || *segment == "." || *segment == ".." {
                return Err(anyhow!("invalid resource path segment '{segment}'"));
            }
            encoded.push(urlencoding::encode(segment).into_owned());
        }
        let mut url = format!(
            "{}/v1/{}",
            self.base.as_str().trim_end_matches('/'),
            encoded.join("/")
        );
        if let Some(verb) = verb {
            url.push(':');
            url.push_str(verb);
        }
        Ok(url)
    }

    /// Endpoint for a resource name such as `operations/42`.
    fn resource(&self, name: &str, verb: Option<&str>) -> Result<String> {
        let segments: Vec<&str> = name.split('/').collect();
        self.endpoint(&segments, verb)
    }

    async fn read_json<T: DeserializeOwned>(res: Response) -> Result<T> {
        let res = Self::check(res).await?;
        Ok(res.json().await?)
    }

    async fn check(res: Response) -> Result<Response> {
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }
        let body = res.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| {
                v.pointer("/error/message")
                    .or_else(|| v.get("message"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or(body);
        Err(anyhow!("gateway returned {}: {}", status, message.trim()))
    }
}

#[async_trait]
impl ExecutiveBackend for GatewayClient {
    async fn list_operations(&self) -> Result<Vec<Operation>> {
        let res = self
            .client
            .get(self.endpoint(&["operations"], None)?)
            .send()
            .await?;
        let parsed: ListOperationsResponse = Self::read_json(res).await?;
        Ok(parsed.operations)
    }

    async fn create_operation(&self, process: &Process) -> Result<Operation> {
        let body = match &process.definition {
            ProcessDefinition::Document(doc) => CreateOperationRequest::BehaviorTree(doc),
            ProcessDefinition::Serialized(bytes) => {
                CreateOperationRequest::SerializedBehaviorTree(BASE64.encode(bytes))
            }
        };
        debug!("Creating operation for process '{}'", process.name);
        let res = self
            .client
            .post(self.endpoint(&["operations"], None)?)
            .json(&body)
            .send()
            .await?;
        Self::read_json(res).await
    }

    async fn start_operation(
        &self,
        name: &str,
        execution_mode: ExecutionMode,
        simulation_mode: SimulationMode,
    ) -> Result<Operation> {
        let res = self
            .client
            .post(self.resource(name, Some("start"))?)
            .json(&StartOperationRequest {
                execution_mode,
                simulation_mode,
            })
            .send()
            .await?;
        Self::read_json(res).await
    }

    async fn cancel_operation(&self, name: &str) -> Result<()> {
        let res = self
            .client
            .post(self.resource(name, Some("cancel"))?)
            .json(&serde_json::json!({}))
            .send()
            .await?;
        Self::check(res).await?;
        Ok(())
    }

    async fn delete_operation(&self, name: &str) -> Result<()> {
        let res = self.client.delete(self.resource(name, None)?).send().await?;
        Self::check(res).await?;
        Ok(())
    }
}

#[async_trait]
impl SolutionCatalog for GatewayClient {
    async fn get_behavior_tree(&self, name: &str) -> Result<Value> {
        let res = self
            .client
            .get(self.endpoint(&["behaviorTrees", name], None)?)
            .send()
            .await?;
        Self::read_json(res).await
    }

    async fn list_behavior_trees(&self, page_size: u32) -> Result<BehaviorTreePage> {
        let res = self
            .client
            .get(self.endpoint(&["behaviorTrees"], None)?)
            .query(&[("pageSize", page_size)])
            .send()
            .await?;
        Self::read_json(res).await
    }

    async fn status(&self) -> Result<Value> {
        let res = self
            .client
            .get(self.endpoint(&["solution"], Some("status"))?)
            .send()
            .await?;
        Self::read_json(res).await
    }
}
