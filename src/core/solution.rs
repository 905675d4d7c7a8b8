use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

/// Fixed page size used when listing saved processes. Pagination beyond the
/// first page is not supported.
pub const PROCESS_PAGE_SIZE: u32 = 25;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorTreeSummary {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorTreePage {
    #[serde(default)]
    pub behavior_trees: Vec<BehaviorTreeSummary>,
    #[serde(default)]
    pub next_page_token: String,
}

/// Solution service: the catalog of behavior trees saved in the running solution.
#[async_trait]
pub trait SolutionCatalog: Send + Sync {
    async fn get_behavior_tree(&self, name: &str) -> Result<Value>;
    async fn list_behavior_trees(&self, page_size: u32) -> Result<BehaviorTreePage>;
    async fn status(&self) -> Result<Value>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_defaults_when_fields_are_omitted() {
        let page: BehaviorTreePage = serde_json::from_str("{}").unwrap();
        assert!(page.behavior_trees.is_empty());
        assert!(page.next_page_token.is_empty());
    }

    #[test]
    fn page_parses_names_and_token() {
        let page: BehaviorTreePage = serde_json::from_value(serde_json::json!({
            "behaviorTrees": [{ "name": "pick_and_place", "description": "ignored" }],
            "nextPageToken": "abc"
        }))
        .unwrap();
        assert_eq!(page.behavior_trees[0].name, "pick_and_place");
        assert_eq!(page.next_page_token, "abc");
    }
}
