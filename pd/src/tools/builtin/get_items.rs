//! List all tracked inventory items

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use crate::tools::{Classification, Tool, ToolContext, ToolError};

pub struct GetInventoryItemsTool;

#[async_trait]
impl Tool for GetInventoryItemsTool {
    fn name(&self) -> &'static str {
        "get_inventory_items"
    }

    fn description(&self) -> &'static str {
        "List every tracked household item with its current quantity, unit, and restock threshold."
    }

    fn classification(&self) -> Classification {
        Classification::Informational
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _input: Value, ctx: &ToolContext) -> Result<String, ToolError> {
        debug!(turn_id = %ctx.turn_id, "GetInventoryItemsTool::execute");
        let items = ctx.store.list_items().await?;

        let listing: Vec<Value> = items
            .iter()
            .map(|i| {
                json!({
                    "name": i.name,
                    "quantity": i.quantity,
                    "unit": i.unit,
                    "min_quantity": i.min_quantity,
                    "low": i.is_low(),
                })
            })
            .collect();

        Ok(json!({ "count": items.len(), "items": listing }).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StateManager;
    use pantrystore::Item;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_lists_items() {
        let temp = tempdir().unwrap();
        let state = StateManager::spawn(temp.path()).unwrap();
        state.upsert_item(Item::new("rice", 5.0, "kg")).await.unwrap();
        state.upsert_item(Item::new("milk", 2.0, "liters")).await.unwrap();

        let ctx = ToolContext::new(state, "turn-1");
        let result = GetInventoryItemsTool.execute(json!({}), &ctx).await.unwrap();

        let parsed: Value = serde_json::from_str(&result).unwrap();
        assert_eq!(parsed["count"], 2);
        assert_eq!(parsed["items"][0]["name"], "milk");
    }

    #[tokio::test]
    async fn test_empty_store() {
        let temp = tempdir().unwrap();
        let state = StateManager::spawn(temp.path()).unwrap();
        let ctx = ToolContext::new(state, "turn-1");

        let result = GetInventoryItemsTool.execute(json!({}), &ctx).await.unwrap();
        let parsed: Value = serde_json::from_str(&result).unwrap();
        assert_eq!(parsed["count"], 0);
    }
}
