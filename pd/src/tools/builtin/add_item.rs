//! Add or replace a tracked inventory item

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use pantrystore::Item;

use crate::tools::{Classification, Tool, ToolContext, ToolError};

pub struct AddInventoryItemTool;

#[async_trait]
impl Tool for AddInventoryItemTool {
    fn name(&self) -> &'static str {
        "add_inventory_item"
    }

    fn description(&self) -> &'static str {
        "Add a new tracked item, or replace an existing item of the same name."
    }

    fn classification(&self) -> Classification {
        Classification::Mutating
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": { "type": "string", "description": "Item name" },
                "quantity": { "type": "number", "minimum": 0, "description": "Quantity on hand" },
                "unit": { "type": "string", "description": "Unit of measure" },
                "min_quantity": { "type": "number", "minimum": 0, "description": "Restock threshold" },
                "avg_daily_use": { "type": "number", "minimum": 0, "description": "Average consumption per day" }
            },
            "required": ["name", "quantity", "unit"]
        })
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<String, ToolError> {
        let name = input["name"].as_str().unwrap_or_default();
        let quantity = input["quantity"].as_f64().unwrap_or(0.0);
        let unit = input["unit"].as_str().unwrap_or("count");
        debug!(turn_id = %ctx.turn_id, %name, quantity, "AddInventoryItemTool::execute");

        let item = Item::new(name, quantity, unit)
            .with_min_quantity(input["min_quantity"].as_f64().unwrap_or(0.0))
            .with_avg_daily_use(input["avg_daily_use"].as_f64().unwrap_or(0.0));

        ctx.store.upsert_item(item).await?;
        Ok(json!({ "added": name, "quantity": quantity, "unit": unit }).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StateManager;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_adds_item() {
        let temp = tempdir().unwrap();
        let state = StateManager::spawn(temp.path()).unwrap();
        let ctx = ToolContext::new(state.clone(), "turn-1");

        AddInventoryItemTool
            .execute(
                json!({"name": "flour", "quantity": 2.0, "unit": "kg", "min_quantity": 1.0}),
                &ctx,
            )
            .await
            .unwrap();

        let item = state.get_item("flour").await.unwrap().unwrap();
        assert_eq!(item.quantity, 2.0);
        assert_eq!(item.min_quantity, 1.0);
    }
}
