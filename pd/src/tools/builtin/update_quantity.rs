//! Set the quantity of an existing item

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use crate::tools::{Classification, Tool, ToolContext, ToolError};

pub struct UpdateItemQuantityTool;

#[async_trait]
impl Tool for UpdateItemQuantityTool {
    fn name(&self) -> &'static str {
        "update_item_quantity"
    }

    fn description(&self) -> &'static str {
        "Set the current quantity of an existing tracked item, e.g. after shopping or a stocktake."
    }

    fn classification(&self) -> Classification {
        Classification::Mutating
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": { "type": "string", "description": "Item name" },
                "quantity": { "type": "number", "minimum": 0, "description": "New quantity on hand" }
            },
            "required": ["name", "quantity"]
        })
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<String, ToolError> {
        let name = input["name"].as_str().unwrap_or_default();
        let quantity = input["quantity"].as_f64().unwrap_or(0.0);
        debug!(turn_id = %ctx.turn_id, %name, quantity, "UpdateItemQuantityTool::execute");

        let item = ctx.store.update_quantity(name, quantity).await?;
        Ok(json!({
            "name": item.name,
            "quantity": item.quantity,
            "unit": item.unit,
            "low": item.is_low(),
        })
        .to_string())
    }
}
