//! List items at or below their restock threshold

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use crate::tools::{Classification, Tool, ToolContext, ToolError};

pub struct GetLowStockItemsTool;

#[async_trait]
impl Tool for GetLowStockItemsTool {
    fn name(&self) -> &'static str {
        "get_low_stock_items"
    }

    fn description(&self) -> &'static str {
        "List items whose current quantity is at or below their restock threshold."
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
        debug!(turn_id = %ctx.turn_id, "GetLowStockItemsTool::execute");
        let items = ctx.store.low_stock_items().await?;

        let listing: Vec<Value> = items
            .iter()
            .map(|i| {
                json!({
                    "name": i.name,
                    "quantity": i.quantity,
                    "unit": i.unit,
                    "min_quantity": i.min_quantity,
                })
            })
            .collect();

        Ok(json!({ "count": items.len(), "items": listing }).to_string())
    }
}
