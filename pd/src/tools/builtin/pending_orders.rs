//! List orders that have not yet been confirmed

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use pantrystore::OrderStatus;

use crate::tools::{Classification, Tool, ToolContext, ToolError};

pub struct GetPendingOrdersTool;

#[async_trait]
impl Tool for GetPendingOrdersTool {
    fn name(&self) -> &'static str {
        "get_pending_orders"
    }

    fn description(&self) -> &'static str {
        "List orders that have been placed but not yet confirmed by the vendor."
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
        debug!(turn_id = %ctx.turn_id, "GetPendingOrdersTool::execute");
        let orders = ctx.store.list_orders(Some(OrderStatus::Pending)).await?;

        let listing: Vec<Value> = orders
            .iter()
            .map(|o| {
                json!({
                    "item_name": o.item_name,
                    "quantity": o.quantity,
                    "total_usd": o.total_usd,
                    "created_at": o.created_at.to_rfc3339(),
                })
            })
            .collect();

        Ok(json!({ "count": orders.len(), "orders": listing }).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StateManager;
    use pantrystore::OrderRecord;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_lists_only_pending() {
        let temp = tempdir().unwrap();
        let state = StateManager::spawn(temp.path()).unwrap();

        state.record_order(OrderRecord::new("rice", 2.0, 12.0)).await.unwrap();
        let mut confirmed = OrderRecord::new("milk", 1.0, 3.0);
        confirmed.status = OrderStatus::Confirmed;
        state.record_order(confirmed).await.unwrap();

        let ctx = ToolContext::new(state, "turn-1");
        let result = GetPendingOrdersTool.execute(json!({}), &ctx).await.unwrap();

        let parsed: Value = serde_json::from_str(&result).unwrap();
        assert_eq!(parsed["count"], 1);
        assert_eq!(parsed["orders"][0]["item_name"], "rice");
    }
}
