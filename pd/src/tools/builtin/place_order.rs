//! Place a vendor order for an item

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{debug, info};

use pantrystore::{OrderRecord, OrderStatus};

use crate::vendor::OrderRequest;

use crate::tools::{Classification, Tool, ToolContext, ToolError};

pub struct PlaceOrderTool;

#[async_trait]
impl Tool for PlaceOrderTool {
    fn name(&self) -> &'static str {
        "place_order"
    }

    fn description(&self) -> &'static str {
        "Place an order with the household's vendor for a given item, quantity, and total price."
    }

    fn classification(&self) -> Classification {
        Classification::Financial
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "item_name": { "type": "string", "description": "Item to order" },
                "quantity": { "type": "number", "minimum": 0, "description": "Quantity to order" },
                "total_usd": { "type": "number", "minimum": 0, "description": "Total price in USD" }
            },
            "required": ["item_name", "quantity", "total_usd"]
        })
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<String, ToolError> {
        let item_name = input["item_name"].as_str().unwrap_or_default();
        let quantity = input["quantity"].as_f64().unwrap_or(0.0);
        let total_usd = input["total_usd"].as_f64().unwrap_or(0.0);
        debug!(turn_id = %ctx.turn_id, %item_name, quantity, total_usd, "PlaceOrderTool::execute");

        let vendor = ctx.vendor.as_ref().ok_or_else(|| ToolError::Collaborator {
            message: "no vendor client configured".to_string(),
            transient: false,
        })?;

        let confirmation = vendor
            .place_order(OrderRequest {
                item_name: item_name.to_string(),
                quantity,
                total_usd,
            })
            .await?;

        let mut order = OrderRecord::new(item_name, quantity, confirmation.charged_usd);
        order.status = OrderStatus::Confirmed;
        order.vendor_ref = Some(confirmation.reference.clone());
        ctx.store.record_order(order).await?;

        info!(%item_name, reference = %confirmation.reference, "Order placed");
        Ok(json!({
            "ordered": item_name,
            "quantity": quantity,
            "charged_usd": confirmation.charged_usd,
            "reference": confirmation.reference,
        })
        .to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StateManager;
    use crate::vendor::mock::MockVendorClient;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_places_order_and_records_it() {
        let temp = tempdir().unwrap();
        let state = StateManager::spawn(temp.path()).unwrap();
        let vendor = Arc::new(MockVendorClient::accepting());
        let ctx = ToolContext::new(state.clone(), "turn-1").with_vendor(vendor.clone());

        let result = PlaceOrderTool
            .execute(json!({"item_name": "rice", "quantity": 2.0, "total_usd": 12.0}), &ctx)
            .await
            .unwrap();

        let parsed: Value = serde_json::from_str(&result).unwrap();
        assert_eq!(parsed["reference"], "mock-rice");
        assert_eq!(vendor.call_count(), 1);

        let orders = state.list_orders(None).await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].status, OrderStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_without_vendor_fails_as_collaborator_error() {
        let temp = tempdir().unwrap();
        let state = StateManager::spawn(temp.path()).unwrap();
        let ctx = ToolContext::new(state, "turn-1");

        let err = PlaceOrderTool
            .execute(json!({"item_name": "rice", "quantity": 1.0, "total_usd": 5.0}), &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Collaborator { transient: false, .. }));
    }

    #[tokio::test]
    async fn test_vendor_rejection_propagates() {
        use crate::vendor::VendorError;

        let temp = tempdir().unwrap();
        let state = StateManager::spawn(temp.path()).unwrap();
        let vendor = Arc::new(MockVendorClient::with_script(vec![Err(VendorError::Rejected(
            "out of stock".to_string(),
        ))]));
        let ctx = ToolContext::new(state.clone(), "turn-1").with_vendor(vendor);

        let err = PlaceOrderTool
            .execute(json!({"item_name": "rice", "quantity": 1.0, "total_usd": 5.0}), &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Collaborator { transient: false, .. }));

        // Rejected orders are not recorded
        assert!(state.list_orders(None).await.unwrap().is_empty());
    }
}
