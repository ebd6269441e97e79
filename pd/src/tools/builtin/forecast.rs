//! Depletion forecast from average daily consumption

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use crate::tools::{Classification, Tool, ToolContext, ToolError};

pub struct GetUsageForecastTool;

#[async_trait]
impl Tool for GetUsageForecastTool {
    fn name(&self) -> &'static str {
        "get_usage_forecast"
    }

    fn description(&self) -> &'static str {
        "Forecast how many days each item will last at its average daily consumption rate. \
         Items without a known consumption rate are listed separately."
    }

    fn classification(&self) -> Classification {
        Classification::Informational
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "item_name": {
                    "type": "string",
                    "description": "Limit the forecast to a single item"
                }
            }
        })
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<String, ToolError> {
        debug!(turn_id = %ctx.turn_id, "GetUsageForecastTool::execute");
        let items = match input.get("item_name").and_then(|v| v.as_str()) {
            Some(name) => ctx.store.get_item(name).await?.into_iter().collect(),
            None => ctx.store.list_items().await?,
        };

        let mut forecast = Vec::new();
        let mut no_rate = Vec::new();
        for item in &items {
            match item.days_remaining() {
                Some(days) => forecast.push(json!({
                    "name": item.name,
                    "quantity": item.quantity,
                    "unit": item.unit,
                    "avg_daily_use": item.avg_daily_use,
                    "days_remaining": (days * 10.0).round() / 10.0,
                })),
                None => no_rate.push(item.name.clone()),
            }
        }

        // Soonest depletion first
        forecast.sort_by(|a, b| {
            let da = a["days_remaining"].as_f64().unwrap_or(f64::MAX);
            let db = b["days_remaining"].as_f64().unwrap_or(f64::MAX);
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(json!({ "forecast": forecast, "no_consumption_data": no_rate }).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StateManager;
    use pantrystore::Item;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_forecast_orders_by_depletion() {
        let temp = tempdir().unwrap();
        let state = StateManager::spawn(temp.path()).unwrap();
        state
            .upsert_item(Item::new("coffee", 100.0, "grams").with_avg_daily_use(50.0))
            .await
            .unwrap();
        state
            .upsert_item(Item::new("rice", 10.0, "kg").with_avg_daily_use(0.5))
            .await
            .unwrap();
        state.upsert_item(Item::new("candles", 4.0, "count")).await.unwrap();

        let ctx = ToolContext::new(state, "turn-1");
        let result = GetUsageForecastTool.execute(json!({}), &ctx).await.unwrap();

        let parsed: Value = serde_json::from_str(&result).unwrap();
        assert_eq!(parsed["forecast"][0]["name"], "coffee");
        assert_eq!(parsed["forecast"][0]["days_remaining"], 2.0);
        assert_eq!(parsed["no_consumption_data"][0], "candles");
    }

    #[tokio::test]
    async fn test_forecast_single_item() {
        let temp = tempdir().unwrap();
        let state = StateManager::spawn(temp.path()).unwrap();
        state
            .upsert_item(Item::new("coffee", 100.0, "grams").with_avg_daily_use(25.0))
            .await
            .unwrap();

        let ctx = ToolContext::new(state, "turn-1");
        let result = GetUsageForecastTool
            .execute(json!({"item_name": "coffee"}), &ctx)
            .await
            .unwrap();

        let parsed: Value = serde_json::from_str(&result).unwrap();
        assert_eq!(parsed["forecast"].as_array().unwrap().len(), 1);
        assert_eq!(parsed["forecast"][0]["days_remaining"], 4.0);
    }
}
