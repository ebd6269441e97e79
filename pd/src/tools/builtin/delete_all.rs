//! Wipe the entire inventory
//!
//! Registered so the model can see it exists, but guardrail-listed by default
//! configuration; the policy denies it regardless of approval state.

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::tools::{Classification, Tool, ToolContext, ToolError};

pub struct DeleteAllInventoryTool;

#[async_trait]
impl Tool for DeleteAllInventoryTool {
    fn name(&self) -> &'static str {
        "delete_all_inventory"
    }

    fn description(&self) -> &'static str {
        "Remove every tracked item from the inventory. Irreversible."
    }

    fn classification(&self) -> Classification {
        Classification::Mutating
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _input: Value, ctx: &ToolContext) -> Result<String, ToolError> {
        debug!(turn_id = %ctx.turn_id, "DeleteAllInventoryTool::execute");
        let removed = ctx.store.delete_all_items().await?;
        warn!(removed, "Deleted entire inventory");
        Ok(json!({ "removed": removed }).to_string())
    }
}
