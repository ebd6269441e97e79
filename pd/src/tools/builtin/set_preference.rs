//! Write a single household preference

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use pantrystore::Preference;

use crate::tools::{Classification, Tool, ToolContext, ToolError};

pub struct SetPreferenceTool;

#[async_trait]
impl Tool for SetPreferenceTool {
    fn name(&self) -> &'static str {
        "set_preference"
    }

    fn description(&self) -> &'static str {
        "Set a named household preference value, such as the monthly budget or preferred vendor. \
         Budget changes above the configured ceiling are refused."
    }

    fn classification(&self) -> Classification {
        Classification::Mutating
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "key": { "type": "string", "description": "Preference key" },
                "value": { "description": "New value (string, number, or boolean)" }
            },
            "required": ["key", "value"]
        })
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<String, ToolError> {
        let key = input["key"].as_str().unwrap_or_default();
        let value = input.get("value").cloned().unwrap_or(Value::Null);
        debug!(turn_id = %ctx.turn_id, %key, "SetPreferenceTool::execute");

        ctx.store.set_preference(Preference::new(key, value.clone())).await?;
        Ok(json!({ "key": key, "value": value }).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StateManager;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_sets_preference() {
        let temp = tempdir().unwrap();
        let state = StateManager::spawn(temp.path()).unwrap();
        let ctx = ToolContext::new(state.clone(), "turn-1");

        SetPreferenceTool
            .execute(json!({"key": "preferred_vendor", "value": "grocer-b"}), &ctx)
            .await
            .unwrap();

        let pref = state.get_preference("preferred_vendor").await.unwrap().unwrap();
        assert_eq!(pref.value, json!("grocer-b"));
    }
}
