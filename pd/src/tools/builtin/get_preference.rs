//! Read a single household preference

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use crate::tools::{Classification, Tool, ToolContext, ToolError};

pub struct GetPreferenceTool;

#[async_trait]
impl Tool for GetPreferenceTool {
    fn name(&self) -> &'static str {
        "get_preference"
    }

    fn description(&self) -> &'static str {
        "Read a named household preference value, such as the monthly budget or preferred vendor."
    }

    fn classification(&self) -> Classification {
        Classification::Informational
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "key": {
                    "type": "string",
                    "description": "Preference key to read"
                }
            },
            "required": ["key"]
        })
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<String, ToolError> {
        let key = input["key"].as_str().unwrap_or_default();
        debug!(turn_id = %ctx.turn_id, %key, "GetPreferenceTool::execute");

        match ctx.store.get_preference(key).await? {
            Some(pref) => Ok(json!({ "key": pref.key, "value": pref.value }).to_string()),
            None => Ok(json!({ "key": key, "value": null }).to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StateManager;
    use pantrystore::Preference;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_reads_preference() {
        let temp = tempdir().unwrap();
        let state = StateManager::spawn(temp.path()).unwrap();
        state
            .set_preference(Preference::new("preferred_vendor", json!("grocer-a")))
            .await
            .unwrap();

        let ctx = ToolContext::new(state, "turn-1");
        let result = GetPreferenceTool
            .execute(json!({"key": "preferred_vendor"}), &ctx)
            .await
            .unwrap();

        let parsed: Value = serde_json::from_str(&result).unwrap();
        assert_eq!(parsed["value"], "grocer-a");
    }

    #[tokio::test]
    async fn test_missing_preference_is_null() {
        let temp = tempdir().unwrap();
        let state = StateManager::spawn(temp.path()).unwrap();
        let ctx = ToolContext::new(state, "turn-1");

        let result = GetPreferenceTool.execute(json!({"key": "nope"}), &ctx).await.unwrap();
        let parsed: Value = serde_json::from_str(&result).unwrap();
        assert!(parsed["value"].is_null());
    }
}
