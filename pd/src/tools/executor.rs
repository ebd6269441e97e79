//! ToolExecutor - resolves, validates, and dispatches tool invocations

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use super::context::ToolContext;
use super::error::ToolError;
use super::registry::ToolRegistry;

/// Dispatches tool invocations against a registry
///
/// The executor itself has no side effects beyond dispatch: it resolves the
/// name, validates arguments against the tool's schema, runs the handler
/// under a timeout, and reports failures uniformly as [`ToolError`]. Whatever
/// the handler does to its collaborators is the invocation's only effect.
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
    handler_timeout: Duration,
}

impl ToolExecutor {
    pub fn new(registry: Arc<ToolRegistry>, handler_timeout: Duration) -> Self {
        debug!(?handler_timeout, tools = registry.len(), "ToolExecutor::new");
        Self {
            registry,
            handler_timeout,
        }
    }

    /// Execute one tool invocation
    ///
    /// Fails with UnknownTool before validation, InvalidArguments (listing
    /// every violated constraint) before dispatch, and HandlerTimeout when
    /// the handler exceeds its budget. Handler failures come back as whatever
    /// ToolError the handler mapped them to - domain error types never
    /// escape past this point.
    pub async fn execute(&self, name: &str, arguments: &Value, ctx: &ToolContext) -> Result<String, ToolError> {
        debug!(%name, "ToolExecutor::execute");
        let tool = self.registry.get(name)?;

        let violations = validate_arguments(&tool.input_schema(), arguments);
        if !violations.is_empty() {
            debug!(%name, count = violations.len(), "ToolExecutor::execute: argument violations");
            return Err(ToolError::InvalidArguments { violations });
        }

        match tokio::time::timeout(self.handler_timeout, tool.execute(arguments.clone(), ctx)).await {
            Ok(result) => result,
            Err(_) => Err(ToolError::HandlerTimeout {
                timeout_ms: self.handler_timeout.as_millis() as u64,
            }),
        }
    }
}

/// Validate arguments against a JSON-Schema-style object schema
///
/// Returns every violated constraint, not just the first: missing required
/// parameters, type mismatches, enum violations, and minimum bounds.
pub fn validate_arguments(schema: &Value, arguments: &Value) -> Vec<String> {
    let mut violations = Vec::new();

    let Some(args) = arguments.as_object() else {
        return vec!["arguments must be a JSON object".to_string()];
    };

    let properties = schema.get("properties").and_then(|p| p.as_object());

    if let Some(required) = schema.get("required").and_then(|r| r.as_array()) {
        for name in required.iter().filter_map(|v| v.as_str()) {
            if !args.contains_key(name) {
                violations.push(format!("missing required parameter: {}", name));
            }
        }
    }

    let Some(properties) = properties else {
        return violations;
    };

    for (name, value) in args {
        let Some(spec) = properties.get(name) else {
            violations.push(format!("unknown parameter: {}", name));
            continue;
        };

        if let Some(expected) = spec.get("type").and_then(|t| t.as_str())
            && !type_matches(expected, value)
        {
            violations.push(format!("parameter '{}' must be a {}", name, expected));
            continue;
        }

        if let Some(allowed) = spec.get("enum").and_then(|e| e.as_array())
            && !allowed.contains(value)
        {
            violations.push(format!(
                "parameter '{}' must be one of {}",
                name,
                serde_json::to_string(allowed).unwrap_or_default()
            ));
        }

        if let Some(minimum) = spec.get("minimum").and_then(|m| m.as_f64())
            && let Some(number) = value.as_f64()
            && number < minimum
        {
            violations.push(format!("parameter '{}' must be >= {}", name, minimum));
        }
    }

    violations
}

fn type_matches(expected: &str, value: &Value) -> bool {
    match expected {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        _ => true,
    }
}
