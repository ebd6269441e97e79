//! Safety policy for mutating and financial tools
//!
//! A pure decision function: the same (tool, arguments, approval) triple
//! always yields the same verdict. The policy holds configuration only -
//! approval state arrives with each request and lives outside the policy.

use serde_json::Value;
use tracing::debug;

use crate::config::PolicyConfig;
use crate::domain::ApprovalToken;
use crate::tools::{Classification, Tool};

/// Argument fields treated as spend amounts for the budget guardrail
const SPEND_FIELDS: &[&str] = &["total_usd", "estimated_total_usd"];

/// Verdict of a policy evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Execute the handler
    Allow,

    /// Never execute; final for this turn even with an approval token
    Deny,

    /// Execute only once a human approval token is attached
    RequiresApproval,
}

/// Decision returned for one tool-call attempt
#[derive(Debug, Clone)]
pub struct PolicyDecision {
    pub verdict: Verdict,

    /// Human-readable reason, suitable for paraphrasing to the user
    pub reason: String,
}

impl PolicyDecision {
    fn allow(reason: impl Into<String>) -> Self {
        Self {
            verdict: Verdict::Allow,
            reason: reason.into(),
        }
    }

    fn deny(reason: impl Into<String>) -> Self {
        Self {
            verdict: Verdict::Deny,
            reason: reason.into(),
        }
    }

    fn requires_approval(reason: impl Into<String>) -> Self {
        Self {
            verdict: Verdict::RequiresApproval,
            reason: reason.into(),
        }
    }
}

/// The safety policy consulted before every gated tool call
#[derive(Debug, Clone)]
pub struct SafetyPolicy {
    config: PolicyConfig,
}

impl SafetyPolicy {
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    /// Evaluate one tool-call attempt
    ///
    /// Rules in priority order: informational tools are always allowed;
    /// guardrail violations deny even with a token; gated tools without a
    /// covering token require approval.
    pub fn evaluate(&self, tool: &dyn Tool, arguments: &Value, approval: Option<&ApprovalToken>) -> PolicyDecision {
        let name = tool.name();
        let classification = tool.classification();
        debug!(%name, %classification, has_approval = approval.is_some(), "SafetyPolicy::evaluate");

        if !classification.is_gated() {
            return PolicyDecision::allow("informational tool");
        }

        // Guardrails first: a token never widens what policy allows
        if let Some(reason) = self.guardrail_violation(name, classification, arguments) {
            debug!(%name, %reason, "SafetyPolicy::evaluate: guardrail deny");
            return PolicyDecision::deny(reason);
        }

        match approval {
            Some(token) if token.covers(name) => {
                PolicyDecision::allow(format!("approved by {}", token.granted_by))
            }
            _ => PolicyDecision::requires_approval(format!(
                "'{}' is a {} action and needs human approval",
                name, classification
            )),
        }
    }

    fn guardrail_violation(&self, name: &str, classification: Classification, arguments: &Value) -> Option<String> {
        if self.config.guardrailed_tools.iter().any(|t| t == name) {
            return Some(format!("'{}' is guardrail-listed and can never run from a turn", name));
        }

        if classification == Classification::Financial {
            for field in SPEND_FIELDS {
                if let Some(amount) = arguments.get(*field).and_then(|v| v.as_f64())
                    && amount > self.config.budget_ceiling_usd
                {
                    return Some(format!(
                        "spend of ${:.2} exceeds the budget ceiling of ${:.2}",
                        amount, self.config.budget_ceiling_usd
                    ));
                }
            }
        }

        // Raising the budget preference above the ceiling is the same thing
        // as overspending, whichever path the write takes
        if name == "set_preference"
            && arguments.get("key").and_then(|v| v.as_str()) == Some(self.config.budget_preference_key.as_str())
            && let Some(amount) = arguments.get("value").and_then(|v| v.as_f64())
            && amount > self.config.budget_ceiling_usd
        {
            return Some(format!(
                "budget of ${:.2} exceeds the ceiling of ${:.2}",
                amount, self.config.budget_ceiling_usd
            ));
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::standard_registry;
    use proptest::prelude::*;
    use serde_json::json;

    fn policy() -> SafetyPolicy {
        SafetyPolicy::new(PolicyConfig::default())
    }

    fn registry() -> crate::tools::ToolRegistry {
        standard_registry()
    }

    #[test]
    fn test_informational_always_allowed() {
        let registry = registry();
        let tool = registry.get("get_inventory_items").unwrap();

        let decision = policy().evaluate(tool.as_ref(), &json!({}), None);
        assert_eq!(decision.verdict, Verdict::Allow);

        // Approval state is irrelevant for informational tools
        let token = ApprovalToken::new("get_inventory_items", "test");
        let decision = policy().evaluate(tool.as_ref(), &json!({"junk": true}), Some(&token));
        assert_eq!(decision.verdict, Verdict::Allow);
    }

    #[test]
    fn test_gated_without_token_requires_approval() {
        let registry = registry();
        let tool = registry.get("place_order").unwrap();

        let decision = policy().evaluate(
            tool.as_ref(),
            &json!({"item_name": "rice", "quantity": 1.0, "total_usd": 10.0}),
            None,
        );
        assert_eq!(decision.verdict, Verdict::RequiresApproval);
        assert!(decision.reason.contains("approval"));
    }

    #[test]
    fn test_covering_token_allows_gated_tool() {
        let registry = registry();
        let tool = registry.get("place_order").unwrap();
        let token = ApprovalToken::new("place_order", "alex");

        let decision = policy().evaluate(
            tool.as_ref(),
            &json!({"item_name": "rice", "quantity": 1.0, "total_usd": 10.0}),
            Some(&token),
        );
        assert_eq!(decision.verdict, Verdict::Allow);
        assert!(decision.reason.contains("alex"));
    }

    #[test]
    fn test_token_for_other_tool_does_not_cover() {
        let registry = registry();
        let tool = registry.get("set_preference").unwrap();
        let token = ApprovalToken::new("place_order", "alex");

        let decision = policy().evaluate(
            tool.as_ref(),
            &json!({"key": "preferred_vendor", "value": "grocer-a"}),
            Some(&token),
        );
        assert_eq!(decision.verdict, Verdict::RequiresApproval);
    }

    #[test]
    fn test_guardrail_deny_is_final_even_with_token() {
        let registry = registry();
        let tool = registry.get("delete_all_inventory").unwrap();

        let decision = policy().evaluate(tool.as_ref(), &json!({}), None);
        assert_eq!(decision.verdict, Verdict::Deny);

        let token = ApprovalToken::new("delete_all_inventory", "alex");
        let decision = policy().evaluate(tool.as_ref(), &json!({}), Some(&token));
        assert_eq!(decision.verdict, Verdict::Deny);
    }

    #[test]
    fn test_budget_ceiling_denies_large_orders() {
        let registry = registry();
        let tool = registry.get("place_order").unwrap();
        let token = ApprovalToken::new("place_order", "alex");

        let decision = policy().evaluate(
            tool.as_ref(),
            &json!({"item_name": "caviar", "quantity": 10.0, "total_usd": 5000.0}),
            Some(&token),
        );
        assert_eq!(decision.verdict, Verdict::Deny);
        assert!(decision.reason.contains("ceiling"));
    }

    #[test]
    fn test_budget_preference_write_above_ceiling_denied() {
        let registry = registry();
        let tool = registry.get("set_preference").unwrap();
        let token = ApprovalToken::new("set_preference", "alex");

        let decision = policy().evaluate(
            tool.as_ref(),
            &json!({"key": "monthly_budget_usd", "value": 10_000.0}),
            Some(&token),
        );
        assert_eq!(decision.verdict, Verdict::Deny);

        // Below the ceiling the same write only needs the token
        let decision = policy().evaluate(
            tool.as_ref(),
            &json!({"key": "monthly_budget_usd", "value": 150.0}),
            Some(&token),
        );
        assert_eq!(decision.verdict, Verdict::Allow);
    }

    #[test]
    fn test_evaluate_is_deterministic() {
        let registry = registry();
        let tool = registry.get("place_order").unwrap();
        let args = json!({"item_name": "rice", "quantity": 1.0, "total_usd": 10.0});

        let first = policy().evaluate(tool.as_ref(), &args, None);
        for _ in 0..10 {
            let again = policy().evaluate(tool.as_ref(), &args, None);
            assert_eq!(again.verdict, first.verdict);
            assert_eq!(again.reason, first.reason);
        }
    }

    proptest! {
        #[test]
        fn prop_informational_allowed_for_any_arguments(junk in "[a-z]{0,16}", number in -1.0e9f64..1.0e9) {
            let registry = registry();
            let tool = registry.get("get_usage_forecast").unwrap();
            let args = json!({"item_name": junk, "noise": number});

            let decision = policy().evaluate(tool.as_ref(), &args, None);
            prop_assert_eq!(decision.verdict, Verdict::Allow);

            let token = ApprovalToken::new("anything", "prop");
            let decision = policy().evaluate(tool.as_ref(), &args, Some(&token));
            prop_assert_eq!(decision.verdict, Verdict::Allow);
        }

        #[test]
        fn prop_gated_without_token_never_allowed(quantity in 0.0f64..100.0, total in 0.0f64..100.0) {
            let registry = registry();
            let tool = registry.get("place_order").unwrap();
            let args = json!({"item_name": "rice", "quantity": quantity, "total_usd": total});

            let decision = policy().evaluate(tool.as_ref(), &args, None);
            prop_assert_ne!(decision.verdict, Verdict::Allow);
        }

        #[test]
        fn prop_spend_above_ceiling_always_denied(excess in 0.01f64..1.0e6) {
            let config = PolicyConfig::default();
            let ceiling = config.budget_ceiling_usd;
            let registry = registry();
            let tool = registry.get("place_order").unwrap();
            let args = json!({"item_name": "rice", "quantity": 1.0, "total_usd": ceiling + excess});

            let token = ApprovalToken::new("place_order", "prop");
            let decision = SafetyPolicy::new(config).evaluate(tool.as_ref(), &args, Some(&token));
            prop_assert_eq!(decision.verdict, Verdict::Deny);
        }
    }
}
