//! CycleRunner - unattended restock checks
//!
//! On a schedule (or explicit trigger) the runner looks for low-stock items
//! and, when there are any, runs the same orchestrator loop with a
//! system-generated prompt. Failures are cycle-scoped: a broken collaborator
//! marks the cycle failed and the runner carries on to the next one.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use pantrystore::CycleRecord;

use crate::agent::{Orchestrator, TurnRequest};
use crate::config::CycleConfig;
use crate::domain::{CycleAction, CycleStatus, CycleSummary, TurnStatus};
use crate::events::{AgentEvent, EventBus};
use crate::state::StateManager;

/// Runs the autonomous decision cycle
pub struct CycleRunner {
    orchestrator: Arc<Orchestrator>,
    store: StateManager,
    bus: Arc<EventBus>,
    config: CycleConfig,
    stop_rx: watch::Receiver<bool>,
}

impl CycleRunner {
    pub fn new(
        orchestrator: Arc<Orchestrator>,
        store: StateManager,
        bus: Arc<EventBus>,
        config: CycleConfig,
        stop_rx: watch::Receiver<bool>,
    ) -> Self {
        debug!(interval_secs = config.interval_secs, "CycleRunner::new");
        Self {
            orchestrator,
            store,
            bus,
            config,
            stop_rx,
        }
    }

    /// Run one cycle to completion
    ///
    /// Emits `CycleStarted` and `CycleCompleted` exactly once each, with one
    /// `ActionTaken` per executed allowed tool call in between. Never
    /// propagates collaborator failures to the caller; they surface as
    /// `status == Failed` on the summary.
    pub async fn run_cycle(&self) -> CycleSummary {
        let mut summary = CycleSummary::begin();
        let cycle_id = summary.cycle_id.clone();
        info!(%cycle_id, "Cycle started");
        self.bus.emit(AgentEvent::CycleStarted {
            cycle_id: cycle_id.clone(),
        });

        // Stop signal is honored before any work happens
        if *self.stop_rx.borrow() {
            debug!(%cycle_id, "run_cycle: stop signal set at cycle start");
            return self.finish(summary, CycleStatus::Cancelled).await;
        }

        // Anything actionable? Checked against the store before spending a
        // single model token
        let low_stock = match self.store.low_stock_items().await {
            Ok(items) => items,
            Err(e) => {
                error!(%cycle_id, error = %e, "Cycle failed reading the store");
                return self.finish(summary, CycleStatus::Failed).await;
            }
        };

        if low_stock.is_empty() {
            info!(%cycle_id, "Nothing actionable, skipping cycle");
            return self.finish(summary, CycleStatus::Skipped).await;
        }

        let item_list = low_stock
            .iter()
            .map(|i| format!("- {} ({} {} on hand, threshold {})", i.name, i.quantity, i.unit, i.min_quantity))
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = format!(
            "Scheduled restock check. These items are at or below their restock threshold:\n{}\n\n\
             Review the inventory and forecasts, and take whatever follow-up is appropriate. \
             Actions that need approval will be reported back to the household; do not retry them.",
            item_list
        );

        let turn_id = Uuid::now_v7().to_string();
        let emitter = self.bus.emitter_for_cycle(&turn_id, &cycle_id);
        let request = TurnRequest::message(prompt).with_max_iterations(self.config.max_iterations);

        let status = match self
            .orchestrator
            .run_turn(request, Some(&emitter), Some(&self.stop_rx))
            .await
        {
            Ok(response) => {
                // One action per executed allowed call, mirroring the
                // ActionTaken events emitted during the turn
                summary.actions = response
                    .tool_calls
                    .iter()
                    .filter(|record| record.was_executed())
                    .map(|record| CycleAction {
                        action_name: record.tool_name.clone(),
                        description: match (&record.result, &record.error) {
                            (Some(result), _) => result.clone(),
                            (None, Some(error)) => format!("failed: {}", error.message),
                            (None, None) => String::new(),
                        },
                    })
                    .collect();
                match response.status {
                    TurnStatus::Cancelled => CycleStatus::Cancelled,
                    _ => CycleStatus::Completed,
                }
            }
            Err(e) => {
                error!(%cycle_id, error = %e, "Cycle decision turn failed");
                CycleStatus::Failed
            }
        };

        self.finish(summary, status).await
    }

    /// Freeze the summary, persist it, and emit completion
    async fn finish(&self, summary: CycleSummary, status: CycleStatus) -> CycleSummary {
        let summary = summary.finish(status);
        info!(cycle_id = %summary.cycle_id, %status, actions = summary.actions.len(), "Cycle completed");

        let record = CycleRecord {
            id: summary.cycle_id.clone(),
            started_at: summary.started_at,
            completed_at: summary.completed_at,
            status: summary.status.to_string(),
            actions: serde_json::to_value(&summary.actions).unwrap_or(serde_json::Value::Null),
        };
        if let Err(e) = self.store.save_cycle(record).await {
            // Persistence failure doesn't change the cycle outcome
            warn!(cycle_id = %summary.cycle_id, error = %e, "Failed to persist cycle summary");
        }

        self.bus.emit(AgentEvent::CycleCompleted {
            cycle_id: summary.cycle_id.clone(),
            summary: summary.clone(),
        });
        summary
    }

    /// Run cycles on the configured interval until the stop signal flips
    pub async fn run_scheduled(&self) {
        let period = Duration::from_secs(self.config.interval_secs.max(1));
        info!(?period, "Cycle scheduler started");
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut stop_rx = self.stop_rx.clone();

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if *stop_rx.borrow() {
                        break;
                    }
                    self.run_cycle().await;
                }
                _ = stop_rx.changed() => {
                    if *stop_rx.borrow() {
                        break;
                    }
                }
            }
        }
        info!("Cycle scheduler stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AgentConfig, PolicyConfig};
    use crate::events::create_event_bus;
    use crate::llm::client::mock::MockLlmClient;
    use crate::llm::{CompletionResponse, RequestedToolCall};
    use crate::policy::SafetyPolicy;
    use crate::tools::standard_registry;
    use pantrystore::Item;
    use serde_json::json;
    use tempfile::tempdir;

    struct Fixture {
        _temp: tempfile::TempDir,
        store: StateManager,
        bus: Arc<EventBus>,
        stop_tx: watch::Sender<bool>,
    }

    impl Fixture {
        async fn new() -> Self {
            let temp = tempdir().unwrap();
            let store = StateManager::spawn(temp.path()).unwrap();
            let (stop_tx, _) = watch::channel(false);
            Self {
                _temp: temp,
                store,
                bus: create_event_bus(),
                stop_tx,
            }
        }

        fn runner(&self, llm: MockLlmClient) -> CycleRunner {
            let orchestrator = Orchestrator::new(
                Arc::new(llm),
                Arc::new(standard_registry()),
                SafetyPolicy::new(PolicyConfig::default()),
                self.store.clone(),
                AgentConfig::default(),
                1024,
            );
            CycleRunner::new(
                Arc::new(orchestrator),
                self.store.clone(),
                self.bus.clone(),
                CycleConfig::default(),
                self.stop_tx.subscribe(),
            )
        }
    }

    fn drain(rx: &mut tokio::sync::broadcast::Receiver<AgentEvent>) -> Vec<AgentEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_nothing_actionable_skips_without_model_call() {
        let fx = Fixture::new().await;
        // Well-stocked item only
        fx.store
            .upsert_item(Item::new("rice", 10.0, "kg").with_min_quantity(2.0))
            .await
            .unwrap();

        let llm = MockLlmClient::new(vec![]);
        let runner = fx.runner(llm);
        let mut rx = fx.bus.subscribe();

        let summary = runner.run_cycle().await;

        assert_eq!(summary.status, CycleStatus::Skipped);
        assert!(summary.actions.is_empty());

        let events = drain(&mut rx);
        let types: Vec<_> = events.iter().map(|e| e.event_type()).collect();
        assert_eq!(types, vec!["CycleStarted", "CycleCompleted"]);
    }

    #[tokio::test]
    async fn test_cycle_runs_turn_and_emits_action_per_executed_call() {
        let fx = Fixture::new().await;
        fx.store
            .upsert_item(Item::new("milk", 0.5, "liters").with_min_quantity(2.0))
            .await
            .unwrap();

        let llm = MockLlmClient::new(vec![
            CompletionResponse::requesting(vec![
                RequestedToolCall::new("tu_1", "get_usage_forecast", json!({})),
                RequestedToolCall::new("tu_2", "get_pending_orders", json!({})),
            ]),
            CompletionResponse::final_text("Milk is low; an order needs approval."),
        ]);
        let runner = fx.runner(llm);
        let mut rx = fx.bus.subscribe();

        let summary = runner.run_cycle().await;

        assert_eq!(summary.status, CycleStatus::Completed);
        assert_eq!(summary.actions.len(), 2);
        assert_eq!(summary.actions[0].action_name, "get_usage_forecast");

        let events = drain(&mut rx);
        let action_events: Vec<_> = events.iter().filter(|e| e.event_type() == "ActionTaken").collect();
        assert_eq!(action_events.len(), 2, "one ActionTaken per executed call");

        let started = events.iter().filter(|e| e.event_type() == "CycleStarted").count();
        let completed = events.iter().filter(|e| e.event_type() == "CycleCompleted").count();
        assert_eq!((started, completed), (1, 1));

        // CycleCompleted arrives after every ActionTaken
        let last = events.last().unwrap();
        assert_eq!(last.event_type(), "CycleCompleted");
    }

    #[tokio::test]
    async fn test_gated_actions_do_not_count_as_actions() {
        let fx = Fixture::new().await;
        fx.store
            .upsert_item(Item::new("milk", 0.5, "liters").with_min_quantity(2.0))
            .await
            .unwrap();

        let llm = MockLlmClient::new(vec![
            CompletionResponse::requesting(vec![RequestedToolCall::new(
                "tu_1",
                "place_order",
                json!({"item_name": "milk", "quantity": 2.0, "total_usd": 6.0}),
            )]),
            CompletionResponse::final_text("Ordering milk needs approval."),
        ]);
        let runner = fx.runner(llm);
        let mut rx = fx.bus.subscribe();

        let summary = runner.run_cycle().await;

        assert_eq!(summary.status, CycleStatus::Completed);
        assert!(summary.actions.is_empty(), "gated calls never executed");

        let events = drain(&mut rx);
        assert_eq!(events.iter().filter(|e| e.event_type() == "ActionTaken").count(), 0);
        assert_eq!(events.iter().filter(|e| e.event_type() == "ApprovalRequired").count(), 1);
    }

    #[tokio::test]
    async fn test_model_failure_marks_cycle_failed_without_raising() {
        let fx = Fixture::new().await;
        fx.store
            .upsert_item(Item::new("milk", 0.5, "liters").with_min_quantity(2.0))
            .await
            .unwrap();

        // Empty script: the first model call errors fatally
        let llm = MockLlmClient::new(vec![]);
        let runner = fx.runner(llm);
        let mut rx = fx.bus.subscribe();

        let summary = runner.run_cycle().await;

        assert_eq!(summary.status, CycleStatus::Failed);
        let events = drain(&mut rx);
        assert_eq!(events.last().unwrap().event_type(), "CycleCompleted");
    }

    #[tokio::test]
    async fn test_stop_signal_at_cycle_start_cancels() {
        let fx = Fixture::new().await;
        fx.store
            .upsert_item(Item::new("milk", 0.5, "liters").with_min_quantity(2.0))
            .await
            .unwrap();

        let llm = MockLlmClient::new(vec![CompletionResponse::final_text("unused")]);
        let runner = fx.runner(llm);
        fx.stop_tx.send(true).unwrap();

        let mut rx = fx.bus.subscribe();
        let summary = runner.run_cycle().await;

        assert_eq!(summary.status, CycleStatus::Cancelled);
        assert!(summary.actions.is_empty());
        let events = drain(&mut rx);
        let types: Vec<_> = events.iter().map(|e| e.event_type()).collect();
        assert_eq!(types, vec!["CycleStarted", "CycleCompleted"]);
    }

    #[tokio::test]
    async fn test_summary_is_persisted() {
        let fx = Fixture::new().await;
        let llm = MockLlmClient::new(vec![]);
        let runner = fx.runner(llm);

        let summary = runner.run_cycle().await;

        let cycles = fx.store.list_cycles(10).await.unwrap();
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].id, summary.cycle_id);
        assert_eq!(cycles[0].status, "skipped");
    }

    #[tokio::test]
    async fn test_approved_cycle_would_execute_actions() {
        // Guardrails still hold during cycles: delete_all_inventory stays denied
        let fx = Fixture::new().await;
        fx.store
            .upsert_item(Item::new("milk", 0.5, "liters").with_min_quantity(2.0))
            .await
            .unwrap();

        let llm = MockLlmClient::new(vec![
            CompletionResponse::requesting(vec![RequestedToolCall::new(
                "tu_1",
                "delete_all_inventory",
                json!({}),
            )]),
            CompletionResponse::final_text("That isn't permitted."),
        ]);
        let runner = fx.runner(llm);

        let summary = runner.run_cycle().await;

        assert_eq!(summary.status, CycleStatus::Completed);
        assert!(summary.actions.is_empty());
        assert_eq!(fx.store.list_items().await.unwrap().len(), 1);
    }
}
