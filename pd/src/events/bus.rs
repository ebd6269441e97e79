//! Event bus - pub/sub for agent lifecycle notifications
//!
//! Built on a tokio broadcast channel: events reach every subscriber in
//! emission order, each at most once per subscriber. Components emit through
//! cheap [`EventEmitter`] handles scoped to a turn (and optionally a cycle).

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::debug;

use super::types::AgentEvent;

/// Default channel capacity (events)
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Central event bus for agent activity
pub struct EventBus {
    tx: broadcast::Sender<AgentEvent>,
}

impl EventBus {
    /// Create a new event bus with the given capacity
    pub fn new(capacity: usize) -> Self {
        debug!(capacity, "EventBus::new");
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Emit an event to all subscribers
    ///
    /// Fire-and-forget: with no subscribers the event is dropped.
    pub fn emit(&self, event: AgentEvent) {
        debug!(event_type = event.event_type(), scope = event.scope_id(), "EventBus::emit");
        let _ = self.tx.send(event);
    }

    /// Subscribe to events emitted after this point
    pub fn subscribe(&self) -> broadcast::Receiver<AgentEvent> {
        self.tx.subscribe()
    }

    /// Create an emitter scoped to one turn
    pub fn emitter_for_turn(&self, turn_id: impl Into<String>) -> EventEmitter {
        EventEmitter {
            tx: self.tx.clone(),
            turn_id: turn_id.into(),
            cycle_id: None,
        }
    }

    /// Create an emitter scoped to one turn running inside a cycle
    ///
    /// Cycle-scoped emitters additionally publish `ActionTaken` for every
    /// executed allowed call.
    pub fn emitter_for_cycle(&self, turn_id: impl Into<String>, cycle_id: impl Into<String>) -> EventEmitter {
        EventEmitter {
            tx: self.tx.clone(),
            turn_id: turn_id.into(),
            cycle_id: Some(cycle_id.into()),
        }
    }

    /// Number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

/// Create an event bus wrapped in an Arc for shared ownership
pub fn create_event_bus() -> Arc<EventBus> {
    Arc::new(EventBus::default())
}

/// Handle for emitting events without owning the bus
#[derive(Clone)]
pub struct EventEmitter {
    tx: broadcast::Sender<AgentEvent>,
    turn_id: String,
    cycle_id: Option<String>,
}

impl EventEmitter {
    /// Turn this emitter is bound to
    pub fn turn_id(&self) -> &str {
        &self.turn_id
    }

    /// Cycle this emitter is bound to, if any
    pub fn cycle_id(&self) -> Option<&str> {
        self.cycle_id.as_deref()
    }

    fn emit(&self, event: AgentEvent) {
        let _ = self.tx.send(event);
    }

    pub fn turn_started(&self) {
        self.emit(AgentEvent::TurnStarted {
            turn_id: self.turn_id.clone(),
        });
    }

    pub fn tool_call_started(&self, tool_name: &str, args_summary: &str) {
        self.emit(AgentEvent::ToolCallStarted {
            turn_id: self.turn_id.clone(),
            tool_name: tool_name.to_string(),
            args_summary: args_summary.to_string(),
        });
    }

    pub fn tool_call_completed(&self, tool_name: &str, success: bool, result_summary: &str) {
        self.emit(AgentEvent::ToolCallCompleted {
            turn_id: self.turn_id.clone(),
            tool_name: tool_name.to_string(),
            success,
            result_summary: result_summary.to_string(),
        });
    }

    pub fn approval_required(&self, tool_name: &str, reason: &str) {
        self.emit(AgentEvent::ApprovalRequired {
            turn_id: self.turn_id.clone(),
            tool_name: tool_name.to_string(),
            reason: reason.to_string(),
        });
    }

    pub fn turn_completed(&self, status: &str, tool_call_count: usize) {
        self.emit(AgentEvent::TurnCompleted {
            turn_id: self.turn_id.clone(),
            status: status.to_string(),
            tool_call_count,
        });
    }

    /// Emit an `ActionTaken` event when bound to a cycle; no-op otherwise
    pub fn action_taken(&self, action_name: &str, description: &str) {
        if let Some(cycle_id) = &self.cycle_id {
            self.emit(AgentEvent::ActionTaken {
                cycle_id: cycle_id.clone(),
                action_name: action_name.to_string(),
                description: description.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::TryRecvError;

    #[tokio::test]
    async fn test_emit_and_receive() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.emit(AgentEvent::TurnStarted {
            turn_id: "turn-1".to_string(),
        });

        let event = rx.recv().await.unwrap();
        assert_eq!(event.scope_id(), "turn-1");
    }

    #[tokio::test]
    async fn test_emit_without_subscribers_is_fine() {
        let bus = EventBus::new(16);
        bus.emit(AgentEvent::TurnStarted {
            turn_id: "turn-1".to_string(),
        });
    }

    #[tokio::test]
    async fn test_events_arrive_in_emission_order() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        let emitter = bus.emitter_for_turn("turn-2");

        emitter.turn_started();
        emitter.tool_call_started("get_inventory_items", "{}");
        emitter.tool_call_completed("get_inventory_items", true, "3 items");
        emitter.turn_completed("completed", 1);

        let mut order = Vec::new();
        for _ in 0..4 {
            order.push(rx.recv().await.unwrap().event_type());
        }

        assert_eq!(
            order,
            vec!["TurnStarted", "ToolCallStarted", "ToolCallCompleted", "TurnCompleted"]
        );
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_turn_emitter_never_emits_action_taken() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        let emitter = bus.emitter_for_turn("turn-3");

        emitter.action_taken("place_order", "ordered rice");
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_cycle_emitter_emits_action_taken() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        let emitter = bus.emitter_for_cycle("turn-4", "cycle-9");

        emitter.action_taken("place_order", "ordered rice");

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_type(), "ActionTaken");
        assert_eq!(event.scope_id(), "cycle-9");
    }

    #[tokio::test]
    async fn test_multiple_subscribers_each_receive() {
        let bus = EventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        bus.emit(AgentEvent::CycleStarted {
            cycle_id: "cycle-1".to_string(),
        });

        assert_eq!(rx1.recv().await.unwrap().scope_id(), "cycle-1");
        assert_eq!(rx2.recv().await.unwrap().scope_id(), "cycle-1");
    }
}
