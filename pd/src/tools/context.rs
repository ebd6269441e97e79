//! ToolContext - execution context for tool handlers

use std::sync::Arc;

use crate::state::StateManager;
use crate::vendor::VendorClient;

/// Collaborator handles injected into every tool invocation
///
/// Built per turn by the orchestrator. The store handle is always present;
/// the vendor client is optional so read-only deployments can run without
/// ordering credentials (financial tools then fail with a collaborator
/// error rather than at startup).
#[derive(Clone)]
pub struct ToolContext {
    /// Inventory store handle
    pub store: StateManager,

    /// Vendor/ordering client, when configured
    pub vendor: Option<Arc<dyn VendorClient>>,

    /// Turn this invocation belongs to
    pub turn_id: String,
}

impl ToolContext {
    pub fn new(store: StateManager, turn_id: impl Into<String>) -> Self {
        Self {
            store,
            vendor: None,
            turn_id: turn_id.into(),
        }
    }

    pub fn with_vendor(mut self, vendor: Arc<dyn VendorClient>) -> Self {
        self.vendor = Some(vendor);
        self
    }
}
