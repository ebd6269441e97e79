//! Tool system for the inventory agent
//!
//! A [`ToolRegistry`] owns the fixed set of capabilities offered to the
//! model; a [`ToolExecutor`] resolves, validates, and dispatches invocations
//! against it. Handlers reach the store and vendor through the injected
//! [`ToolContext`] and never construct collaborators themselves.

mod context;
mod error;
mod executor;
mod registry;
mod traits;

pub mod builtin;

pub use context::ToolContext;
pub use error::ToolError;
pub use executor::{ToolExecutor, validate_arguments};
pub use registry::ToolRegistry;
pub use traits::{Classification, Tool};

use std::sync::Arc;

use builtin::{
    AddInventoryItemTool, DeleteAllInventoryTool, GetInventoryItemsTool, GetLowStockItemsTool, GetPendingOrdersTool,
    GetPreferenceTool, GetUsageForecastTool, PlaceOrderTool, SetPreferenceTool, UpdateItemQuantityTool,
};

/// Build a registry with the standard inventory tool set
pub fn standard_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    // Registration cannot collide within this fixed set
    let tools: Vec<Arc<dyn Tool>> = vec![
        Arc::new(GetInventoryItemsTool),
        Arc::new(GetLowStockItemsTool),
        Arc::new(GetUsageForecastTool),
        Arc::new(GetPendingOrdersTool),
        Arc::new(GetPreferenceTool),
        Arc::new(AddInventoryItemTool),
        Arc::new(UpdateItemQuantityTool),
        Arc::new(SetPreferenceTool),
        Arc::new(DeleteAllInventoryTool),
        Arc::new(PlaceOrderTool),
    ];
    for tool in tools {
        registry
            .register(tool)
            .expect("builtin tool names are unique by construction");
    }

    registry
}
