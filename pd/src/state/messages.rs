//! State manager messages
//!
//! Commands and responses for the actor pattern.

use thiserror::Error;
use tokio::sync::oneshot;

use pantrystore::{CycleRecord, Item, OrderRecord, OrderStatus, Preference};

/// Errors from state operations
#[derive(Debug, Error)]
pub enum StateError {
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    #[error("Store error: {0}")]
    StoreError(String),

    #[error("Channel error")]
    ChannelError,
}

impl StateError {
    /// Channel failures mean the actor died mid-request; a fresh attempt may
    /// land after a restart, so they count as transient.
    pub fn is_transient(&self) -> bool {
        matches!(self, StateError::ChannelError)
    }
}

/// Response from state operations
pub type StateResponse<T> = Result<T, StateError>;

/// Commands sent to the StateManager actor
#[derive(Debug)]
pub enum StateCommand {
    // Item operations
    ListItems {
        reply: oneshot::Sender<StateResponse<Vec<Item>>>,
    },
    LowStockItems {
        reply: oneshot::Sender<StateResponse<Vec<Item>>>,
    },
    GetItem {
        name: String,
        reply: oneshot::Sender<StateResponse<Option<Item>>>,
    },
    UpsertItem {
        item: Item,
        reply: oneshot::Sender<StateResponse<()>>,
    },
    UpdateQuantity {
        name: String,
        quantity: f64,
        reply: oneshot::Sender<StateResponse<Item>>,
    },
    DeleteAllItems {
        reply: oneshot::Sender<StateResponse<usize>>,
    },

    // Preference operations
    GetPreference {
        key: String,
        reply: oneshot::Sender<StateResponse<Option<Preference>>>,
    },
    SetPreference {
        pref: Preference,
        reply: oneshot::Sender<StateResponse<()>>,
    },

    // Order operations
    RecordOrder {
        order: OrderRecord,
        reply: oneshot::Sender<StateResponse<()>>,
    },
    ListOrders {
        status: Option<OrderStatus>,
        reply: oneshot::Sender<StateResponse<Vec<OrderRecord>>>,
    },

    // Cycle operations
    SaveCycle {
        record: CycleRecord,
        reply: oneshot::Sender<StateResponse<()>>,
    },
    ListCycles {
        limit: usize,
        reply: oneshot::Sender<StateResponse<Vec<CycleRecord>>>,
    },

    // Shutdown
    Shutdown,
}
