//! StateManager - actor that owns the pantry store
//!
//! The SQLite connection is single-owner, so all access goes through one
//! actor task; callers hold a cheap clonable handle and await replies over
//! oneshot channels. Each command maps to one store call, keeping every tool
//! invocation a single atomic store operation.

use std::path::Path;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use pantrystore::{CycleRecord, Item, OrderRecord, OrderStatus, Preference, Store};

use super::messages::{StateCommand, StateError, StateResponse};

/// Handle to send commands to the StateManager actor
#[derive(Clone)]
pub struct StateManager {
    tx: mpsc::Sender<StateCommand>,
}

impl StateManager {
    /// Open the store and spawn the actor task
    pub fn spawn(store_path: impl AsRef<Path>) -> eyre::Result<Self> {
        debug!(store_path = %store_path.as_ref().display(), "StateManager::spawn");
        let store = Store::open(store_path.as_ref())?;

        let (tx, rx) = mpsc::channel(256);
        tokio::spawn(actor_loop(store, rx));

        info!("StateManager spawned");
        Ok(Self { tx })
    }

    async fn send<T>(
        &self,
        make: impl FnOnce(tokio::sync::oneshot::Sender<StateResponse<T>>) -> StateCommand,
    ) -> StateResponse<T> {
        let (reply_tx, reply_rx) = tokio::sync::oneshot::channel();
        self.tx
            .send(make(reply_tx))
            .await
            .map_err(|_| StateError::ChannelError)?;
        reply_rx.await.map_err(|_| StateError::ChannelError)?
    }

    /// List all items
    pub async fn list_items(&self) -> StateResponse<Vec<Item>> {
        debug!("list_items: called");
        self.send(|reply| StateCommand::ListItems { reply }).await
    }

    /// List items at or below their restock threshold
    pub async fn low_stock_items(&self) -> StateResponse<Vec<Item>> {
        debug!("low_stock_items: called");
        self.send(|reply| StateCommand::LowStockItems { reply }).await
    }

    /// Fetch one item by name
    pub async fn get_item(&self, name: &str) -> StateResponse<Option<Item>> {
        debug!(%name, "get_item: called");
        let name = name.to_string();
        self.send(|reply| StateCommand::GetItem { name, reply }).await
    }

    /// Insert or replace an item
    pub async fn upsert_item(&self, item: Item) -> StateResponse<()> {
        debug!(name = %item.name, "upsert_item: called");
        self.send(|reply| StateCommand::UpsertItem { item, reply }).await
    }

    /// Set the quantity of a named item
    pub async fn update_quantity(&self, name: &str, quantity: f64) -> StateResponse<Item> {
        debug!(%name, quantity, "update_quantity: called");
        let name = name.to_string();
        self.send(|reply| StateCommand::UpdateQuantity { name, quantity, reply })
            .await
    }

    /// Delete every item, returning the number removed
    pub async fn delete_all_items(&self) -> StateResponse<usize> {
        debug!("delete_all_items: called");
        self.send(|reply| StateCommand::DeleteAllItems { reply }).await
    }

    /// Fetch a preference by key
    pub async fn get_preference(&self, key: &str) -> StateResponse<Option<Preference>> {
        debug!(%key, "get_preference: called");
        let key = key.to_string();
        self.send(|reply| StateCommand::GetPreference { key, reply }).await
    }

    /// Set a single named preference value
    pub async fn set_preference(&self, pref: Preference) -> StateResponse<()> {
        debug!(key = %pref.key, "set_preference: called");
        self.send(|reply| StateCommand::SetPreference { pref, reply }).await
    }

    /// Persist an order record
    pub async fn record_order(&self, order: OrderRecord) -> StateResponse<()> {
        debug!(id = %order.id, "record_order: called");
        self.send(|reply| StateCommand::RecordOrder { order, reply }).await
    }

    /// List orders, optionally filtered by status
    pub async fn list_orders(&self, status: Option<OrderStatus>) -> StateResponse<Vec<OrderRecord>> {
        debug!(?status, "list_orders: called");
        self.send(|reply| StateCommand::ListOrders { status, reply }).await
    }

    /// Persist a cycle summary record
    pub async fn save_cycle(&self, record: CycleRecord) -> StateResponse<()> {
        debug!(id = %record.id, "save_cycle: called");
        self.send(|reply| StateCommand::SaveCycle { record, reply }).await
    }

    /// List the most recent cycle records
    pub async fn list_cycles(&self, limit: usize) -> StateResponse<Vec<CycleRecord>> {
        debug!(limit, "list_cycles: called");
        self.send(|reply| StateCommand::ListCycles { limit, reply }).await
    }

    /// Ask the actor to stop after draining queued commands
    pub async fn shutdown(&self) {
        debug!("shutdown: called");
        let _ = self.tx.send(StateCommand::Shutdown).await;
    }
}

fn store_err(e: eyre::Report) -> StateError {
    StateError::StoreError(e.to_string())
}

/// The actor task: owns the store, processes commands sequentially
async fn actor_loop(store: Store, mut rx: mpsc::Receiver<StateCommand>) {
    debug!("actor_loop: started");
    while let Some(cmd) = rx.recv().await {
        match cmd {
            StateCommand::ListItems { reply } => {
                let _ = reply.send(store.list_items().map_err(store_err));
            }
            StateCommand::LowStockItems { reply } => {
                let _ = reply.send(store.low_stock_items().map_err(store_err));
            }
            StateCommand::GetItem { name, reply } => {
                let _ = reply.send(store.get_item(&name).map_err(store_err));
            }
            StateCommand::UpsertItem { item, reply } => {
                let _ = reply.send(store.upsert_item(&item).map_err(store_err));
            }
            StateCommand::UpdateQuantity { name, quantity, reply } => {
                let result = match store.update_quantity(&name, quantity) {
                    Ok(Some(item)) => Ok(item),
                    Ok(None) => Err(StateError::ItemNotFound(name)),
                    Err(e) => Err(store_err(e)),
                };
                let _ = reply.send(result);
            }
            StateCommand::DeleteAllItems { reply } => {
                let _ = reply.send(store.delete_all_items().map_err(store_err));
            }
            StateCommand::GetPreference { key, reply } => {
                let _ = reply.send(store.get_preference(&key).map_err(store_err));
            }
            StateCommand::SetPreference { pref, reply } => {
                let _ = reply.send(store.set_preference(&pref).map_err(store_err));
            }
            StateCommand::RecordOrder { order, reply } => {
                let _ = reply.send(store.record_order(&order).map_err(store_err));
            }
            StateCommand::ListOrders { status, reply } => {
                let _ = reply.send(store.list_orders(status).map_err(store_err));
            }
            StateCommand::SaveCycle { record, reply } => {
                let _ = reply.send(store.save_cycle(&record).map_err(store_err));
            }
            StateCommand::ListCycles { limit, reply } => {
                let _ = reply.send(store.list_cycles(limit).map_err(store_err));
            }
            StateCommand::Shutdown => {
                debug!("actor_loop: shutdown command received");
                break;
            }
        }
    }
    warn!("actor_loop: exited");
}
