//! Core pantry store implementation
//!
//! A single SQLite database holds items, preferences, orders, and cycle
//! summaries. The store takes an exclusive advisory lock on its directory so
//! two processes cannot write the same database concurrently; readers that
//! need shared access should go through the owning process.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use eyre::{Context, Result};
use fs2::FileExt;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, info};

use crate::records::{CycleRecord, Item, OrderRecord, OrderStatus, Preference};

/// Database filename inside the store directory
const DB_FILE: &str = "pantry.db";

/// Lock filename inside the store directory
const LOCK_FILE: &str = ".lock";

/// The pantry store
pub struct Store {
    conn: Connection,
    base_path: PathBuf,
    _lock: fs::File,
}

impl Store {
    /// Open or create a store at the given directory
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path).context("Failed to create store directory")?;

        let lock = fs::File::create(base_path.join(LOCK_FILE)).context("Failed to create lock file")?;
        lock.try_lock_exclusive()
            .context(format!("Store at {} is locked by another process", base_path.display()))?;

        let conn = Connection::open(base_path.join(DB_FILE)).context("Failed to open pantry database")?;
        Self::create_tables(&conn)?;

        debug!(?base_path, "Opened pantry store");
        Ok(Self {
            conn,
            base_path,
            _lock: lock,
        })
    }

    fn create_tables(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS items (
                id            TEXT PRIMARY KEY,
                name          TEXT NOT NULL UNIQUE,
                quantity      REAL NOT NULL,
                unit          TEXT NOT NULL,
                min_quantity  REAL NOT NULL DEFAULT 0,
                avg_daily_use REAL NOT NULL DEFAULT 0,
                updated_at    TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS preferences (
                key        TEXT PRIMARY KEY,
                value      TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS orders (
                id         TEXT PRIMARY KEY,
                item_name  TEXT NOT NULL,
                quantity   REAL NOT NULL,
                total_usd  REAL NOT NULL,
                vendor_ref TEXT,
                status     TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS cycles (
                id           TEXT PRIMARY KEY,
                started_at   TEXT NOT NULL,
                completed_at TEXT,
                status       TEXT NOT NULL,
                actions      TEXT NOT NULL
            );",
        )
        .context("Failed to create tables")?;
        Ok(())
    }

    /// Path of the store directory
    pub fn path(&self) -> &Path {
        &self.base_path
    }

    // === Items ===

    /// Insert or replace an item by name
    pub fn upsert_item(&self, item: &Item) -> Result<()> {
        debug!(name = %item.name, quantity = item.quantity, "upsert_item");
        self.conn
            .execute(
                "INSERT INTO items (id, name, quantity, unit, min_quantity, avg_daily_use, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(name) DO UPDATE SET
                     quantity = excluded.quantity,
                     unit = excluded.unit,
                     min_quantity = excluded.min_quantity,
                     avg_daily_use = excluded.avg_daily_use,
                     updated_at = excluded.updated_at",
                params![
                    item.id,
                    item.name,
                    item.quantity,
                    item.unit,
                    item.min_quantity,
                    item.avg_daily_use,
                    item.updated_at.to_rfc3339(),
                ],
            )
            .context("Failed to upsert item")?;
        Ok(())
    }

    /// Fetch a single item by name
    pub fn get_item(&self, name: &str) -> Result<Option<Item>> {
        debug!(%name, "get_item");
        self.conn
            .query_row(
                "SELECT id, name, quantity, unit, min_quantity, avg_daily_use, updated_at
                 FROM items WHERE name = ?1",
                params![name],
                row_to_item,
            )
            .optional()
            .context("Failed to query item")
    }

    /// List all items, ordered by name
    pub fn list_items(&self) -> Result<Vec<Item>> {
        debug!("list_items");
        let mut stmt = self.conn.prepare(
            "SELECT id, name, quantity, unit, min_quantity, avg_daily_use, updated_at
             FROM items ORDER BY name",
        )?;
        let items = stmt
            .query_map([], row_to_item)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to list items")?;
        Ok(items)
    }

    /// List items at or below their restock threshold, ordered by name
    pub fn low_stock_items(&self) -> Result<Vec<Item>> {
        debug!("low_stock_items");
        let mut stmt = self.conn.prepare(
            "SELECT id, name, quantity, unit, min_quantity, avg_daily_use, updated_at
             FROM items WHERE quantity <= min_quantity ORDER BY name",
        )?;
        let items = stmt
            .query_map([], row_to_item)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to list low stock items")?;
        Ok(items)
    }

    /// Set the quantity of a named item, returning the updated record
    pub fn update_quantity(&self, name: &str, quantity: f64) -> Result<Option<Item>> {
        debug!(%name, quantity, "update_quantity");
        let changed = self
            .conn
            .execute(
                "UPDATE items SET quantity = ?1, updated_at = ?2 WHERE name = ?3",
                params![quantity, Utc::now().to_rfc3339(), name],
            )
            .context("Failed to update quantity")?;

        if changed == 0 {
            return Ok(None);
        }
        self.get_item(name)
    }

    /// Delete every item, returning the number removed
    pub fn delete_all_items(&self) -> Result<usize> {
        info!("delete_all_items");
        let removed = self
            .conn
            .execute("DELETE FROM items", [])
            .context("Failed to delete items")?;
        Ok(removed)
    }

    // === Preferences ===

    /// Set a single named preference value
    pub fn set_preference(&self, pref: &Preference) -> Result<()> {
        debug!(key = %pref.key, "set_preference");
        self.conn
            .execute(
                "INSERT INTO preferences (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![pref.key, pref.value.to_string(), pref.updated_at.to_rfc3339()],
            )
            .context("Failed to set preference")?;
        Ok(())
    }

    /// Fetch a preference by key
    pub fn get_preference(&self, key: &str) -> Result<Option<Preference>> {
        debug!(%key, "get_preference");
        self.conn
            .query_row(
                "SELECT key, value, updated_at FROM preferences WHERE key = ?1",
                params![key],
                row_to_preference,
            )
            .optional()
            .context("Failed to query preference")
    }

    /// List all preferences, ordered by key
    pub fn list_preferences(&self) -> Result<Vec<Preference>> {
        debug!("list_preferences");
        let mut stmt = self
            .conn
            .prepare("SELECT key, value, updated_at FROM preferences ORDER BY key")?;
        let prefs = stmt
            .query_map([], row_to_preference)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to list preferences")?;
        Ok(prefs)
    }

    // === Orders ===

    /// Persist an order record
    pub fn record_order(&self, order: &OrderRecord) -> Result<()> {
        debug!(id = %order.id, item = %order.item_name, "record_order");
        self.conn
            .execute(
                "INSERT INTO orders (id, item_name, quantity, total_usd, vendor_ref, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    order.id,
                    order.item_name,
                    order.quantity,
                    order.total_usd,
                    order.vendor_ref,
                    order.status.to_string(),
                    order.created_at.to_rfc3339(),
                ],
            )
            .context("Failed to record order")?;
        Ok(())
    }

    /// List orders, optionally filtered by status, newest first
    pub fn list_orders(&self, status: Option<OrderStatus>) -> Result<Vec<OrderRecord>> {
        debug!(?status, "list_orders");
        let mut orders = match status {
            Some(s) => {
                let mut stmt = self.conn.prepare(
                    "SELECT id, item_name, quantity, total_usd, vendor_ref, status, created_at
                     FROM orders WHERE status = ?1 ORDER BY created_at DESC",
                )?;
                stmt.query_map(params![s.to_string()], row_to_order)?
                    .collect::<rusqlite::Result<Vec<_>>>()
            }
            None => {
                let mut stmt = self.conn.prepare(
                    "SELECT id, item_name, quantity, total_usd, vendor_ref, status, created_at
                     FROM orders ORDER BY created_at DESC",
                )?;
                stmt.query_map([], row_to_order)?.collect::<rusqlite::Result<Vec<_>>>()
            }
        }
        .context("Failed to list orders")?;

        // RFC3339 strings only sort lexicographically at equal precision, so
        // order again on the parsed timestamps
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    // === Cycles ===

    /// Persist a cycle summary record (insert or replace by ID)
    pub fn save_cycle(&self, cycle: &CycleRecord) -> Result<()> {
        debug!(id = %cycle.id, status = %cycle.status, "save_cycle");
        self.conn
            .execute(
                "INSERT INTO cycles (id, started_at, completed_at, status, actions)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(id) DO UPDATE SET
                     completed_at = excluded.completed_at,
                     status = excluded.status,
                     actions = excluded.actions",
                params![
                    cycle.id,
                    cycle.started_at.to_rfc3339(),
                    cycle.completed_at.map(|t| t.to_rfc3339()),
                    cycle.status,
                    cycle.actions.to_string(),
                ],
            )
            .context("Failed to save cycle")?;
        Ok(())
    }

    /// List the most recent cycle records
    pub fn list_cycles(&self, limit: usize) -> Result<Vec<CycleRecord>> {
        debug!(limit, "list_cycles");
        let mut stmt = self.conn.prepare(
            "SELECT id, started_at, completed_at, status, actions
             FROM cycles ORDER BY started_at DESC LIMIT ?1",
        )?;
        let cycles = stmt
            .query_map(params![limit as i64], row_to_cycle)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to list cycles")?;
        Ok(cycles)
    }
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn row_to_item(row: &rusqlite::Row<'_>) -> rusqlite::Result<Item> {
    Ok(Item {
        id: row.get(0)?,
        name: row.get(1)?,
        quantity: row.get(2)?,
        unit: row.get(3)?,
        min_quantity: row.get(4)?,
        avg_daily_use: row.get(5)?,
        updated_at: parse_timestamp(&row.get::<_, String>(6)?),
    })
}

fn row_to_preference(row: &rusqlite::Row<'_>) -> rusqlite::Result<Preference> {
    let raw: String = row.get(1)?;
    Ok(Preference {
        key: row.get(0)?,
        value: serde_json::from_str(&raw).unwrap_or(serde_json::Value::String(raw)),
        updated_at: parse_timestamp(&row.get::<_, String>(2)?),
    })
}

fn row_to_order(row: &rusqlite::Row<'_>) -> rusqlite::Result<OrderRecord> {
    let status: String = row.get(5)?;
    Ok(OrderRecord {
        id: row.get(0)?,
        item_name: row.get(1)?,
        quantity: row.get(2)?,
        total_usd: row.get(3)?,
        vendor_ref: row.get(4)?,
        status: status.parse().unwrap_or(OrderStatus::Pending),
        created_at: parse_timestamp(&row.get::<_, String>(6)?),
    })
}

fn row_to_cycle(row: &rusqlite::Row<'_>) -> rusqlite::Result<CycleRecord> {
    let actions: String = row.get(4)?;
    Ok(CycleRecord {
        id: row.get(0)?,
        started_at: parse_timestamp(&row.get::<_, String>(1)?),
        completed_at: row.get::<_, Option<String>>(2)?.map(|s| parse_timestamp(&s)),
        status: row.get(3)?,
        actions: serde_json::from_str(&actions).unwrap_or(serde_json::Value::Null),
    })
}
